use thiserror::Error;

/// Caller-supplied port list could not be used.
///
/// These are configuration errors and are raised before any scanning.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PortListError {
    #[error("port list is empty")]
    Empty,

    #[error("invalid port '{entry}': not a number")]
    NotNumeric { entry: String },

    #[error("invalid port '{entry}': must be between 1 and 65535")]
    OutOfRange { entry: String },

    #[error("invalid port range '{entry}': start is greater than end")]
    InvertedRange { entry: String },
}
