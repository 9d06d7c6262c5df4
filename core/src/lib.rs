pub mod discovery;
pub mod flags;
pub mod scanner;
pub mod signal;

pub mod network {
    pub mod probe;
    pub mod tcp;
}
