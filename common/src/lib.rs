pub mod config;
pub mod error;
pub mod inventory;
pub mod ports;
pub mod services;
pub mod vulns;

pub mod network {
    pub mod host;
    pub mod range;
    pub mod target;
}
