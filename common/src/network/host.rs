//! # Host Records
//!
//! The per-host shapes handed to exporters. Field names are part of the
//! output contract and serialize in camelCase.

use serde::{Deserialize, Serialize};

/// Longest banner kept, in characters.
pub const MAX_BANNER_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// Closed and filtered ports are never recorded.
    Open,
}

impl PortState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortState::Open => "open",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    pub port: u16,
    pub state: PortState,
    pub service: String,
    #[serde(default)]
    pub banner: String,
    #[serde(default)]
    pub version: String,
}

impl PortRecord {
    pub fn open(port: u16, service: impl Into<String>) -> Self {
        Self {
            port,
            state: PortState::Open,
            service: service.into(),
            banner: String::new(),
            version: String::new(),
        }
    }

    /// Stores the banner, truncated to [`MAX_BANNER_CHARS`] characters.
    pub fn with_banner(mut self, banner: &str) -> Self {
        self.banner = banner.chars().take(MAX_BANNER_CHARS).collect();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Version if known, otherwise the first `max` characters of the banner.
    pub fn version_or_banner(&self, max: usize) -> String {
        if self.version.is_empty() {
            self.banner.chars().take(max).collect()
        } else {
            self.version.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRecord {
    pub address: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub os_guess: String,
    /// Scan order, one record per port.
    #[serde(default)]
    pub ports: Vec<PortRecord>,
    #[serde(default)]
    pub vulnerabilities: Vec<String>,
}

impl HostRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: String::new(),
            os_guess: String::new(),
            ports: Vec::new(),
            vulnerabilities: Vec::new(),
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_os_guess(mut self, os_guess: impl Into<String>) -> Self {
        self.os_guess = os_guess.into();
        self
    }

    /// Appends a port record unless that port is already present.
    ///
    /// Returns `false` when the record was a duplicate and got dropped.
    pub fn push_port(&mut self, record: PortRecord) -> bool {
        if self.ports.iter().any(|p| p.port == record.port) {
            return false;
        }
        self.ports.push(record);
        true
    }

    pub fn is_flagged(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_is_truncated_to_one_hundred_chars() {
        let long: String = "é".repeat(150);
        let record = PortRecord::open(21, "ftp").with_banner(&long);
        assert_eq!(record.banner.chars().count(), MAX_BANNER_CHARS);
    }

    #[test]
    fn duplicate_ports_are_rejected() {
        let mut host = HostRecord::new("10.0.0.1");
        assert!(host.push_port(PortRecord::open(22, "ssh")));
        assert!(!host.push_port(PortRecord::open(22, "ssh")));
        assert_eq!(host.ports.len(), 1);
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let mut host = HostRecord::new("10.0.0.1").with_os_guess("Linux");
        host.push_port(PortRecord::open(22, "ssh").with_version("OpenSSH 8.9"));

        let value = serde_json::to_value(&host).unwrap();
        assert_eq!(value["address"], "10.0.0.1");
        assert_eq!(value["osGuess"], "Linux");
        assert_eq!(value["ports"][0]["state"], "open");
        assert_eq!(value["ports"][0]["version"], "OpenSSH 8.9");
        assert!(value["vulnerabilities"].as_array().unwrap().is_empty());
    }

    #[test]
    fn version_or_banner_prefers_version() {
        let with_version = PortRecord::open(80, "http")
            .with_banner("HTTP/1.1 400 Bad Request")
            .with_version("nginx 1.18");
        assert_eq!(with_version.version_or_banner(60), "nginx 1.18");

        let banner_only = PortRecord::open(80, "http").with_banner("HTTP/1.1 400 Bad Request");
        assert_eq!(banner_only.version_or_banner(8), "HTTP/1.1");
    }
}
