//! # Inventory
//!
//! Folds finished host records into the report object and derives the
//! counters shown in the console summary. No scanning or flagging happens
//! here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::network::host::HostRecord;
use crate::network::target::AddressSpec;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub target: AddressSpec,
    pub hosts: Vec<HostRecord>,
    pub generated_at: DateTime<Utc>,
    /// Set when the run was stopped before every host was scanned.
    #[serde(default)]
    pub interrupted: bool,
}

/// A host carrying at least one advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedHost {
    pub address: String,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub live_hosts: usize,
    pub open_ports: usize,
    pub vulnerability_flags: usize,
    pub flagged_hosts: Vec<FlaggedHost>,
}

impl Inventory {
    pub fn assemble(target: AddressSpec, hosts: Vec<HostRecord>) -> Self {
        Self {
            target,
            hosts,
            generated_at: Utc::now(),
            interrupted: false,
        }
    }

    pub fn with_interrupted(mut self, interrupted: bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    pub fn total_open_ports(&self) -> usize {
        self.hosts.iter().map(|host| host.ports.len()).sum()
    }

    pub fn total_flags(&self) -> usize {
        self.hosts.iter().map(|host| host.vulnerabilities.len()).sum()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            live_hosts: self.hosts.len(),
            open_ports: self.total_open_ports(),
            vulnerability_flags: self.total_flags(),
            flagged_hosts: self
                .hosts
                .iter()
                .filter(|host| host.is_flagged())
                .map(|host| FlaggedHost {
                    address: host.address.clone(),
                    hostname: host.hostname.clone(),
                })
                .collect(),
        }
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
    use crate::network::host::PortRecord;

    fn sample_hosts() -> Vec<HostRecord> {
        let mut gateway = HostRecord::new("192.168.1.1").with_hostname("gateway.local");
        gateway.push_port(PortRecord::open(22, "ssh"));
        gateway.push_port(PortRecord::open(80, "http"));

        let mut legacy = HostRecord::new("192.168.1.99").with_hostname("legacy-box");
        legacy.push_port(PortRecord::open(23, "telnet"));
        legacy.vulnerabilities = vec!["Plaintext protocol".into(), "EOL SMB".into()];

        vec![gateway, legacy, HostRecord::new("192.168.1.120")]
    }

    #[test]
    fn summary_counts_ports_and_flags() {
        let inventory = Inventory::assemble(AddressSpec::new("192.168.1.0/24"), sample_hosts());
        let summary = inventory.summary();

        assert_eq!(summary.live_hosts, 3);
        assert_eq!(summary.open_ports, 3);
        assert_eq!(summary.vulnerability_flags, 2);
        assert_eq!(
            summary.flagged_hosts,
            vec![FlaggedHost {
                address: "192.168.1.99".into(),
                hostname: "legacy-box".into(),
            }]
        );
    }

    #[test]
    fn empty_inventory_has_zero_counters() {
        let inventory = Inventory::assemble(AddressSpec::new("10.0.0.5"), Vec::new());
        assert_eq!(inventory.summary(), Summary::default());
        assert!(!inventory.interrupted);
    }

    #[test]
    fn json_round_trip_reproduces_hosts() {
        let inventory = Inventory::assemble(AddressSpec::new("192.168.1.0/24"), sample_hosts())
            .with_interrupted(true);

        let json = serde_json::to_string_pretty(&inventory).unwrap();
        let parsed: Inventory = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, inventory);
        assert!(json.contains("\"generatedAt\""));
    }
}
