//! # Vulnerability Flag Engine
//!
//! Turns a finished host record into advisory strings by case-insensitive
//! keyword search. Pure: no I/O, no clock, no randomness. The same record
//! and rule set always give the same advisories in the same order.

use netrecon_common::network::host::{HostRecord, PortRecord};
use netrecon_common::vulns::{MatchScope, VulnRuleSet};
use serde::Serialize;

/// Borrowed view of the fields that are searched in [`MatchScope::WholeRecord`].
///
/// Advisories from an earlier pass are left out so flagging never feeds on
/// its own output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchView<'a> {
    address: &'a str,
    hostname: &'a str,
    os_guess: &'a str,
    ports: &'a [PortRecord],
}

pub struct FlagEngine<'r> {
    rules: &'r VulnRuleSet,
    scope: MatchScope,
}

impl<'r> FlagEngine<'r> {
    pub fn new(rules: &'r VulnRuleSet, scope: MatchScope) -> Self {
        Self { rules, scope }
    }

    /// One advisory per matching rule, in rule declaration order.
    ///
    /// Rules fire independently, so equal advisories from distinct rules are
    /// all kept.
    pub fn flag(&self, record: &HostRecord) -> Vec<String> {
        let haystack: String = searchable_text(record, self.scope).to_lowercase();

        self.rules
            .iter()
            .filter(|rule| haystack.contains(&rule.keyword.to_lowercase()))
            .map(|rule| rule.advisory.clone())
            .collect()
    }
}

fn searchable_text(record: &HostRecord, scope: MatchScope) -> String {
    match scope {
        MatchScope::WholeRecord => {
            let view = SearchView {
                address: &record.address,
                hostname: &record.hostname,
                os_guess: &record.os_guess,
                ports: &record.ports,
            };
            serde_json::to_string(&view)
                .unwrap_or_else(|_| service_fields_text(record))
        }
        MatchScope::ServiceFields => service_fields_text(record),
    }
}

fn service_fields_text(record: &HostRecord) -> String {
    let mut parts: Vec<&str> = vec![record.os_guess.as_str()];
    for port in &record.ports {
        parts.push(&port.service);
        parts.push(&port.banner);
        parts.push(&port.version);
    }
    parts.join("\n")
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
    use netrecon_common::vulns::{Severity, VulnRule};

    fn engine(scope: MatchScope) -> FlagEngine<'static> {
        FlagEngine::new(VulnRuleSet::standard(), scope)
    }

    fn host_with(ports: Vec<PortRecord>) -> HostRecord {
        let mut host = HostRecord::new("192.168.1.99");
        for port in ports {
            host.push_port(port);
        }
        host
    }

    #[test]
    fn telnet_port_yields_single_advisory() {
        let host = host_with(vec![PortRecord::open(23, "telnet")]);
        let flags = engine(MatchScope::WholeRecord).flag(&host);

        assert_eq!(flags.len(), 1);
        assert!(flags[0].contains("Telnet"));
    }

    #[test]
    fn independent_rules_fire_in_declaration_order() {
        let host = host_with(vec![
            PortRecord::open(445, "smb").with_version("SMBv1"),
            PortRecord::open(23, "telnet"),
        ]);
        let flags = engine(MatchScope::WholeRecord).flag(&host);

        assert_eq!(flags.len(), 2);
        assert!(flags[0].starts_with("Telnet"));
        assert!(flags[1].starts_with("SMBv1"));
    }

    #[test]
    fn matching_is_case_insensitive_and_searches_banners() {
        let host = host_with(vec![
            PortRecord::open(22, "ssh").with_banner("SSH-2.0-openssh 5.3"),
            PortRecord::open(80, "http").with_banner("Server: apache 2.2.15"),
        ]);
        let flags = engine(MatchScope::ServiceFields).flag(&host);

        assert_eq!(flags.len(), 2);
        assert!(flags[0].starts_with("OpenSSH 5"));
        assert!(flags[1].starts_with("Apache 2.2"));
    }

    #[test]
    fn flagging_is_repeatable() {
        let host = host_with(vec![
            PortRecord::open(3389, "rdp"),
            PortRecord::open(5900, "vnc"),
            PortRecord::open(21, "ftp"),
        ]);
        let engine = engine(MatchScope::WholeRecord);

        let first = engine.flag(&host);
        let second = engine.flag(&host);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn previous_advisories_are_not_searched() {
        let mut host = host_with(vec![PortRecord::open(22, "ssh")]);
        host.vulnerabilities = vec!["Telnet: plaintext protocol, replace with SSH".into()];

        assert!(engine(MatchScope::WholeRecord).flag(&host).is_empty());
    }

    #[test]
    fn hostname_only_matches_in_whole_record_scope() {
        let mut host = host_with(vec![PortRecord::open(22, "ssh")]);
        host.hostname = "ftp-backup.corp.local".into();

        let whole = engine(MatchScope::WholeRecord).flag(&host);
        assert_eq!(whole.len(), 1);
        assert!(whole[0].starts_with("FTP"));

        assert!(engine(MatchScope::ServiceFields).flag(&host).is_empty());
    }

    #[test]
    fn duplicate_advisories_from_distinct_rules_are_kept() {
        let rules = VulnRuleSet::new(vec![
            VulnRule::new("smb", "legacy file sharing", Severity::Warning),
            VulnRule::new("netbios", "legacy file sharing", Severity::Warning),
        ]);
        let host = host_with(vec![
            PortRecord::open(139, "netbios"),
            PortRecord::open(445, "smb"),
        ]);

        let flags = FlagEngine::new(&rules, MatchScope::ServiceFields).flag(&host);
        assert_eq!(flags, vec!["legacy file sharing", "legacy file sharing"]);
    }

    #[test]
    fn clean_host_has_no_flags() {
        let host = host_with(vec![
            PortRecord::open(22, "ssh").with_version("OpenSSH 8.9"),
            PortRecord::open(443, "https"),
        ]);
        assert!(engine(MatchScope::WholeRecord).flag(&host).is_empty());
    }
}
