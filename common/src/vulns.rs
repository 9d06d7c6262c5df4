//! Keyword rules for the vulnerability flag engine.
//!
//! Rules are matched in declaration order and each one fires on its own.

use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VulnRule {
    pub keyword: String,
    pub advisory: String,
    pub severity: Severity,
}

impl VulnRule {
    pub fn new(keyword: impl Into<String>, advisory: impl Into<String>, severity: Severity) -> Self {
        Self {
            keyword: keyword.into(),
            advisory: advisory.into(),
            severity,
        }
    }
}

/// Which parts of a host record the keywords are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchScope {
    /// The whole serialized record, address and hostname included.
    #[default]
    WholeRecord,
    /// Service names, banners, versions and the OS guess only.
    ServiceFields,
}

const STANDARD_RULES: &[(&str, &str, Severity)] = &[
    ("Telnet", "Telnet: plaintext protocol, replace with SSH", Severity::Warning),
    ("FTP", "FTP: plaintext protocol, use SFTP/FTPS", Severity::Warning),
    ("SMBv1", "SMBv1: EternalBlue-vulnerable SMB version", Severity::Critical),
    ("OpenSSH 5", "OpenSSH 5: outdated SSH with multiple CVEs", Severity::Critical),
    ("Apache 2.2", "Apache 2.2: end-of-life Apache version", Severity::Critical),
    ("IIS/6", "IIS/6: end-of-life IIS with critical vulnerabilities", Severity::Critical),
    (
        "RDP",
        "RDP: ensure NLA is enforced and patched (BlueKeep: CVE-2019-0708)",
        Severity::Warning,
    ),
    ("MySQL 5.5", "MySQL 5.5: end-of-life MySQL, upgrade recommended", Severity::Warning),
    ("VNC", "VNC: check that VNC authentication is enabled", Severity::Warning),
];

static STANDARD: OnceLock<VulnRuleSet> = OnceLock::new();

/// Ordered, immutable rule table.
#[derive(Debug, Clone, Default)]
pub struct VulnRuleSet {
    rules: Vec<VulnRule>,
}

impl VulnRuleSet {
    pub fn new(rules: Vec<VulnRule>) -> Self {
        Self { rules }
    }

    pub fn standard() -> &'static VulnRuleSet {
        STANDARD.get_or_init(|| {
            VulnRuleSet::new(
                STANDARD_RULES
                    .iter()
                    .map(|(keyword, advisory, severity)| VulnRule::new(*keyword, *advisory, *severity))
                    .collect(),
            )
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &VulnRule> {
        self.rules.iter()
    }

    /// Severity of the rule that produced `advisory`, if any.
    pub fn severity_of(&self, advisory: &str) -> Option<Severity> {
        self.rules
            .iter()
            .find(|rule| rule.advisory == advisory)
            .map(|rule| rule.severity)
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
    fn standard_rules_keep_declaration_order() {
        let keywords: Vec<&str> = VulnRuleSet::standard()
            .iter()
            .map(|rule| rule.keyword.as_str())
            .collect();
        assert_eq!(
            keywords,
            vec![
                "Telnet",
                "FTP",
                "SMBv1",
                "OpenSSH 5",
                "Apache 2.2",
                "IIS/6",
                "RDP",
                "MySQL 5.5",
                "VNC"
            ]
        );
    }

    #[test]
    fn every_advisory_names_its_keyword() {
        for rule in VulnRuleSet::standard().iter() {
            assert!(rule.advisory.contains(&rule.keyword), "{}", rule.advisory);
        }
    }

    #[test]
    fn severity_lookup_by_advisory() {
        let rules = VulnRuleSet::standard();
        let smb = rules.iter().find(|r| r.keyword == "SMBv1").unwrap();
        assert_eq!(rules.severity_of(&smb.advisory), Some(Severity::Critical));
        assert_eq!(rules.severity_of("something else"), None);
    }
}
