use colored::*;
use netrecon_common::network::host::{HostRecord, PortRecord};
use netrecon_common::vulns::{Severity, VulnRuleSet};

use crate::terminal::colors;

type Detail = (String, ColoredString);

/// Banner preview length on the console.
const CONSOLE_BANNER_CHARS: usize = 40;

pub fn host_title(host: &HostRecord) -> String {
    if host.hostname.is_empty() {
        host.address.clone()
    } else {
        format!("{} ({})", host.address, host.hostname)
    }
}

pub fn host_to_details(host: &HostRecord, rules: &VulnRuleSet) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if !host.os_guess.is_empty() {
        details.push(("OS".to_string(), host.os_guess.as_str().normal()));
    }

    if host.ports.is_empty() {
        details.push(("Ports".to_string(), "none open".dimmed()));
    }

    details.extend(host.ports.iter().map(port_to_detail));
    details.extend(
        host.vulnerabilities
            .iter()
            .map(|advisory| advisory_to_detail(advisory, rules)),
    );

    details
}

pub fn port_to_detail(port: &PortRecord) -> Detail {
    let preview: String = port.version_or_banner(CONSOLE_BANNER_CHARS);
    let value: ColoredString = if preview.is_empty() {
        port.service.color(colors::ACCENT)
    } else {
        format!("{} {}", port.service.color(colors::ACCENT), preview.dimmed()).normal()
    };
    (format!("{}/tcp", port.port), value)
}

fn advisory_to_detail(advisory: &str, rules: &VulnRuleSet) -> Detail {
    let color = match rules.severity_of(advisory) {
        Some(Severity::Critical) => colors::CRITICAL,
        _ => colors::WARNING,
    };
    ("Flag".to_string(), advisory.color(color).bold())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
