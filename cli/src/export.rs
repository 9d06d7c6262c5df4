//! Report writers for a finished [`Inventory`].
//!
//! Each format is rendered independently from the same inventory, so a run
//! can write any subset of them.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use netrecon_common::inventory::Inventory;
use netrecon_common::network::host::PortRecord;

use crate::commands::ReportFormat;

/// Banner characters kept when a port has no version string.
const BANNER_PREVIEW_CHARS: usize = 60;

const CSV_HEADER: [&str; 8] = ["IP", "Hostname", "OS", "Port", "Service", "State", "Version", "Vuln Flags"];

const SERVICE_ICONS: &[(&str, &str)] = &[
    ("ssh", "🔐"),
    ("http", "🌐"),
    ("https", "🔒"),
    ("ftp", "📁"),
    ("smtp", "📧"),
    ("dns", "🗺️"),
    ("rdp", "🖥️"),
    ("smb", "📂"),
    ("mysql", "🗄️"),
    ("telnet", "⚠️"),
];

/// Writes `<base>.json`, `<base>.csv` and/or `<base>.md` and returns the
/// paths written, in that order.
pub fn write_reports(inventory: &Inventory, base: &str, format: ReportFormat) -> anyhow::Result<Vec<PathBuf>> {
    let mut written: Vec<PathBuf> = Vec::new();

    if format.includes(ReportFormat::Json) {
        let path = PathBuf::from(format!("{base}.json"));
        let json = render_json(inventory)?;
        fs::write(&path, json).with_context(|| format!("writing JSON report to {}", path.display()))?;
        written.push(path);
    }

    if format.includes(ReportFormat::Csv) {
        let path = PathBuf::from(format!("{base}.csv"));
        let file = fs::File::create(&path).with_context(|| format!("creating CSV report {}", path.display()))?;
        write_csv(inventory, io::BufWriter::new(file))
            .with_context(|| format!("writing CSV report to {}", path.display()))?;
        written.push(path);
    }

    if format.includes(ReportFormat::Md) {
        let path = PathBuf::from(format!("{base}.md"));
        fs::write(&path, render_markdown(inventory))
            .with_context(|| format!("writing Markdown report to {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

pub fn render_json(inventory: &Inventory) -> anyhow::Result<String> {
    serde_json::to_string_pretty(inventory).context("serializing inventory")
}

/// One row per open port. A host without open ports still gets one row with
/// the port columns left empty.
pub fn write_csv<W: io::Write>(inventory: &Inventory, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for host in &inventory.hosts {
        let flags: String = host.vulnerabilities.join("; ");

        if host.ports.is_empty() {
            wtr.write_record([
                host.address.as_str(),
                host.hostname.as_str(),
                host.os_guess.as_str(),
                "",
                "",
                "",
                "",
                flags.as_str(),
            ])?;
            continue;
        }

        for port in &host.ports {
            wtr.write_record([
                host.address.as_str(),
                host.hostname.as_str(),
                host.os_guess.as_str(),
                port.port.to_string().as_str(),
                port.service.as_str(),
                port.state.as_str(),
                port.version_or_banner(BANNER_PREVIEW_CHARS).as_str(),
                flags.as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn render_markdown(inventory: &Inventory) -> String {
    let mut lines: Vec<String> = vec![
        "# 🌐 Network Asset Inventory".to_string(),
        format!("**Target**: `{}`  ", inventory.target),
        format!("**Scan Date**: {}  ", inventory.generated_at.format("%Y-%m-%d %H:%M")),
        format!("**Live Hosts**: {}", inventory.hosts.len()),
    ];
    if inventory.interrupted {
        lines.push(String::new());
        lines.push("> Scan was stopped early, results are partial.".to_string());
    }
    lines.extend(["", "---", ""].map(String::from));

    for host in &inventory.hosts {
        let name = if host.hostname.is_empty() {
            String::new()
        } else {
            format!(" ({})", host.hostname)
        };
        lines.push(format!("## 🖥️ {}{name}", host.address));

        if !host.os_guess.is_empty() {
            lines.push(format!("**OS**: {}", host.os_guess));
        }

        lines.push(String::new());
        lines.push("| Port | Service | State | Version/Banner |".to_string());
        lines.push("|------|---------|-------|----------------|".to_string());
        for port in &host.ports {
            lines.push(port_row(port));
        }

        if !host.vulnerabilities.is_empty() {
            lines.push(String::new());
            lines.push("**⚠️ Security Observations:**".to_string());
            for advisory in &host.vulnerabilities {
                lines.push(format!("- {advisory}"));
            }
        }

        lines.extend(["", "---", ""].map(String::from));
    }

    lines.join("\n")
}

fn port_row(port: &PortRecord) -> String {
    let service = match service_icon(&port.service) {
        Some(icon) => format!("{icon} {}", port.service),
        None => port.service.clone(),
    };
    let detail = escape_cell(&port.version_or_banner(BANNER_PREVIEW_CHARS));
    format!("| {} | {service} | ✅ {} | {detail} |", port.port, port.state.as_str())
}

fn service_icon(service: &str) -> Option<&'static str> {
    SERVICE_ICONS
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, icon)| *icon)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
