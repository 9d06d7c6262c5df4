//! Parsing of the comma-separated port list supplied by the caller.

use std::collections::HashSet;

use crate::error::PortListError;

pub const DEFAULT_PORTS: &str =
    "21,22,23,25,53,80,110,135,139,143,443,445,993,995,1723,3306,3389,5900,8080,8443";

/// Parses a list such as `"22,80,443"` or `"20-25,8080"`.
///
/// Caller order is preserved, ranges expand ascending and repeated ports keep
/// their first position only.
pub fn parse_ports(list: &str) -> Result<Vec<u16>, PortListError> {
    let mut seen: HashSet<u16> = HashSet::new();
    let mut ports: Vec<u16> = Vec::new();

    for entry in list.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let expanded: Vec<u16> = match entry.split_once('-') {
            Some((start, end)) => {
                let start = parse_single(start.trim(), entry)?;
                let end = parse_single(end.trim(), entry)?;
                if start > end {
                    return Err(PortListError::InvertedRange {
                        entry: entry.to_string(),
                    });
                }
                (start..=end).collect()
            }
            None => vec![parse_single(entry, entry)?],
        };

        for port in expanded {
            if seen.insert(port) {
                ports.push(port);
            }
        }
    }

    if ports.is_empty() {
        return Err(PortListError::Empty);
    }

    Ok(ports)
}

fn parse_single(value: &str, entry: &str) -> Result<u16, PortListError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(PortListError::NotNumeric {
            entry: entry.to_string(),
        });
    }

    match value.parse::<u32>() {
        Ok(port @ 1..=65535) => Ok(port as u16),
        _ => Err(PortListError::OutOfRange {
            entry: entry.to_string(),
        }),
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
