use std::collections::HashMap;
use std::sync::OnceLock;

pub const UNKNOWN_SERVICE: &str = "unknown";

const WELL_KNOWN: &[(u16, &str)] = &[
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "dns"),
    (80, "http"),
    (110, "pop3"),
    (135, "msrpc"),
    (139, "netbios"),
    (143, "imap"),
    (443, "https"),
    (445, "smb"),
    (993, "imaps"),
    (995, "pop3s"),
    (1723, "pptp"),
    (3306, "mysql"),
    (3389, "rdp"),
    (5900, "vnc"),
    (8080, "http-alt"),
    (8443, "https-alt"),
];

static STANDARD: OnceLock<ServiceTable> = OnceLock::new();

/// Port to canonical service name lookup.
#[derive(Debug, Clone, Default)]
pub struct ServiceTable {
    names: HashMap<u16, String>,
}

impl ServiceTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(port, name)| (port, name.into()))
                .collect(),
        }
    }

    /// The built-in table, created on first use and shared afterwards.
    pub fn standard() -> &'static ServiceTable {
        STANDARD.get_or_init(|| ServiceTable::new(WELL_KNOWN.iter().copied()))
    }

    /// Unlisted ports are labelled [`UNKNOWN_SERVICE`].
    pub fn name_of(&self, port: u16) -> &str {
        self.names
            .get(&port)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SERVICE)
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
    fn standard_table_names_common_ports() {
        let table = ServiceTable::standard();
        assert_eq!(table.name_of(22), "ssh");
        assert_eq!(table.name_of(3389), "rdp");
        assert_eq!(table.name_of(8443), "https-alt");
    }

    #[test]
    fn unlisted_ports_are_unknown() {
        assert_eq!(ServiceTable::standard().name_of(9999), UNKNOWN_SERVICE);
        assert_eq!(ServiceTable::default().name_of(22), UNKNOWN_SERVICE);
    }
}
