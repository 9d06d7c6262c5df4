use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use netrecon_common::network::target::Candidate;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Best-effort reverse DNS. Every failure resolves to an empty hostname.
pub struct HostnameResolver {
    resolver: Option<TokioAsyncResolver>,
    lookup_timeout: Duration,
}

impl HostnameResolver {
    /// Uses the system resolver configuration, or disables itself when that
    /// configuration cannot be read.
    pub fn from_system(lookup_timeout: Duration) -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => Some(resolver),
            Err(e) => {
                debug!("Reverse DNS disabled, system resolver unavailable: {e}");
                None
            }
        };
        Self {
            resolver,
            lookup_timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            resolver: None,
            lookup_timeout: Duration::ZERO,
        }
    }

    /// PTR name for an address candidate, the literal itself for a name.
    pub async fn hostname(&self, target: &Candidate) -> String {
        match target {
            Candidate::Addr(ip) => self.reverse_lookup(*ip).await.unwrap_or_default(),
            Candidate::Name(name) => name.clone(),
        }
    }

    async fn reverse_lookup(&self, ip: IpAddr) -> Option<String> {
        let resolver = self.resolver.as_ref()?;

        let lookup = match timeout(self.lookup_timeout, resolver.reverse_lookup(ip)).await {
            Ok(Ok(lookup)) => lookup,
            Ok(Err(e)) => {
                trace!("No PTR record for {ip}: {e}");
                return None;
            }
            Err(_elapsed) => {
                trace!("Reverse lookup for {ip} timed out");
                return None;
            }
        };

        lookup
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
            .filter(|name| !name.is_empty())
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
