use std::time::Duration;

use crate::network::target::ExpandLimits;
use crate::vulns::MatchScope;

/// Tunables for a single run of the pipeline.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Timeout for every TCP connect, liveness and port scan alike.
    pub connect_timeout: Duration,
    /// How long to wait for a banner after the probe bytes are sent.
    pub banner_timeout: Duration,
    /// Timeout for one ICMP echo and for one reverse lookup.
    pub probe_timeout: Duration,
    /// Width of the liveness worker pool.
    pub concurrency: usize,
    pub limits: ExpandLimits,
    /// Overall budget for the run. Past it the partial inventory is returned.
    pub deadline: Option<Duration>,
    /// Disables reverse DNS lookups.
    pub no_dns: bool,
    pub match_scope: MatchScope,
    pub quiet: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(1),
            banner_timeout: Duration::from_millis(500),
            probe_timeout: Duration::from_secs(1),
            concurrency: 50,
            limits: ExpandLimits::default(),
            deadline: None,
            no_dns: false,
            match_scope: MatchScope::default(),
            quiet: 0,
        }
    }
}
