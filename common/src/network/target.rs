//! # Scan Target Model
//!
//! Defines what the user asked to scan and how it turns into candidates.
//!
//! A target specification can be:
//! * A single IP address (e.g., `10.0.0.5`).
//! * A CIDR block (e.g., `192.168.1.0/24`), host bits allowed.
//! * Anything else, which is kept verbatim as a literal name so that
//!   hostnames remain scannable.

use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use pnet::ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::network::range;

/// The textual target exactly as it was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressSpec(String);

impl AddressSpec {
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AddressSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for AddressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single address the prober should try.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Candidate {
    Addr(IpAddr),
    /// Literal fallback for targets that are not addresses or blocks.
    Name(String),
}

impl Candidate {
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Candidate::Addr(ip) => Some(*ip),
            Candidate::Name(_) => None,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Addr(ip) => write!(f, "{ip}"),
            Candidate::Name(name) => f.write_str(name),
        }
    }
}

// IPv4 octet-wise first, then IPv6, then literal names.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Candidate::Addr(a), Candidate::Addr(b)) => a.cmp(b),
            (Candidate::Addr(_), Candidate::Name(_)) => Ordering::Less,
            (Candidate::Name(_), Candidate::Addr(_)) => Ordering::Greater,
            (Candidate::Name(a), Candidate::Name(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bounds applied while expanding a specification.
#[derive(Debug, Clone, Copy)]
pub struct ExpandLimits {
    /// Hard cap on the number of candidates produced.
    pub max_hosts: usize,
    /// Above this many candidates a warning is emitted.
    pub large_range_threshold: usize,
}

impl Default for ExpandLimits {
    fn default() -> Self {
        Self {
            max_hosts: 65_536,
            large_range_threshold: 254,
        }
    }
}

/// Expands a target specification into ordered candidates.
///
/// Never fails: a specification that is neither an address nor a block
/// becomes a one-element list holding the literal input.
pub fn expand(spec: &AddressSpec, limits: ExpandLimits) -> Vec<Candidate> {
    let Some(network) = parse_network(spec.as_str()) else {
        debug!("'{spec}' is not an address block, keeping it as a literal target");
        return vec![Candidate::Name(spec.as_str().to_string())];
    };

    let available: usize = range::usable_len(&network);
    if available > limits.max_hosts {
        warn!(
            "{spec} holds {available} hosts, only the first {} will be probed",
            limits.max_hosts
        );
    }

    let candidates: Vec<Candidate> = match network {
        IpNetwork::V4(v4) => range::usable_range(v4)
            .to_iter()
            .take(limits.max_hosts)
            .map(Candidate::Addr)
            .collect(),
        IpNetwork::V6(v6) => range::ipv6_hosts(v6)
            .take(limits.max_hosts)
            .map(Candidate::Addr)
            .collect(),
    };

    if candidates.len() > limits.large_range_threshold {
        warn!(
            "Large range ({} hosts), this may take a while",
            candidates.len()
        );
    }

    candidates
}

/// Parses a bare address (as a single-host block) or `address/prefix`.
fn parse_network(s: &str) -> Option<IpNetwork> {
    let s = s.trim();
    if let Ok(addr) = s.parse::<IpAddr>() {
        let prefix: u8 = if addr.is_ipv4() { 32 } else { 128 };
        return IpNetwork::new(addr, prefix).ok();
    }

    let (ip_str, prefix_str) = s.split_once('/')?;
    let addr: IpAddr = ip_str.trim().parse().ok()?;
    let prefix: u8 = prefix_str.trim().parse().ok()?;
    IpNetwork::new(addr, prefix).ok()
}

/// Sorts candidates into the deterministic downstream order.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort();
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
