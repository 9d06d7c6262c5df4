use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use pnet::ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            0
        } else {
            (end - start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }
}

/// Full range of a CIDR block, network and broadcast included.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

/// Usable host range of a block.
///
/// Strips the network and broadcast addresses. Blocks of /31 and /32 have
/// nothing to strip and are returned whole.
pub fn usable_range(network: Ipv4Network) -> Ipv4Range {
    let net_u32: u32 = network.network().into();
    let broadcast_u32: u32 = network.broadcast().into();

    if network.prefix() >= 31 {
        return Ipv4Range::new(Ipv4Addr::from(net_u32), Ipv4Addr::from(broadcast_u32));
    }

    Ipv4Range::new(
        Ipv4Addr::from(net_u32.saturating_add(1)),
        Ipv4Addr::from(broadcast_u32.saturating_sub(1)),
    )
}

/// Number of usable hosts in a block, saturating at `usize::MAX`.
pub fn usable_len(network: &IpNetwork) -> usize {
    match network {
        IpNetwork::V4(v4) => usable_range(*v4).len(),
        IpNetwork::V6(v6) => {
            let host_bits: u32 = 128 - u32::from(v6.prefix());
            if host_bits >= usize::BITS {
                return usize::MAX;
            }
            let total: usize = 1usize << host_bits;
            if host_bits == 0 { total } else { total - 1 }
        }
    }
}

/// Iterates the usable hosts of an IPv6 block in ascending order.
///
/// The subnet-router anycast address (the first one) is skipped unless the
/// block holds a single address.
pub fn ipv6_hosts(network: Ipv6Network) -> impl Iterator<Item = IpAddr> {
    let base: u128 = u128::from(network.network());
    let host_bits: u32 = 128 - u32::from(network.prefix());
    let last: u128 = if host_bits == 128 {
        u128::MAX
    } else {
        base | ((1u128 << host_bits) - 1)
    };
    let first: u128 = if host_bits == 0 { base } else { base + 1 };

    (first..=last).map(|ip| IpAddr::V6(Ipv6Addr::from(ip)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
