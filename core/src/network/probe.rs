//! Liveness probing strategies.
//!
//! A host is live when any attempt succeeds: an ICMP echo through the system
//! `ping` binary, then a TCP handshake on port 80, then on 443. Which strategy
//! runs is decided once by [`select_probe`], so a missing or unprivileged
//! `ping` is detected up front instead of failing on every address.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netrecon_common::network::target::Candidate;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace};

use super::tcp;

pub const LIVENESS_PORTS: [u16; 2] = [80, 443];

/// Decides whether a single candidate answers on the network.
///
/// Implementations absorb every failure and report it as "not alive".
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_alive(&self, target: &Candidate) -> bool;

    fn name(&self) -> &'static str;
}

/// TCP-only strategy, used when ICMP is unavailable.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    ports: Vec<u16>,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            ports: LIVENESS_PORTS.to_vec(),
            connect_timeout,
        }
    }

    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }
}

#[async_trait]
impl LivenessProbe for TcpProbe {
    async fn is_alive(&self, target: &Candidate) -> bool {
        for &port in &self.ports {
            if tcp::handshake(target, port, self.connect_timeout).await.is_some() {
                trace!("{target} is alive (TCP {port})");
                return true;
            }
        }
        false
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}

/// ICMP echo first, TCP handshakes as fallback.
#[derive(Debug, Clone)]
pub struct IcmpProbe {
    echo_timeout: Duration,
    fallback: TcpProbe,
    program: String,
}

impl IcmpProbe {
    pub fn new(echo_timeout: Duration, fallback: TcpProbe) -> Self {
        Self {
            echo_timeout,
            fallback,
            program: "ping".to_string(),
        }
    }

    /// Runs a different echo binary, `ping` otherwise.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn echo(&self, target: &Candidate) -> bool {
        let wait_secs: u64 = self.echo_timeout.as_secs_f64().ceil().max(1.0) as u64;
        let mut command = ping_command(&self.program, target, wait_secs);

        // ping gets one extra second to exit on its own before being killed.
        let limit = self.echo_timeout + Duration::from_secs(1);
        match timeout(limit, command.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                trace!("{} {target} could not run: {e}", self.program);
                false
            }
            Err(_elapsed) => false,
        }
    }
}

#[async_trait]
impl LivenessProbe for IcmpProbe {
    async fn is_alive(&self, target: &Candidate) -> bool {
        if self.echo(target).await {
            trace!("{target} is alive (ICMP)");
            return true;
        }
        self.fallback.is_alive(target).await
    }

    fn name(&self) -> &'static str {
        "icmp+tcp"
    }
}

fn ping_command(program: &str, target: &Candidate, wait_secs: u64) -> Command {
    let mut command = Command::new(program);
    if matches!(target.ip(), Some(ip) if ip.is_ipv6()) {
        command.arg("-6");
    }
    command
        .arg("-c")
        .arg("1")
        .arg("-W")
        .arg(wait_secs.to_string())
        .arg(target.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    command
}

/// Picks the liveness strategy for this run.
///
/// `ping` is checked once against the loopback address. If it cannot be
/// spawned, or is not permitted to send echo requests, probing downgrades
/// to TCP only.
pub async fn select_probe(echo_timeout: Duration, connect_timeout: Duration) -> Arc<dyn LivenessProbe> {
    let fallback = TcpProbe::new(connect_timeout);
    let loopback = Candidate::Addr(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let icmp = IcmpProbe::new(echo_timeout, fallback.clone());

    if icmp.echo(&loopback).await {
        debug!("ICMP probing available");
        Arc::new(icmp)
    } else {
        debug!("ping unavailable or not permitted, using TCP-only liveness probing");
        Arc::new(fallback)
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
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn tcp_probe_finds_listening_host() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(Duration::from_millis(500)).with_ports(vec![port]);
        assert!(probe.is_alive(&Candidate::Addr(LOCALHOST)).await);
    }

    #[tokio::test]
    async fn tcp_probe_tries_every_port() {
        let closed = {
            let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let open = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(Duration::from_millis(500)).with_ports(vec![closed, open]);
        assert!(probe.is_alive(&Candidate::Addr(LOCALHOST)).await);
    }

    #[tokio::test]
    async fn tcp_probe_treats_refusal_as_dead() {
        let closed = {
            let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = TcpProbe::new(Duration::from_millis(500)).with_ports(vec![closed]);
        assert!(!probe.is_alive(&Candidate::Addr(LOCALHOST)).await);
    }

    #[tokio::test]
    async fn unresolvable_literal_is_not_alive() {
        let probe = TcpProbe::new(Duration::from_millis(500));
        let target = Candidate::Name("no-such-host.invalid".to_string());
        assert!(!probe.is_alive(&target).await);
    }

    const MISSING_PING: &str = "netrecon-test-no-such-ping";

    #[tokio::test]
    async fn icmp_falls_back_to_tcp_when_echo_fails() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let fallback = TcpProbe::new(Duration::from_millis(500)).with_ports(vec![port]);
        let probe = IcmpProbe::new(Duration::from_secs(1), fallback).with_program(MISSING_PING);
        assert!(probe.is_alive(&Candidate::Addr(LOCALHOST)).await);
    }

    #[tokio::test]
    async fn icmp_is_dead_when_echo_and_fallback_fail() {
        let closed = {
            let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let fallback = TcpProbe::new(Duration::from_millis(500)).with_ports(vec![closed]);
        let probe = IcmpProbe::new(Duration::from_secs(1), fallback).with_program(MISSING_PING);
        assert!(!probe.is_alive(&Candidate::Addr(LOCALHOST)).await);
    }

    #[tokio::test]
    async fn selected_probe_is_usable() {
        let probe = select_probe(Duration::from_secs(1), Duration::from_millis(200)).await;
        assert!(["icmp+tcp", "tcp"].contains(&probe.name()));
    }
}
