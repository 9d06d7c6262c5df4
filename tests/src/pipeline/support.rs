use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use netrecon_common::config::ScanConfig;
use netrecon_common::network::target::Candidate;
use netrecon_core::network::probe::LivenessProbe;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Answers from a fixed set of addresses, everything else is dead.
pub struct FixedProbe {
    live: HashSet<IpAddr>,
}

impl FixedProbe {
    pub fn new(live: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            live: live.into_iter().collect(),
        }
    }
}

#[async_trait]
impl LivenessProbe for FixedProbe {
    async fn is_alive(&self, target: &Candidate) -> bool {
        target.ip().is_some_and(|ip| self.live.contains(&ip))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Never answers, so only a stop signal can end discovery.
pub struct HangingProbe;

#[async_trait]
impl LivenessProbe for HangingProbe {
    async fn is_alive(&self, _target: &Candidate) -> bool {
        std::future::pending::<bool>().await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

pub fn fast_config() -> ScanConfig {
    ScanConfig {
        connect_timeout: Duration::from_millis(500),
        banner_timeout: Duration::from_millis(300),
        no_dns: true,
        ..ScanConfig::default()
    }
}

/// Loopback service that greets every client with `banner`.
pub async fn service(banner: &'static str) -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = socket.write_all(banner.as_bytes()).await;
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });
    port
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}
