//! Sequential TCP connect scanner with short banner capture.
//!
//! Closed and filtered ports produce no record at all. Open ports are
//! recorded in the order the caller listed them.

use std::time::Duration;

use netrecon_common::network::host::PortRecord;
use netrecon_common::network::target::Candidate;
use netrecon_common::services::ServiceTable;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::network::tcp;
use crate::signal::StopSignal;

/// Bytes sent to nudge services that wait for the client to speak first.
const BANNER_PROBE: &[u8] = b"\r\n";
const BANNER_READ_SIZE: usize = 256;

pub struct PortScanner<'t> {
    services: &'t ServiceTable,
    connect_timeout: Duration,
    banner_timeout: Duration,
}

impl<'t> PortScanner<'t> {
    pub fn new(services: &'t ServiceTable, connect_timeout: Duration, banner_timeout: Duration) -> Self {
        Self {
            services,
            connect_timeout,
            banner_timeout,
        }
    }

    /// Scans `ports` one at a time against `target`.
    ///
    /// Stops before the next port once `stop` is raised and returns whatever
    /// was found up to that point.
    pub async fn scan_host(&self, target: &Candidate, ports: &[u16], stop: &StopSignal) -> Vec<PortRecord> {
        let mut records: Vec<PortRecord> = Vec::new();

        for &port in ports {
            if stop.is_stopped() {
                debug!("Scan of {target} interrupted before port {port}");
                break;
            }

            let record = tokio::select! {
                record = self.scan_port(target, port) => record,
                _ = stop.stopped() => break,
            };

            if let Some(record) = record {
                debug!("{target}:{port} open ({})", record.service);
                records.push(record);
            }
        }

        records
    }

    async fn scan_port(&self, target: &Candidate, port: u16) -> Option<PortRecord> {
        let stream = tcp::handshake(target, port, self.connect_timeout).await?;
        let banner = grab_banner(stream, self.banner_timeout).await;
        Some(PortRecord::open(port, self.services.name_of(port)).with_banner(&banner))
    }
}

/// Sends the probe bytes and reads one chunk back within `limit`.
///
/// Undecodable bytes are replaced rather than failing, surrounding
/// whitespace is trimmed. Any failure yields an empty banner.
async fn grab_banner(mut stream: TcpStream, limit: Duration) -> String {
    let exchange = async {
        stream.write_all(BANNER_PROBE).await?;
        let mut buffer = [0u8; BANNER_READ_SIZE];
        let n = stream.read(&mut buffer).await?;
        Ok::<String, std::io::Error>(String::from_utf8_lossy(&buffer[..n]).trim().to_string())
    };

    match timeout(limit, exchange).await {
        Ok(Ok(banner)) => banner,
        Ok(Err(e)) => {
            trace!("banner read failed: {e}");
            String::new()
        }
        Err(_elapsed) => String::new(),
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
