use std::net::SocketAddr;
use std::time::Duration;

use netrecon_common::network::target::Candidate;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Full TCP handshake bounded by `limit`.
///
/// Literal names are resolved inside the same time budget. Refusals,
/// timeouts and resolution failures all come back as `None`.
pub async fn handshake(target: &Candidate, port: u16, limit: Duration) -> Option<TcpStream> {
    let attempt = async {
        match target {
            Candidate::Addr(ip) => TcpStream::connect(SocketAddr::new(*ip, port)).await,
            Candidate::Name(name) => TcpStream::connect((name.as_str(), port)).await,
        }
    };

    match timeout(limit, attempt).await {
        Ok(Ok(stream)) => Some(stream),
        Ok(Err(e)) => {
            trace!("{target}:{port} failed: {e}");
            None
        }
        Err(_elapsed) => {
            trace!("{target}:{port} timed out after {}ms", limit.as_millis());
            None
        }
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
