//! # Host Discovery
//!
//! Runs the liveness probe over every candidate through a bounded pool of
//! tasks. Each finished probe reports over a channel to a single collector,
//! so no shared list is ever written concurrently. The collected set is
//! sorted before it leaves this module, whatever order the probes finished
//! in.

use std::sync::Arc;

use netrecon_common::network::target::{self, Candidate};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::network::probe::LivenessProbe;
use crate::signal::StopSignal;

/// Probes `candidates` with at most `concurrency` probes in flight.
///
/// Returns the live candidates in ascending address order. When `stop` is
/// raised, probes still running are abandoned and count as dead.
pub async fn discover_live_hosts(
    candidates: Vec<Candidate>,
    probe: Arc<dyn LivenessProbe>,
    concurrency: usize,
    stop: &StopSignal,
    on_host_found: Option<&(dyn Fn(usize) + Send + Sync)>,
) -> Vec<Candidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    info!(
        "Probing {} candidate(s) with {} workers ({})",
        candidates.len(),
        concurrency.max(1),
        probe.name()
    );

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel::<Candidate>();

    let dispatch = async {
        let mut workers: JoinSet<()> = JoinSet::new();

        for candidate in candidates {
            if stop.is_stopped() {
                break;
            }
            let permit = tokio::select! {
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_closed) => break,
                },
                _ = stop.stopped() => break,
            };

            let probe = probe.clone();
            let tx = tx.clone();
            let stop = stop.clone();
            workers.spawn(async move {
                let alive = tokio::select! {
                    alive = probe.is_alive(&candidate) => alive,
                    _ = stop.stopped() => false,
                };
                if alive {
                    let _ = tx.send(candidate);
                }
                drop(permit);
            });
        }

        // The collector ends once every sender is gone.
        drop(tx);
        while workers.join_next().await.is_some() {}
    };

    let mut live: Vec<Candidate> = Vec::new();
    let collect = async {
        while let Some(candidate) = rx.recv().await {
            debug!("{candidate} is up");
            live.push(candidate);
            if let Some(callback) = on_host_found {
                callback(live.len());
            }
        }
    };

    tokio::join!(dispatch, collect);

    target::sort_candidates(&mut live);
    live
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
