//! The discovery → scan → flag **pipeline**.
//!
//! Every run walks each address through the same states:
//! `Candidate → Dead | Live → Scanned → Flagged`. Dead addresses leave no
//! trace. Live ones are scanned in ascending address order, one host at a
//! time and one port at a time, then flagged and folded into the
//! [`Inventory`].
//!
//! **Architectural Note:**
//! The liveness strategy, the static tables and the resolver are all handed
//! in, so this module only orchestrates. Tests drive it with scripted probes
//! against loopback listeners.

use std::sync::Arc;

use netrecon_common::config::ScanConfig;
use netrecon_common::inventory::Inventory;
use netrecon_common::network::host::HostRecord;
use netrecon_common::network::target::{self, AddressSpec, Candidate};
use netrecon_common::services::ServiceTable;
use netrecon_common::vulns::VulnRuleSet;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::discovery;
use crate::flags::FlagEngine;
use crate::network::probe::{self, LivenessProbe};
use crate::signal::StopSignal;

mod ports;
mod resolver;

pub use ports::PortScanner;
pub use resolver::HostnameResolver;

/// Progress notifications for front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Running count of live hosts found so far.
    HostFound(usize),
    /// Discovery finished with this many live hosts.
    DiscoveryDone(usize),
    ScanningHost { address: String, index: usize, total: usize },
    HostScanned { address: String, open_ports: usize, flags: usize },
}

pub struct Pipeline<'t> {
    cfg: ScanConfig,
    probe: Arc<dyn LivenessProbe>,
    services: &'t ServiceTable,
    rules: &'t VulnRuleSet,
    resolver: HostnameResolver,
    stop: StopSignal,
    events: Option<UnboundedSender<ScanEvent>>,
}

impl Pipeline<'static> {
    /// Pipeline with the built-in service and rule tables.
    pub fn new(cfg: ScanConfig, probe: Arc<dyn LivenessProbe>) -> Self {
        Pipeline::with_tables(cfg, probe, ServiceTable::standard(), VulnRuleSet::standard())
    }
}

impl<'t> Pipeline<'t> {
    pub fn with_tables(
        cfg: ScanConfig,
        probe: Arc<dyn LivenessProbe>,
        services: &'t ServiceTable,
        rules: &'t VulnRuleSet,
    ) -> Self {
        Self {
            cfg,
            probe,
            services,
            rules,
            resolver: HostnameResolver::disabled(),
            stop: StopSignal::new(),
            events: None,
        }
    }

    pub fn with_resolver(mut self, resolver: HostnameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<ScanEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Runs the whole pipeline against `target` for the given `ports`.
    ///
    /// Never fails: unreachable hosts and closed ports simply leave no
    /// record. If the stop signal is raised (by the caller or by the
    /// configured deadline) the inventory built so far is returned with
    /// `interrupted` set.
    pub async fn run(&self, target: AddressSpec, ports: &[u16]) -> Inventory {
        let deadline = self.cfg.deadline.map(|budget| self.stop.stop_after(budget));

        let candidates: Vec<Candidate> = target::expand(&target, self.cfg.limits);
        let live: Vec<Candidate> = self.discover(candidates).await;
        self.emit(ScanEvent::DiscoveryDone(live.len()));

        let hosts: Vec<HostRecord> = self.scan_and_flag(&live, ports).await;

        if let Some(handle) = deadline {
            handle.abort();
        }

        let interrupted = self.stop.is_stopped();
        if interrupted {
            warn!("Run stopped early, returning a partial inventory of {} host(s)", hosts.len());
        }

        Inventory::assemble(target, hosts).with_interrupted(interrupted)
    }

    /// Runs the liveness check on address candidates. Literal names skip it
    /// and go straight to the port scan.
    async fn discover(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let (names, addresses): (Vec<Candidate>, Vec<Candidate>) = candidates
            .into_iter()
            .partition(|candidate| matches!(candidate, Candidate::Name(_)));

        let events = self.events.clone();
        let on_host_found = move |count: usize| {
            if let Some(tx) = &events {
                let _ = tx.send(ScanEvent::HostFound(count));
            }
        };
        let on_host_found: &(dyn Fn(usize) + Send + Sync) = &on_host_found;

        let mut live = discovery::discover_live_hosts(
            addresses,
            self.probe.clone(),
            self.cfg.concurrency,
            &self.stop,
            Some(on_host_found),
        )
        .await;

        if !names.is_empty() {
            for name in &names {
                debug!("{name} is not an address, scanning it without a liveness check");
            }
            live.extend(names);
            target::sort_candidates(&mut live);
            on_host_found(live.len());
        }

        info!("Found {} live host(s)", live.len());
        live
    }

    async fn scan_and_flag(&self, live: &[Candidate], ports: &[u16]) -> Vec<HostRecord> {
        let scanner = PortScanner::new(self.services, self.cfg.connect_timeout, self.cfg.banner_timeout);
        let engine = FlagEngine::new(self.rules, self.cfg.match_scope);
        let mut hosts: Vec<HostRecord> = Vec::with_capacity(live.len());

        for (index, candidate) in live.iter().enumerate() {
            if self.stop.is_stopped() {
                break;
            }

            let address = candidate.to_string();
            self.emit(ScanEvent::ScanningHost {
                address: address.clone(),
                index,
                total: live.len(),
            });

            let hostname = tokio::select! {
                hostname = self.resolver.hostname(candidate) => hostname,
                _ = self.stop.stopped() => String::new(),
            };

            let mut record = HostRecord::new(address.clone()).with_hostname(hostname);
            for port in scanner.scan_host(candidate, ports, &self.stop).await {
                record.push_port(port);
            }
            record.vulnerabilities = engine.flag(&record);

            self.emit(ScanEvent::HostScanned {
                address,
                open_ports: record.ports.len(),
                flags: record.vulnerabilities.len(),
            });
            hosts.push(record);
        }

        hosts
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Builds a pipeline for a real run and executes it.
///
/// Picks the liveness strategy once, enables reverse DNS unless disabled in
/// `cfg`, and uses the built-in tables.
pub async fn perform_scan(
    target: AddressSpec,
    ports: &[u16],
    cfg: ScanConfig,
    stop: StopSignal,
    events: Option<UnboundedSender<ScanEvent>>,
) -> Inventory {
    let probe = probe::select_probe(cfg.probe_timeout, cfg.connect_timeout).await;
    let resolver = if cfg.no_dns {
        HostnameResolver::disabled()
    } else {
        HostnameResolver::from_system(cfg.probe_timeout)
    };

    let mut pipeline = Pipeline::new(cfg, probe)
        .with_resolver(resolver)
        .with_stop_signal(stop);
    if let Some(tx) = events {
        pipeline = pipeline.with_events(tx);
    }

    pipeline.run(target, ports).await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
