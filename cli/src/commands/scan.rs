use std::time::{Duration, Instant};

use colored::*;
use netrecon_common::config::ScanConfig;
use netrecon_common::inventory::{Inventory, Summary};
use netrecon_common::network::target::AddressSpec;
use netrecon_common::vulns::VulnRuleSet;
use netrecon_core::scanner::{self, ScanEvent};
use netrecon_core::signal::StopSignal;
use tokio::sync::mpsc;
use tracing::{Instrument, info, info_span, warn};

use crate::commands::ReportFormat;
use crate::export;
use crate::mprint;
use crate::terminal::input::InputHandle;
use crate::terminal::spinner::{self, SpinnerHandle};
use crate::terminal::{colors, format, print};

pub async fn scan(
    target: AddressSpec,
    ports: &[u16],
    cfg: &ScanConfig,
    output: &str,
    report_format: ReportFormat,
) -> anyhow::Result<()> {
    announce(&target, ports, cfg);

    let start_time: Instant = Instant::now();
    let inventory: Inventory = run_with_progress(target, ports, cfg).await;

    print_hosts(&inventory, cfg);

    let written = export::write_reports(&inventory, output, report_format)?;
    for path in &written {
        info!("Report saved to {}", path.display());
    }

    print_summary(&inventory.summary(), start_time.elapsed(), inventory.interrupted, cfg);
    Ok(())
}

fn announce(target: &AddressSpec, ports: &[u16], cfg: &ScanConfig) {
    print::banner(cfg.quiet);
    print::header("starting recon", cfg.quiet);
    if cfg.quiet == 0 {
        print::key_value_block(&[
            ("Target", target.to_string().normal()),
            ("Ports", format!("{} port(s)", ports.len()).normal()),
        ]);
    }
    warn!("Only scan networks you own or have permission to scan");
}

async fn run_with_progress(target: AddressSpec, ports: &[u16], cfg: &ScanConfig) -> Inventory {
    let span = info_span!("recon", indicatif.pb_show = true);
    let spinner_handle = SpinnerHandle::start(span.clone());

    let stop = StopSignal::new();
    let _input = InputHandle::start(stop.clone());

    let (tx, mut rx) = mpsc::unbounded_channel::<ScanEvent>();
    let progress = async {
        while let Some(event) = rx.recv().await {
            match event {
                ScanEvent::HostFound(count) => spinner_handle.send_to_queue(spinner::hosts_found_message(count)),
                ScanEvent::DiscoveryDone(count) => info!("Discovery finished, {count} live host(s)"),
                ScanEvent::ScanningHost { address, index, total } => {
                    spinner_handle.send_to_queue(spinner::scanning_message(&address, index, total))
                }
                ScanEvent::HostScanned { address, open_ports, flags } => {
                    info!("{address}: {open_ports} open port(s), {flags} flag(s)")
                }
            }
        }
    };

    let run = scanner::perform_scan(target, ports, cfg.clone(), stop.clone(), Some(tx))
        .instrument(spinner_handle.span().clone());

    let (inventory, ()) = tokio::join!(run, progress);
    spinner_handle.finish();
    drop(span);
    inventory
}

fn print_hosts(inventory: &Inventory, cfg: &ScanConfig) {
    if inventory.hosts.is_empty() {
        print::header("ZERO HOSTS DETECTED", cfg.quiet);
        if cfg.quiet == 0 {
            print::no_results();
        }
        return;
    }

    if cfg.quiet > 0 {
        return;
    }

    print::header("Asset Inventory", cfg.quiet);
    let rules = VulnRuleSet::standard();
    for (idx, host) in inventory.hosts.iter().enumerate() {
        print::tree_head(idx, &format::host_title(host));
        print::as_tree_one_level(format::host_to_details(host, rules));
        if idx + 1 != inventory.hosts.len() {
            mprint!();
        }
    }
}

fn print_summary(summary: &Summary, total_time: Duration, interrupted: bool, cfg: &ScanConfig) {
    if cfg.quiet > 0 {
        mprint!();
    }
    print::header("Scan Summary", 0);

    let flags: ColoredString = if summary.vulnerability_flags > 0 {
        summary.vulnerability_flags.to_string().bold().red()
    } else {
        summary.vulnerability_flags.to_string().bold()
    };
    print::key_value_block(&[
        ("Live Hosts", summary.live_hosts.to_string().bold().green()),
        ("Open Ports", summary.open_ports.to_string().bold()),
        ("Vuln Flags", flags),
        ("Elapsed", format!("{:.2}s", total_time.as_secs_f64()).yellow()),
    ]);

    if !summary.flagged_hosts.is_empty() {
        mprint!();
        print::print_status("Hosts requiring attention".color(colors::CRITICAL).bold().to_string());
        for host in &summary.flagged_hosts {
            let hostname: &str = if host.hostname.is_empty() { "N/A" } else { &host.hostname };
            mprint!(&format!("   • {} ({})", host.address.color(colors::PRIMARY), hostname));
        }
    }

    if interrupted {
        mprint!();
        warn!("Run was stopped early, the inventory is partial");
    }
    print::end_of_program();
}
