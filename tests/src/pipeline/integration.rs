use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use netrecon_common::config::ScanConfig;
use netrecon_common::inventory::Inventory;
use netrecon_common::network::host::PortState;
use netrecon_common::network::target::AddressSpec;
use netrecon_common::services::ServiceTable;
use netrecon_common::vulns::{MatchScope, VulnRuleSet};
use netrecon_core::network::probe::TcpProbe;
use netrecon_core::scanner::{self, Pipeline};
use netrecon_core::signal::StopSignal;

use super::support::{FixedProbe, HangingProbe, LOCALHOST, closed_port, fast_config, service};

/// Two listening services and one closed port: only the open two are
/// recorded, in the order they were asked for.
#[tokio::test]
async fn closed_ports_are_omitted_and_order_is_kept() {
    let ssh = service("SSH-2.0-OpenSSH_8.9\r\n").await;
    let http = service("HTTP/1.1 400 Bad Request\r\n").await;
    let closed = closed_port().await;

    let pipeline = Pipeline::new(fast_config(), Arc::new(FixedProbe::new([LOCALHOST])));
    let inventory = pipeline.run(AddressSpec::new("127.0.0.1"), &[ssh, http, closed]).await;

    assert_eq!(inventory.hosts.len(), 1);
    let host = &inventory.hosts[0];
    assert_eq!(host.address, "127.0.0.1");

    let ports: Vec<u16> = host.ports.iter().map(|p| p.port).collect();
    assert_eq!(ports, vec![ssh, http]);
    assert!(host.ports.iter().all(|p| p.state == PortState::Open));
    assert_eq!(host.ports[0].banner, "SSH-2.0-OpenSSH_8.9");
    assert!(host.vulnerabilities.is_empty());
}

#[tokio::test]
async fn unreachable_host_leaves_no_record() {
    let pipeline = Pipeline::new(fast_config(), Arc::new(FixedProbe::new([])));
    let inventory = pipeline.run(AddressSpec::new("10.0.0.5"), &[22, 80, 443]).await;

    assert!(inventory.hosts.is_empty());
    assert_eq!(inventory.summary().live_hosts, 0);
}

#[tokio::test]
async fn live_hosts_are_scanned_in_address_order() {
    let live: Vec<IpAddr> = [6u8, 2, 5, 1]
        .into_iter()
        .map(|n| IpAddr::V4(Ipv4Addr::new(127, 0, 0, n)))
        .collect();

    let pipeline = Pipeline::new(fast_config(), Arc::new(FixedProbe::new(live)));
    let inventory = pipeline.run(AddressSpec::new("127.0.0.0/29"), &[]).await;

    let order: Vec<&str> = inventory.hosts.iter().map(|h| h.address.as_str()).collect();
    assert_eq!(order, vec!["127.0.0.1", "127.0.0.2", "127.0.0.5", "127.0.0.6"]);
}

#[tokio::test]
async fn banners_and_service_names_raise_advisories() {
    let ftp = service("220 ProFTPD Server ready\r\n").await;
    let telnet = service("").await;

    let services = ServiceTable::new([(telnet, "telnet")]);
    let cfg = ScanConfig {
        match_scope: MatchScope::ServiceFields,
        ..fast_config()
    };
    let pipeline = Pipeline::with_tables(
        cfg,
        Arc::new(FixedProbe::new([LOCALHOST])),
        &services,
        VulnRuleSet::standard(),
    );

    let inventory = pipeline.run(AddressSpec::new("127.0.0.1"), &[ftp, telnet]).await;
    let host = &inventory.hosts[0];

    assert_eq!(host.ports[0].service, "unknown");
    assert_eq!(host.ports[1].service, "telnet");
    assert_eq!(host.vulnerabilities.len(), 2);
    assert!(host.vulnerabilities[0].starts_with("Telnet"));
    assert!(host.vulnerabilities[1].starts_with("FTP"));

    let summary = inventory.summary();
    assert_eq!(summary.vulnerability_flags, 2);
    assert_eq!(summary.flagged_hosts.len(), 1);
    assert_eq!(summary.flagged_hosts[0].address, "127.0.0.1");
}

#[tokio::test]
async fn deadline_returns_partial_inventory() {
    let cfg = ScanConfig {
        deadline: Some(Duration::from_millis(200)),
        ..fast_config()
    };
    let pipeline = Pipeline::new(cfg, Arc::new(HangingProbe));

    let started = Instant::now();
    let inventory = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run(AddressSpec::new("10.20.0.0/24"), &[22]),
    )
    .await
    .expect("pipeline ignored its deadline");

    assert!(inventory.interrupted);
    assert!(inventory.hosts.is_empty());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn external_stop_signal_interrupts_the_run() {
    let stop = StopSignal::new();
    let pipeline = Pipeline::new(fast_config(), Arc::new(HangingProbe)).with_stop_signal(stop.clone());

    let trigger = stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.stop();
    });

    let inventory = pipeline.run(AddressSpec::new("10.30.0.0/28"), &[22]).await;
    assert!(inventory.interrupted);
}

#[tokio::test]
async fn tcp_liveness_finds_a_listening_loopback_host() {
    let port = service("hello\r\n").await;
    let probe = TcpProbe::new(Duration::from_millis(500)).with_ports(vec![port]);

    let pipeline = Pipeline::new(fast_config(), Arc::new(probe));
    let inventory = pipeline.run(AddressSpec::new("127.0.0.1"), &[port]).await;

    assert_eq!(inventory.hosts.len(), 1);
    assert_eq!(inventory.hosts[0].ports[0].banner, "hello");
}

#[tokio::test]
async fn json_export_reproduces_host_records() {
    let port = service("SSH-2.0-OpenSSH_5.3\r\n").await;
    let pipeline = Pipeline::new(fast_config(), Arc::new(FixedProbe::new([LOCALHOST])));
    let inventory = pipeline.run(AddressSpec::new("127.0.0.1"), &[port]).await;

    let json = serde_json::to_string_pretty(&inventory).unwrap();
    let parsed: Inventory = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.hosts, inventory.hosts);
    assert_eq!(parsed, inventory);
}

#[tokio::test]
async fn malformed_target_is_scanned_as_a_literal() {
    let pipeline = Pipeline::new(fast_config(), Arc::new(FixedProbe::new([])));
    let inventory = pipeline.run(AddressSpec::new("not a network/99"), &[]).await;

    assert_eq!(inventory.hosts.len(), 1);
    assert_eq!(inventory.hosts[0].address, "not a network/99");
    assert!(inventory.hosts[0].ports.is_empty());
    assert_eq!(inventory.target.as_str(), "not a network/99");
}

/// A hostname is scanned even though its liveness ports are closed.
#[tokio::test]
async fn literal_hostname_is_scanned_without_liveness_check() {
    let port = service("SSH-2.0-OpenSSH_9.6\r\n").await;
    let closed = closed_port().await;
    let liveness = TcpProbe::new(Duration::from_millis(500)).with_ports(vec![closed]);

    let pipeline = Pipeline::new(fast_config(), Arc::new(liveness));
    let inventory = pipeline.run(AddressSpec::new("localhost"), &[port]).await;

    assert_eq!(inventory.hosts.len(), 1);
    let host = &inventory.hosts[0];
    assert_eq!(host.address, "localhost");
    let ports: Vec<u16> = host.ports.iter().map(|p| p.port).collect();
    assert_eq!(ports, vec![port]);
}

/// Runs the real probe selection and resolver; needs a routable network.
#[tokio::test]
#[ignore]
async fn perform_scan_against_unreachable_documentation_address() {
    let cfg = ScanConfig {
        no_dns: false,
        ..fast_config()
    };
    let inventory = scanner::perform_scan(AddressSpec::new("192.0.2.1"), &[22, 80], cfg, StopSignal::new(), None).await;
    assert!(inventory.hosts.is_empty());
}
