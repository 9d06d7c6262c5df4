pub mod scan;

use std::time::Duration;

use clap::{Parser, ValueEnum};
use netrecon_common::config::ScanConfig;
use netrecon_common::network::target::{AddressSpec, ExpandLimits};
use netrecon_common::ports::DEFAULT_PORTS;
use netrecon_common::vulns::MatchScope;

#[derive(Parser, Debug)]
#[command(name = "netrecon")]
#[command(about = "Network recon and asset inventory.")]
#[command(version)]
pub struct CommandLine {
    /// Address, CIDR block or hostname to inventory
    #[arg(default_value = "192.168.1.0/24")]
    pub target: AddressSpec,

    /// Comma-separated ports, ranges allowed (e.g. 22,80,8000-8010)
    #[arg(short, long, default_value = DEFAULT_PORTS)]
    pub ports: String,

    /// Base path of the report files, extension is added per format
    #[arg(short, long, default_value = "asset_inventory")]
    pub output: String,

    #[arg(short, long, value_enum, default_value_t = ReportFormat::All)]
    pub format: ReportFormat,

    /// Connect timeout per port and per TCP liveness attempt, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout: u64,

    /// Banner read timeout, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub banner_timeout: u64,

    /// Liveness probes in flight at once
    #[arg(short, long, default_value_t = 50)]
    pub concurrency: usize,

    /// Stop after this many seconds and keep the partial inventory
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Upper bound on addresses taken from one block
    #[arg(long, default_value_t = 65_536)]
    pub max_hosts: usize,

    /// Skip reverse DNS lookups
    #[arg(short = 'n', long)]
    pub no_dns: bool,

    /// Which fields vulnerability keywords are matched against
    #[arg(long, value_enum, default_value_t = MatchScopeArg::Record)]
    pub match_scope: MatchScopeArg,

    /// Reduce console output (-q hides host details, -qq only the summary)
    #[arg(short, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Csv,
    Md,
    All,
}

impl ReportFormat {
    pub fn includes(self, other: ReportFormat) -> bool {
        self == ReportFormat::All || self == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchScopeArg {
    /// The whole host record, hostname and address included
    Record,
    /// Service names, banners, versions and OS guess only
    Services,
}

impl From<MatchScopeArg> for MatchScope {
    fn from(arg: MatchScopeArg) -> Self {
        match arg {
            MatchScopeArg::Record => MatchScope::WholeRecord,
            MatchScopeArg::Services => MatchScope::ServiceFields,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn scan_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            connect_timeout: Duration::from_millis(self.timeout),
            banner_timeout: Duration::from_millis(self.banner_timeout),
            concurrency: self.concurrency.max(1),
            limits: ExpandLimits {
                max_hosts: self.max_hosts.max(1),
                ..defaults.limits
            },
            deadline: self.deadline.map(Duration::from_secs),
            no_dns: self.no_dns,
            match_scope: self.match_scope.into(),
            quiet: self.quiet,
            ..defaults
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
