mod commands;
mod export;
mod terminal;

use anyhow::Context;
use commands::{CommandLine, scan};
use netrecon_common::ports::parse_ports;
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);

    // Port syntax errors are fatal before any packet leaves the host.
    let ports: Vec<u16> = parse_ports(&commands.ports)
        .with_context(|| format!("invalid port list '{}'", commands.ports))?;
    let cfg = commands.scan_config();

    scan::scan(
        commands.target.clone(),
        &ports,
        &cfg,
        &commands.output,
        commands.format,
    )
    .await
}
