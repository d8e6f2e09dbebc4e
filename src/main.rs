//! Handlink node binary.
//!
//! Runs the controller link as a headless service: the vision pipeline is an
//! external collaborator, so this entry point drives the poll loop with
//! whatever hand observations the host integration supplies (none, when run
//! standalone — the link still serves device-info requests and keepalives).

use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use handlink::cli::{Cli, Commands, ConfigArgs, RunArgs};
use handlink::config::{init_logging, Config};
use handlink::controller::{ControllerLink, TickOutcome};
use handlink::error::Result;
use handlink::types::DeviceId;
use handlink::VERSION;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = handlink::config::LoggingConfig {
        level: cli.log_level.clone(),
        color: !cli.no_color,
        ..Default::default()
    };
    init_logging(&log_config)?;

    let config = if let Some(ref path) = cli.config {
        Config::load(path)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Run(args) => run_node(&args, config),
        Commands::Config(args) => write_config(&args),
    }
}

/// Run the gesture node until the controller orders a shutdown.
fn run_node(args: &RunArgs, mut config: Config) -> Result<()> {
    if let Some(listen) = args.listen {
        config.link.listen_addr = listen;
    }
    if let Some(id) = args.device_id {
        config.node.device_id = DeviceId::new(id);
    }
    if let Some(id) = args.controller_id {
        config.node.controller_id = DeviceId::new(id);
    }
    if let Some(ms) = args.send_interval_ms {
        config.node.send_interval = Duration::from_millis(ms);
    }
    config.validate()?;

    info!(
        version = VERSION,
        device_id = %config.node.device_id,
        controller_id = %config.node.controller_id,
        listen = %config.link.listen_addr,
        "starting gesture node"
    );

    let mut link = ControllerLink::new(&config.node, &config.link)?;
    let tick_interval = config.link.tick_interval;
    let score_threshold = config.node.score_threshold;

    // Standalone runs have no vision pipeline attached; the link is served
    // with empty frames. Host integrations call `ControllerLink::tick`
    // themselves with real observations.
    loop {
        match link.tick(&[], score_threshold) {
            Ok(TickOutcome::ShutdownRequested(mode)) => {
                info!(%mode, "controller requested shutdown, stopping node");
                link.drop_connection();
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "fatal link error");
                return Err(e);
            }
        }
        std::thread::sleep(tick_interval);
    }
}

/// Print or write the example configuration.
fn write_config(args: &ConfigArgs) -> Result<()> {
    let config = Config::example();
    match &args.output {
        Some(path) => {
            config.save(path)?;
            info!(path = %path.display(), "wrote example configuration");
        }
        None => {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| handlink::Error::Config(e.to_string()))?;
            print!("{text}");
        }
    }
    Ok(())
}
