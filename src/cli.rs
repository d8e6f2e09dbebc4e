//! Command-line interface for the Handlink node.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Handlink - camera-edge gesture node
#[derive(Parser, Debug)]
#[command(
    name = "handlink",
    author,
    version,
    about = "Camera-edge hand-gesture node streaming pose data to a remote controller",
    long_about = r#"
Handlink listens for a connection from a remote controller and streams decoded
hand-pose data to it over a compact checksummed binary packet link. The
controller can request device information, push log messages, and order an
operating-system shutdown over the same link.

QUICK START:
  Serve:   handlink run
  Config:  handlink config --output handlink.toml
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gesture node
    Run(RunArgs),

    /// Show or write an example configuration
    Config(ConfigArgs),
}

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Listen address for the controller's connection
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// This device's identifier on the packet link
    #[arg(long)]
    pub device_id: Option<u8>,

    /// The remote controller's identifier
    #[arg(long)]
    pub controller_id: Option<u8>,

    /// Minimum milliseconds between hand-data transmissions
    #[arg(long)]
    pub send_interval_ms: Option<u64>,
}

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output path (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
