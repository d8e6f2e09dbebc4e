//! Configuration management for Handlink.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::DeviceId;
use crate::DEFAULT_PORT;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Node identity and gesture streaming.
    #[serde(default)]
    pub node: NodeConfig,

    /// Socket link configuration.
    #[serde(default)]
    pub link: LinkConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.node.device_id == self.node.controller_id {
            return Err(Error::InvalidConfig(
                "Node and controller device ids must differ".into(),
            ));
        }

        if self.node.send_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "Hand data send interval must be non-zero".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.node.score_threshold) {
            return Err(Error::InvalidConfig(
                "Landmark score threshold must be within 0.0..=1.0".into(),
            ));
        }

        Ok(())
    }

    /// Create example configuration.
    pub fn example() -> Self {
        Self {
            node: NodeConfig {
                greeting: "Hello from the gesture camera!".into(),
                ..NodeConfig::default()
            },
            link: LinkConfig {
                listen_addr: format!("0.0.0.0:{DEFAULT_PORT}").parse().unwrap(),
                ..LinkConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Node identity and gesture-streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This device's identifier on the packet link.
    #[serde(default = "default_device_id")]
    pub device_id: DeviceId,

    /// The remote controller's identifier.
    #[serde(default = "default_controller_id")]
    pub controller_id: DeviceId,

    /// Human-friendly name of the remote, for log lines.
    #[serde(default = "default_remote_name")]
    pub remote_name: String,

    /// Minimum interval between hand-data transmissions.
    #[serde(default = "default_send_interval", with = "humantime_serde")]
    pub send_interval: Duration,

    /// Landmark inference score a hand must exceed to count as valid.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Text sent back in reply to a device-info request.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_device_id() -> DeviceId {
    DeviceId::new(2)
}
fn default_controller_id() -> DeviceId {
    DeviceId::new(1)
}
fn default_remote_name() -> String {
    "controller".into()
}
fn default_send_interval() -> Duration {
    Duration::from_millis(300)
}
fn default_score_threshold() -> f32 {
    0.5
}
fn default_greeting() -> String {
    "Hello from the gesture camera node!".into()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device_id: default_device_id(),
            controller_id: default_controller_id(),
            remote_name: default_remote_name(),
            send_interval: default_send_interval(),
            score_threshold: default_score_threshold(),
            greeting: default_greeting(),
        }
    }
}

/// Socket link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Address to listen on for the controller's connection.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Delay between poll-loop ticks when running headless.
    #[serde(default = "default_tick_interval", with = "humantime_serde")]
    pub tick_interval: Duration,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}
fn default_tick_interval() -> Duration {
    Duration::from_millis(10)
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            tick_interval: default_tick_interval(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text or json).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable colored output.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_color() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            color: default_color(),
        }
    }
}

/// Initialize logging.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    } else {
        subscriber
            .with(fmt::layer().with_ansi(config.color))
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    }

    Ok(())
}
