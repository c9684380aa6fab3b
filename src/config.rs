// Configuration for the network path tracer
// Supports CLI arguments, config file (TOML), and environment variables

use crate::error::{TraceError, TraceResult};
use crate::session::{Credentials, DeviceType};
use clap::Parser;
use ipnet::Ipv4Net;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::Level;

/// Network Path Tracer - trace networks to their native locations
#[derive(Parser, Debug, Clone)]
#[command(name = "nptrace")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Network to trace, CIDR or bare address (ex: 172.31.2.0/24)
    pub network: String,

    /// Router IP address or hostname to start from
    #[arg(short, long, env = "NPT_DEVICE")]
    pub device: String,

    /// L3 device type of the starting router
    #[arg(short = 't', long, default_value = "cisco_ios", env = "NPT_DEVICE_TYPE")]
    pub device_type: String,

    /// Path to a transcript file of captured command output
    #[arg(short = 'f', long, env = "NPT_TRANSCRIPT")]
    pub transcript: PathBuf,

    /// Print the trace report as JSON
    #[arg(long)]
    pub json: bool,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file
    #[arg(short, long, env = "NPT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Configuration file structure (TOML format)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Enable secret; defaults to the password when omitted
    #[serde(default)]
    pub secret: Option<String>,
}

/// Merged configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub network: Ipv4Net,
    pub device: String,
    pub device_type: DeviceType,
    pub transcript: PathBuf,
    pub json: bool,
    pub log_level: Level,
    pub credentials: Credentials,
}

impl Config {
    /// Load configuration from all sources
    /// Priority: CLI args > config file > defaults
    pub fn load() -> TraceResult<Self> {
        let cli_args = CliArgs::parse();
        Self::merge(cli_args)
    }

    fn merge(cli_args: CliArgs) -> TraceResult<Self> {
        let config_file = match &cli_args.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str::<ConfigFile>(&content)
                    .map_err(|e| TraceError::Config(format!("bad config file: {}", e)))?
            }
            None => ConfigFile::default(),
        };

        let network = parse_network(&cli_args.network)?;
        let device_type = DeviceType::from_label(&cli_args.device_type)
            .ok_or_else(|| TraceError::UnsupportedDeviceType(cli_args.device_type.clone()))?;
        let log_level = parse_log_level(&cli_args.log_level)?;

        Ok(Config {
            network,
            device: cli_args.device,
            device_type,
            transcript: cli_args.transcript,
            json: cli_args.json,
            log_level,
            credentials: Credentials {
                username: config_file.session.username,
                password: config_file.session.password,
                secret: config_file.session.secret,
            },
        })
    }
}

/// A bare address traces as a host route
fn parse_network(raw: &str) -> TraceResult<Ipv4Net> {
    let normalized = if raw.contains('/') {
        raw.to_string()
    } else {
        format!("{}/32", raw)
    };
    normalized
        .parse::<Ipv4Net>()
        .map(|n| n.trunc())
        .map_err(|e| TraceError::Config(format!("invalid network '{}': {}", raw, e)))
}

fn parse_log_level(level_str: &str) -> TraceResult<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(TraceError::Config(format!(
            "invalid log level: {}",
            level_str
        ))),
    }
}
