//! # CLI Interface
//!
//! Command-line structure for `iotex-rosetta-gateway`, built with `clap`
//! derive. Three subcommands: `run`, `check-config` and `version`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Rosetta API gateway for the IoTeX chain.
///
/// Serves the Rosetta data and construction endpoints over HTTP and
/// exposes Prometheus metrics on a separate port.
#[derive(Parser, Debug)]
#[command(
    name = "iotex-rosetta-gateway",
    about = "Rosetta API gateway for the IoTeX chain",
    version,
    propagate_version = true
)]
pub struct GatewayCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway.
    Run(RunArgs),
    /// Load and validate a configuration file, then print it.
    CheckConfig(ConfigArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the gateway configuration file (TOML).
    ///
    /// Built-in mainnet defaults apply when omitted.
    #[arg(long, short = 'c', env = "ROSETTA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the API port from the configuration file.
    #[arg(long, env = "ROSETTA_PORT")]
    pub port: Option<u16>,

    /// Log output format.
    #[arg(long, value_enum, env = "ROSETTA_LOG_FORMAT", default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[arg(long, short = 'c', env = "ROSETTA_CONFIG")]
    pub config: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
