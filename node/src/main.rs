// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # IoTeX Rosetta Gateway
//!
//! Entry point for the `iotex-rosetta-gateway` binary. Parses CLI arguments,
//! loads configuration, initializes logging and metrics, and serves the
//! Rosetta API.
//!
//! - `run`          start the gateway
//! - `check-config` validate a configuration file and print it
//! - `version`      print build version information
//!
//! This binary carries no node transport and always runs in Rosetta offline
//! mode.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

use iotex_rosetta_gateway::api::{self, AppState};
use iotex_rosetta_gateway::cli::{Commands, ConfigArgs, GatewayCli, RunArgs};
use iotex_rosetta_gateway::config::GatewayConfig;
use iotex_rosetta_gateway::logging::{self, DEFAULT_FILTER};
use iotex_rosetta_gateway::metrics::GatewayMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = GatewayCli::parse();

    match cli.command {
        Commands::Run(args) => run_gateway(args).await,
        Commands::CheckConfig(args) => check_config(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(GatewayConfig::default()),
    }
}

async fn run_gateway(args: RunArgs) -> Result<()> {
    logging::init_logging(DEFAULT_FILTER, args.log_format.into());

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!(
        blockchain = %config.network.blockchain,
        network = %config.network.network,
        chain_id = config.network.chain_id,
        port = config.server.port,
        metrics_port = config.server.metrics_port,
        "starting iotex-rosetta-gateway"
    );
    if let Some(endpoint) = &config.server.endpoint {
        tracing::warn!(
            endpoint = %endpoint,
            "node endpoint configured but this build has no node transport"
        );
    }
    tracing::warn!("running in offline mode: node-backed endpoints answer UnableToReachNode");

    let metrics = Arc::new(GatewayMetrics::new().context("failed to register metrics")?);
    let api_port = config.server.port;
    let metrics_port = config.server.metrics_port;
    let state = AppState::new(config, None, Arc::clone(&metrics));

    let api_router = api::create_router(state);
    let api_addr = format!("0.0.0.0:{api_port}");
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {api_addr}"))?;
    tracing::info!("Rosetta API listening on {}", api_addr);

    let metrics_router = api::metrics_router(metrics);
    let metrics_addr = format!("0.0.0.0:{metrics_port}");
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("iotex-rosetta-gateway stopped");
    Ok(())
}

fn check_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(Some(&args.config))?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_version() {
    println!("iotex-rosetta-gateway {}", env!("CARGO_PKG_VERSION"));
    println!("rosetta               {}", iotex_rosetta::config::ROSETTA_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// A handler that cannot be installed never fires; the other still does.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
