// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # PEGCOIN Node
//!
//! Entry point for the `pegcoin-node` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the ledger API.
//!
//! - `run`     serve the HTTP API and the metrics endpoint
//! - `keygen`  generate an Ed25519 keypair
//! - `sign`    produce a hex authorization envelope
//! - `version` print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use pegcoin_contracts::{LedgerConfig, Stablecoin};
use pegcoin_protocol::config::{request_purpose, DEFAULT_SUPPLY_CAP, PROTOCOL_VERSION};
use pegcoin_protocol::crypto::{sign_authorization, Keypair};

use cli::{Commands, PegcoinNodeCli};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PegcoinNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Keygen(args) => keygen(args),
        Commands::Sign(args) => sign(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Builds the ledger configuration from a JSON file, or from flags when no
/// file is given.
fn load_ledger_config(args: &cli::RunArgs) -> Result<LedgerConfig> {
    if let Some(path) = &args.config {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        return serde_json::from_str(&raw)
            .with_context(|| format!("invalid ledger config in {}", path.display()));
    }

    let oracle = args
        .oracle
        .ok_or_else(|| anyhow!("--oracle (or PEGCOIN_ORACLE) is required"))?;
    let treasury = args
        .treasury
        .ok_or_else(|| anyhow!("--treasury (or PEGCOIN_TREASURY) is required"))?;
    let owner = args
        .owner
        .ok_or_else(|| anyhow!("--owner (or PEGCOIN_OWNER) is required"))?;

    Ok(LedgerConfig::new(
        args.supply_cap.unwrap_or(DEFAULT_SUPPLY_CAP),
        oracle,
        treasury,
        owner,
    )
    .with_replay_protection(args.reject_replayed_mints))
}

/// Serves the API and metrics listeners until a shutdown signal arrives.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "pegcoin_node=info,pegcoin_contracts=info,tower_http=debug",
        args.log_format,
    );

    let config = load_ledger_config(&args)?;
    tracing::info!(
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        supply_cap = config.supply_cap,
        "starting pegcoin-node"
    );

    let node_metrics = Arc::new(NodeMetrics::new());
    let app_state = api::AppState::new(
        format!("{} (protocol {})", env!("CARGO_PKG_VERSION"), PROTOCOL_VERSION),
        Stablecoin::new(&config),
        Arc::clone(&node_metrics),
    );

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", args.bind, args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("{}:{}", args.bind, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
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
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("pegcoin-node stopped");
    Ok(())
}

/// Generates a keypair. Prints the secret, or writes it to a 0600 file.
fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let keypair = Keypair::generate();
    let secret_hex = hex::encode(keypair.secret_key_bytes());

    println!("Address    : {}", keypair.address());
    match args.out {
        Some(path) => {
            std::fs::write(&path, &secret_hex)
                .with_context(|| format!("failed to write secret key to {}", path.display()))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
            }
            println!("Secret key : written to {}", path.display());
        }
        None => println!("Secret key : {}", secret_hex),
    }
    Ok(())
}

/// Prints the hex envelope for the given authorization tuple.
fn sign(args: cli::SignArgs) -> Result<()> {
    let secret_hex = match (&args.key, &args.key_file) {
        (Some(key), _) => key.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?,
        (None, None) => bail!("one of --key (or PEGCOIN_SIGNING_KEY) or --key-file is required"),
    };
    let keypair = Keypair::from_hex(&secret_hex).context("invalid signing key")?;

    let purpose = match args.nonce {
        Some(nonce) => request_purpose(&args.purpose, nonce, args.volatility),
        None => args.purpose.clone(),
    };
    let envelope = sign_authorization(&keypair, &purpose, &args.recipient, args.amount);
    println!("{}", hex::encode(envelope));
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("pegcoin-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol     {}", PROTOCOL_VERSION);
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
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
