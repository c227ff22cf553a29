//! # CLI Interface
//!
//! Command-line arguments for `pegcoin-node`, via `clap` derive. Four
//! subcommands: `run`, `keygen`, `sign` and `version`. Every `run` flag has
//! a `PEGCOIN_*` environment fallback.

use clap::{Parser, Subcommand};
use pegcoin_protocol::config::{DEFAULT_API_PORT, DEFAULT_METRICS_PORT};
use pegcoin_protocol::crypto::Address;
use std::path::PathBuf;

use crate::logging::LogFormat;

/// PEGCOIN ledger node.
///
/// Hosts a single stablecoin ledger behind an HTTP API. Mints require an
/// oracle-signed approval; every other mutating request is signed by its
/// caller.
#[derive(Parser, Debug)]
#[command(
    name = "pegcoin-node",
    about = "PEGCOIN stablecoin ledger node",
    version,
    propagate_version = true
)]
pub struct PegcoinNodeCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the ledger API and the metrics endpoint.
    Run(RunArgs),
    /// Generate a fresh Ed25519 keypair.
    Keygen(KeygenArgs),
    /// Produce a hex authorization envelope for (purpose, recipient, amount).
    Sign(SignArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Ledger configuration file (JSON). When given, it replaces the
    /// `--supply-cap`, `--oracle`, `--treasury`, `--owner` and
    /// `--reject-replayed-mints` flags.
    #[arg(long, short = 'c', env = "PEGCOIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address the API and metrics listeners bind to.
    #[arg(long, env = "PEGCOIN_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port for the HTTP API.
    #[arg(long, env = "PEGCOIN_API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "PEGCOIN_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Upper bound on total supply.
    #[arg(long, env = "PEGCOIN_SUPPLY_CAP")]
    pub supply_cap: Option<u64>,

    /// Hex address of the oracle whose mint approvals are honored.
    #[arg(long, env = "PEGCOIN_ORACLE")]
    pub oracle: Option<Address>,

    /// Hex address of the treasury account rebases mint into and burn from.
    #[arg(long, env = "PEGCOIN_TREASURY")]
    pub treasury: Option<Address>,

    /// Hex address of the administrator (adjust-peg, pause, unpause).
    #[arg(long, env = "PEGCOIN_OWNER")]
    pub owner: Option<Address>,

    /// Reject a mint approval the second time it is presented.
    #[arg(long, env = "PEGCOIN_REJECT_REPLAYED_MINTS")]
    pub reject_replayed_mints: bool,

    /// Log output format.
    #[arg(long, env = "PEGCOIN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Write the hex secret key to this file (mode 0600) instead of
    /// printing it.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Hex-encoded 32-byte Ed25519 secret key.
    #[arg(long, env = "PEGCOIN_SIGNING_KEY", conflicts_with = "key_file")]
    pub key: Option<String>,

    /// File holding the hex secret key, as written by `keygen --out`.
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// Purpose string: `mint`, `redeem`, `bridge:<chain>`, `adjust-peg`,
    /// `pause` or `unpause`.
    #[arg(long)]
    pub purpose: String,

    /// Hex recipient address. For caller-signed requests this is the
    /// caller's own address.
    #[arg(long)]
    pub recipient: Address,

    /// Amount (for `adjust-peg`, the observed price; for pause/unpause, 0).
    #[arg(long, default_value_t = 0)]
    pub amount: u64,

    /// Request nonce. Required for every caller-signed request; leave it
    /// off for oracle mint approvals.
    #[arg(long)]
    pub nonce: Option<u64>,

    /// Volatility reading signed into `redeem` and `adjust-peg` requests.
    #[arg(long, requires = "nonce")]
    pub volatility: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        PegcoinNodeCli::command().debug_assert();
    }

    #[test]
    fn sign_parses_hex_recipient() {
        let recipient = Address::from_bytes([0xAB; 32]);
        let recipient_hex = recipient.to_hex();
        let cli = PegcoinNodeCli::try_parse_from([
            "pegcoin-node",
            "sign",
            "--key",
            "00",
            "--purpose",
            "mint",
            "--recipient",
            recipient_hex.as_str(),
            "--amount",
            "500",
        ])
        .unwrap();
        match cli.command {
            Commands::Sign(args) => {
                assert_eq!(args.recipient, recipient);
                assert_eq!(args.amount, 500);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn sign_volatility_needs_a_nonce() {
        let recipient_hex = Address::from_bytes([0xAB; 32]).to_hex();
        let base = [
            "pegcoin-node",
            "sign",
            "--key",
            "00",
            "--purpose",
            "redeem",
            "--recipient",
            recipient_hex.as_str(),
            "--volatility",
            "10",
        ];
        assert!(PegcoinNodeCli::try_parse_from(base).is_err());

        let with_nonce = PegcoinNodeCli::try_parse_from(base.iter().chain(&["--nonce", "3"]))
            .unwrap();
        match with_nonce.command {
            Commands::Sign(args) => {
                assert_eq!(args.nonce, Some(3));
                assert_eq!(args.volatility, Some(10));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn run_rejects_bad_oracle_address() {
        let result =
            PegcoinNodeCli::try_parse_from(["pegcoin-node", "run", "--oracle", "not-hex"]);
        assert!(result.is_err());
    }
}
