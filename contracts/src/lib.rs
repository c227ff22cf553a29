//! # PEGCOIN Ledger Contracts
//!
//! The stateful half of PEGCOIN: a single-asset ledger whose supply only
//! moves when a policy admits it.
//!
//! - **Supply Ledger**: balances, total supply, the cap. The only code that
//!   changes a balance.
//! - **Mint Policy**: oracle signature plus a 1% band above the peg.
//! - **Redemption Policy**: enough balance, volatility below 50.
//! - **Rebase Engine**: burns or mints through the treasury to pull supply
//!   toward the peg.
//! - **Bridge Recorder**: burns balance and records a relay intent.
//! - **Stabilizer**: read-only advice on when to rebase.
//!
//! [`Stablecoin`] ties them together and appends one event per successful
//! call.
//!
//! ## Design Principles
//!
//! 1. Validate, then mutate. A rejected call changes nothing.
//! 2. All products go through `u128`, all sums through `checked_add`.
//! 3. Prices and volatility are arguments. The ledger never invents them.
//! 4. Every public record type is serde-serializable.

pub mod access;
pub mod bridge;
pub mod error;
pub mod events;
pub mod ledger;
pub mod mint_policy;
pub mod rebase;
pub mod redemption;
pub mod replay;
pub mod stabilizer;
pub mod stablecoin;

pub use access::{AccessGate, Administration, CouncilGate, OwnerGate};
pub use error::StablecoinError;
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use rebase::SupplyDelta;
pub use replay::ReplayGuard;
pub use stabilizer::{Recommendation, StabilizationAction};
pub use stablecoin::{LedgerConfig, Stablecoin};
