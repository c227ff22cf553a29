// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # PEGCOIN Protocol Core Library
//!
//! Shared building blocks for the PEGCOIN stablecoin ledger: key and address
//! types, the canonical authorization digest every oracle approval and user
//! request is signed over, fixed-point arithmetic helpers, and the protocol
//! constants.
//!
//! ## Modules
//!
//! - **config**: Peg target, thresholds, purposes. Every magic number.
//! - **crypto**: Ed25519 keys, SHA-256 digests, signer recovery.
//! - **math**: Overflow-checked fixed-point helpers.
//!
//! The ledger itself lives in `pegcoin-contracts`; this crate has no state.

pub mod config;
pub mod crypto;
pub mod math;
