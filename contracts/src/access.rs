//! Privileged roles and the pause flag.
//!
//! The ledger doesn't care how privilege is decided, only whether a given
//! caller has it. [`AccessGate`] is that question; [`OwnerGate`] is the
//! single-owner answer used by default.

use pegcoin_protocol::crypto::Address;
use serde::{Deserialize, Serialize};

/// Decides whether a caller may run privileged operations
/// (`adjust_peg`, `pause`, `unpause`).
pub trait AccessGate {
    fn is_privileged(&self, caller: &Address) -> bool;
}

/// One owner, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerGate {
    owner: Address,
}

impl OwnerGate {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }
}

impl AccessGate for OwnerGate {
    fn is_privileged(&self, caller: &Address) -> bool {
        *caller == self.owner
    }
}

/// A fixed set of administrators. Any member is privileged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouncilGate {
    members: Vec<Address>,
}

impl CouncilGate {
    pub fn new(members: impl IntoIterator<Item = Address>) -> Self {
        let mut members: Vec<Address> = members.into_iter().collect();
        members.sort();
        members.dedup();
        Self { members }
    }

    pub fn members(&self) -> &[Address] {
        &self.members
    }
}

impl AccessGate for CouncilGate {
    fn is_privileged(&self, caller: &Address) -> bool {
        self.members.binary_search(caller).is_ok()
    }
}

/// Oracle identity, treasury account and the pause flag.
///
/// Oracle and treasury are fixed for the lifetime of the ledger. Only
/// `paused` changes, and only through the engine's guarded `pause`/`unpause`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administration {
    oracle: Address,
    treasury: Address,
    paused: bool,
}

impl Administration {
    /// Starts unpaused.
    pub fn new(oracle: Address, treasury: Address) -> Self {
        Self {
            oracle,
            treasury,
            paused: false,
        }
    }

    pub fn oracle(&self) -> &Address {
        &self.oracle
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    #[test]
    fn owner_gate_admits_only_owner() {
        let gate = OwnerGate::new(addr(1));
        assert!(gate.is_privileged(&addr(1)));
        assert!(!gate.is_privileged(&addr(2)));
        assert_eq!(gate.owner(), addr(1));
    }

    #[test]
    fn council_gate_admits_members() {
        let gate = CouncilGate::new([addr(3), addr(1), addr(3)]);
        assert_eq!(gate.members().len(), 2);
        assert!(gate.is_privileged(&addr(1)));
        assert!(gate.is_privileged(&addr(3)));
        assert!(!gate.is_privileged(&addr(2)));
    }

    #[test]
    fn administration_starts_unpaused() {
        let mut admin = Administration::new(addr(9), addr(8));
        assert!(!admin.is_paused());
        assert_eq!(*admin.oracle(), addr(9));
        assert_eq!(admin.treasury(), addr(8));
        admin.set_paused(true);
        assert!(admin.is_paused());
    }
}
