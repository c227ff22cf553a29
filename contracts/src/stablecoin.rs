//! # Stablecoin Engine
//!
//! Wires the ledger, the policies and the event log together behind one
//! entry point per operation. Every mutating call runs the same pipeline:
//!
//! ```text
//! pause / role guard -> policy -> ledger mutation -> one event appended
//! ```
//!
//! A call that fails at any stage returns before the ledger is touched, so
//! balances, supply, the pause flag and the event log are left exactly as
//! they were. Mutating calls take `&mut self`; callers that share an engine
//! across tasks wrap it in a lock and hold the write side for the whole call.

use pegcoin_protocol::config::DEFAULT_SUPPLY_CAP;
use pegcoin_protocol::crypto::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::access::{AccessGate, Administration, OwnerGate};
use crate::bridge::{BridgeRecorder, ChainId};
use crate::error::StablecoinError;
use crate::events::{EventLog, EventRecord, LedgerEvent};
use crate::ledger::SupplyLedger;
use crate::mint_policy::MintPolicy;
use crate::rebase::RebaseEngine;
use crate::redemption::RedemptionPolicy;
use crate::replay::ReplayGuard;
use crate::stabilizer::{self, Recommendation};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction-time parameters. None of these change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Upper bound on total supply.
    #[serde(default = "default_supply_cap")]
    pub supply_cap: u64,
    /// The only key whose mint approvals are honored.
    pub oracle: Address,
    /// Account rebases mint into and burn from.
    pub treasury: Address,
    /// Privileged role for `adjust_peg`, `pause` and `unpause` when the
    /// default [`OwnerGate`] is used.
    pub owner: Address,
    /// Reject a mint approval the second time it is presented.
    #[serde(default)]
    pub reject_replayed_mints: bool,
}

fn default_supply_cap() -> u64 {
    DEFAULT_SUPPLY_CAP
}

impl LedgerConfig {
    pub fn new(supply_cap: u64, oracle: Address, treasury: Address, owner: Address) -> Self {
        Self {
            supply_cap,
            oracle,
            treasury,
            owner,
            reject_replayed_mints: false,
        }
    }

    pub fn with_replay_protection(mut self, enabled: bool) -> Self {
        self.reject_replayed_mints = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A single-asset stablecoin ledger.
#[derive(Debug)]
pub struct Stablecoin<G: AccessGate = OwnerGate> {
    ledger: SupplyLedger,
    admin: Administration,
    gate: G,
    redemption: RedemptionPolicy,
    rebase: RebaseEngine,
    bridge: BridgeRecorder,
    /// `Some` only when replay protection is enabled.
    replay: Option<ReplayGuard>,
    events: EventLog,
}

impl Stablecoin<OwnerGate> {
    /// Builds an engine whose privileged role is `config.owner`.
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_gate(config, OwnerGate::new(config.owner))
    }
}

impl<G: AccessGate> Stablecoin<G> {
    /// Builds an engine with a custom access gate. `config.owner` is ignored.
    pub fn with_gate(config: &LedgerConfig, gate: G) -> Self {
        info!(
            supply_cap = config.supply_cap,
            oracle = %config.oracle,
            treasury = %config.treasury,
            reject_replayed_mints = config.reject_replayed_mints,
            "stablecoin ledger initialized"
        );
        Self {
            ledger: SupplyLedger::new(config.supply_cap),
            admin: Administration::new(config.oracle, config.treasury),
            gate,
            redemption: RedemptionPolicy::new(),
            rebase: RebaseEngine::new(config.treasury),
            bridge: BridgeRecorder::new(),
            replay: config.reject_replayed_mints.then(ReplayGuard::new),
            events: EventLog::new(),
        }
    }

    // -- Mutating entry points ---------------------------------------------

    /// Mints `amount` to `to` on an oracle approval.
    ///
    /// # Errors
    ///
    /// `ContractPaused`, `MalformedSignature`, `InvalidSignature`,
    /// `PegUnstable`, `SignatureReplayed` (when enabled), `SupplyCapExceeded`.
    pub fn mint(
        &mut self,
        to: Address,
        amount: u64,
        signature: &[u8],
        observed_price: u64,
    ) -> Result<EventRecord, StablecoinError> {
        self.try_mint(to, amount, signature, observed_price)
            .map_err(|err| denied("mint", err))
    }

    fn try_mint(
        &mut self,
        to: Address,
        amount: u64,
        signature: &[u8],
        observed_price: u64,
    ) -> Result<EventRecord, StablecoinError> {
        self.ensure_active()?;

        let approval =
            MintPolicy::new(self.admin.oracle()).authorize(&to, amount, signature, observed_price)?;
        if let Some(guard) = &self.replay {
            if guard.is_consumed(&approval.digest) {
                return Err(StablecoinError::SignatureReplayed);
            }
        }

        self.ledger.credit(to, amount)?;
        if let Some(guard) = &mut self.replay {
            guard.consume(approval.digest);
        }

        info!(to = %to, amount, supply = self.ledger.total_supply(), "minted");
        Ok(self.events.append(LedgerEvent::Minted { to, amount }))
    }

    /// Burns `amount` of the caller's own balance.
    ///
    /// # Errors
    ///
    /// `ContractPaused`, `InsufficientBalance`, `VolatilityTooHigh`.
    pub fn redeem(
        &mut self,
        caller: Address,
        amount: u64,
        observed_volatility: u8,
    ) -> Result<EventRecord, StablecoinError> {
        self.try_redeem(caller, amount, observed_volatility)
            .map_err(|err| denied("redeem", err))
    }

    fn try_redeem(
        &mut self,
        caller: Address,
        amount: u64,
        observed_volatility: u8,
    ) -> Result<EventRecord, StablecoinError> {
        self.ensure_active()?;
        self.redemption
            .authorize(&self.ledger, &caller, amount, observed_volatility)?;
        self.ledger.debit(caller, amount)?;

        info!(from = %caller, amount, supply = self.ledger.total_supply(), "redeemed");
        Ok(self.events.append(LedgerEvent::Redeemed {
            from: caller,
            amount,
        }))
    }

    /// Rebases supply toward the peg through the treasury. Privileged.
    ///
    /// Records `PegAdjusted` even when the delta is zero.
    ///
    /// # Errors
    ///
    /// `ContractPaused`, `Unauthorized`, `SupplyCapExceeded` (rebase mint
    /// over the cap), `InsufficientBalance` (burn larger than the treasury),
    /// `ArithmeticOverflow`.
    pub fn adjust_peg(
        &mut self,
        caller: Address,
        observed_price: u64,
        observed_volatility: u8,
    ) -> Result<EventRecord, StablecoinError> {
        self.try_adjust_peg(caller, observed_price, observed_volatility)
            .map_err(|err| denied("adjust_peg", err))
    }

    fn try_adjust_peg(
        &mut self,
        caller: Address,
        observed_price: u64,
        observed_volatility: u8,
    ) -> Result<EventRecord, StablecoinError> {
        self.ensure_active()?;
        self.ensure_privileged(&caller)?;

        let delta = self.rebase.rebase(&mut self.ledger, observed_price)?;

        info!(
            observed_price,
            volatility = observed_volatility,
            delta = ?delta,
            supply = self.ledger.total_supply(),
            "peg adjusted"
        );
        Ok(self.events.append(LedgerEvent::PegAdjusted {
            observed_price,
            volatility: observed_volatility,
            delta,
        }))
    }

    /// Burns the caller's balance and records a relay intent for
    /// `target_chain`.
    ///
    /// # Errors
    ///
    /// `ContractPaused`, `InsufficientBalance`.
    pub fn bridge_burn(
        &mut self,
        caller: Address,
        amount: u64,
        target_chain: ChainId,
    ) -> Result<EventRecord, StablecoinError> {
        self.try_bridge_burn(caller, amount, target_chain)
            .map_err(|err| denied("bridge_burn", err))
    }

    fn try_bridge_burn(
        &mut self,
        caller: Address,
        amount: u64,
        target_chain: ChainId,
    ) -> Result<EventRecord, StablecoinError> {
        self.ensure_active()?;
        let intent = self
            .bridge
            .initiate(&mut self.ledger, caller, amount, target_chain)?;

        info!(
            from = %intent.from,
            amount = intent.amount,
            target_chain = intent.target_chain,
            "bridge burn recorded"
        );
        Ok(self.events.append(LedgerEvent::Bridged {
            from: intent.from,
            amount: intent.amount,
            target_chain: intent.target_chain,
        }))
    }

    /// Sets the pause flag. Privileged; idempotent.
    pub fn pause(&mut self, caller: Address) -> Result<EventRecord, StablecoinError> {
        self.ensure_privileged(&caller)
            .map_err(|err| denied("pause", err))?;
        self.admin.set_paused(true);
        info!(by = %caller, "ledger paused");
        Ok(self.events.append(LedgerEvent::Paused { by: caller }))
    }

    /// Clears the pause flag. Privileged; idempotent.
    pub fn unpause(&mut self, caller: Address) -> Result<EventRecord, StablecoinError> {
        self.ensure_privileged(&caller)
            .map_err(|err| denied("unpause", err))?;
        self.admin.set_paused(false);
        info!(by = %caller, "ledger unpaused");
        Ok(self.events.append(LedgerEvent::Unpaused { by: caller }))
    }

    // -- Read-only ---------------------------------------------------------

    pub fn balance_of(&self, account: &Address) -> u64 {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    pub fn supply_cap(&self) -> u64 {
        self.ledger.supply_cap()
    }

    pub fn is_paused(&self) -> bool {
        self.admin.is_paused()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn ledger(&self) -> &SupplyLedger {
        &self.ledger
    }

    pub fn administration(&self) -> &Administration {
        &self.admin
    }

    pub fn replay_protection(&self) -> bool {
        self.replay.is_some()
    }

    /// Stabilization advice against the current supply. Never mutates.
    pub fn recommend(
        &self,
        observed_price: u64,
        observed_volatility: u8,
    ) -> Result<Recommendation, StablecoinError> {
        let advice =
            stabilizer::recommend(observed_price, observed_volatility, self.ledger.total_supply())?;
        debug!(
            observed_price,
            observed_volatility,
            action = ?advice.action,
            amount = advice.amount,
            "stabilization advice"
        );
        Ok(advice)
    }

    // -- Guards ------------------------------------------------------------

    fn ensure_active(&self) -> Result<(), StablecoinError> {
        if self.admin.is_paused() {
            return Err(StablecoinError::ContractPaused);
        }
        Ok(())
    }

    fn ensure_privileged(&self, caller: &Address) -> Result<(), StablecoinError> {
        if !self.gate.is_privileged(caller) {
            return Err(StablecoinError::Unauthorized);
        }
        Ok(())
    }
}

fn denied(operation: &'static str, err: StablecoinError) -> StablecoinError {
    warn!(operation, reason = err.kind(), "{}", err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::CouncilGate;
    use crate::rebase::SupplyDelta;
    use pegcoin_protocol::config::{PEG_TARGET, PURPOSE_MINT};
    use pegcoin_protocol::crypto::{sign_authorization, Keypair};

    struct Fixture {
        oracle: Keypair,
        owner: Address,
        treasury: Address,
        config: LedgerConfig,
    }

    fn fixture(cap: u64) -> Fixture {
        let oracle = Keypair::from_seed(&[0x0A; 32]);
        let owner = Address::from_bytes([0x0B; 32]);
        let treasury = Address::from_bytes([0x0C; 32]);
        let config = LedgerConfig::new(cap, oracle.address(), treasury, owner);
        Fixture {
            oracle,
            owner,
            treasury,
            config,
        }
    }

    fn holder() -> Address {
        Address::from_bytes([0x0D; 32])
    }

    fn approve(f: &Fixture, to: &Address, amount: u64) -> Vec<u8> {
        sign_authorization(&f.oracle, PURPOSE_MINT, to, amount)
    }

    #[test]
    fn mint_appends_one_event() {
        let f = fixture(1_000);
        let mut coin = Stablecoin::new(&f.config);
        let sig = approve(&f, &holder(), 250);
        let record = coin.mint(holder(), 250, &sig, PEG_TARGET).unwrap();
        assert_eq!(record.sequence, 0);
        assert_eq!(
            record.event,
            LedgerEvent::Minted {
                to: holder(),
                amount: 250
            }
        );
        assert_eq!(coin.balance_of(&holder()), 250);
        assert_eq!(coin.events().len(), 1);
    }

    #[test]
    fn denied_mint_leaves_no_trace() {
        let f = fixture(1_000);
        let mut coin = Stablecoin::new(&f.config);
        let sig = approve(&f, &holder(), 250);
        assert!(coin.mint(holder(), 250, &sig, PEG_TARGET * 2).is_err());
        assert_eq!(coin.total_supply(), 0);
        assert!(coin.events().is_empty());
    }

    #[test]
    fn replays_allowed_by_default() {
        let f = fixture(1_000);
        let mut coin = Stablecoin::new(&f.config);
        let sig = approve(&f, &holder(), 10);
        coin.mint(holder(), 10, &sig, PEG_TARGET).unwrap();
        coin.mint(holder(), 10, &sig, PEG_TARGET).unwrap();
        assert_eq!(coin.balance_of(&holder()), 20);
        assert!(!coin.replay_protection());
    }

    #[test]
    fn replay_guard_rejects_second_use() {
        let f = fixture(1_000);
        let config = f.config.clone().with_replay_protection(true);
        let mut coin = Stablecoin::new(&config);
        let sig = approve(&f, &holder(), 10);
        coin.mint(holder(), 10, &sig, PEG_TARGET).unwrap();
        assert_eq!(
            coin.mint(holder(), 10, &sig, PEG_TARGET),
            Err(StablecoinError::SignatureReplayed)
        );
        assert_eq!(coin.balance_of(&holder()), 10);
    }

    #[test]
    fn failed_mint_does_not_consume_approval() {
        let f = fixture(5);
        let config = f.config.clone().with_replay_protection(true);
        let mut coin = Stablecoin::new(&config);
        let sig = approve(&f, &holder(), 10);
        assert!(matches!(
            coin.mint(holder(), 10, &sig, PEG_TARGET),
            Err(StablecoinError::SupplyCapExceeded { .. })
        ));
        // Same approval, still unconsumed: fails on the cap again rather
        // than as a replay.
        assert!(matches!(
            coin.mint(holder(), 10, &sig, PEG_TARGET),
            Err(StablecoinError::SupplyCapExceeded { .. })
        ));
    }

    #[test]
    fn only_owner_may_rebase() {
        let f = fixture(10_000);
        let mut coin = Stablecoin::new(&f.config);
        assert_eq!(
            coin.adjust_peg(holder(), PEG_TARGET, 10),
            Err(StablecoinError::Unauthorized)
        );
        let record = coin.adjust_peg(f.owner, PEG_TARGET, 10).unwrap();
        assert_eq!(
            record.event,
            LedgerEvent::PegAdjusted {
                observed_price: PEG_TARGET,
                volatility: 10,
                delta: SupplyDelta::None
            }
        );
    }

    #[test]
    fn rebase_below_peg_funds_treasury() {
        let f = fixture(10_000);
        let mut coin = Stablecoin::new(&f.config);
        let sig = approve(&f, &holder(), 1_000);
        coin.mint(holder(), 1_000, &sig, PEG_TARGET).unwrap();

        coin.adjust_peg(f.owner, PEG_TARGET / 100 * 95, 0).unwrap();
        assert_eq!(coin.total_supply(), 1_050);
        assert_eq!(coin.balance_of(&f.treasury), 50);
    }

    #[test]
    fn pause_blocks_everything_but_unpause() {
        let f = fixture(1_000);
        let mut coin = Stablecoin::new(&f.config);
        let sig = approve(&f, &holder(), 100);
        coin.mint(holder(), 100, &sig, PEG_TARGET).unwrap();

        coin.pause(f.owner).unwrap();
        assert!(coin.is_paused());
        assert_eq!(
            coin.mint(holder(), 100, &sig, PEG_TARGET),
            Err(StablecoinError::ContractPaused)
        );
        assert_eq!(coin.redeem(holder(), 1, 0), Err(StablecoinError::ContractPaused));
        assert_eq!(
            coin.bridge_burn(holder(), 1, 10),
            Err(StablecoinError::ContractPaused)
        );
        assert_eq!(
            coin.adjust_peg(f.owner, PEG_TARGET, 0),
            Err(StablecoinError::ContractPaused)
        );
        assert_eq!(coin.balance_of(&holder()), 100);

        coin.unpause(f.owner).unwrap();
        assert!(coin.redeem(holder(), 1, 0).is_ok());
    }

    #[test]
    fn pause_requires_privilege() {
        let f = fixture(1_000);
        let mut coin = Stablecoin::new(&f.config);
        assert_eq!(coin.pause(holder()), Err(StablecoinError::Unauthorized));
        assert!(!coin.is_paused());
        assert!(coin.events().is_empty());
    }

    #[test]
    fn repeated_pause_is_idempotent_but_logged() {
        let f = fixture(1_000);
        let mut coin = Stablecoin::new(&f.config);
        coin.pause(f.owner).unwrap();
        coin.pause(f.owner).unwrap();
        assert!(coin.is_paused());
        assert_eq!(coin.events().len(), 2);
    }

    #[test]
    fn custom_gate_is_honored() {
        let f = fixture(1_000);
        let admin = Address::from_bytes([0x77; 32]);
        let mut coin = Stablecoin::with_gate(&f.config, CouncilGate::new([admin]));
        assert_eq!(coin.pause(f.owner), Err(StablecoinError::Unauthorized));
        assert!(coin.pause(admin).is_ok());
    }

    #[test]
    fn recommend_uses_current_supply() {
        let f = fixture(10_000);
        let mut coin = Stablecoin::new(&f.config);
        let sig = approve(&f, &holder(), 1_000);
        coin.mint(holder(), 1_000, &sig, PEG_TARGET).unwrap();
        let advice = coin.recommend(PEG_TARGET / 100 * 90, 0).unwrap();
        assert_eq!(advice.amount, 100);
        assert_eq!(coin.total_supply(), 1_000);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = serde_json::json!({
            "oracle": Address::from_bytes([1u8; 32]).to_hex(),
            "treasury": Address::from_bytes([2u8; 32]).to_hex(),
            "owner": Address::from_bytes([3u8; 32]).to_hex(),
        });
        let config: LedgerConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.supply_cap, DEFAULT_SUPPLY_CAP);
        assert!(!config.reject_replayed_mints);
    }
}
