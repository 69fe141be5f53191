//! # Play Pipeline
//!
//! One play: spend a credit, draw a prize, deliver it from the vault, and
//! write exactly one outcome row.
//!
//! ## State Machine
//!
//! ```text
//! Received ─▶ CreditChecked ─▶ CreditDebited ─▶ PrizeSelected ─┬─▶ InventoryAllocated ─┐
//!                                                              ├─▶ Substituted ────────┤
//!                                                              └───────────────────────┤
//!                                                                                      ▼
//!     Responded ◀─ OutcomeRecorded ◀─ XpApplied ◀─ Transferred ◀──── TransferAttempted
//!                        ▲                                                 │
//!                        ├───────────────────────── TransferFailed ◀──────┘
//!                        │
//!                        └── any stage after the debit, on error
//! ```
//!
//! Before the debit, failures are answered directly and leave no row: no
//! draw happened. After the debit the attempt belongs to an `OutcomeGuard`
//! and the remaining stages run on a spawned task, so a caller that goes
//! away mid-transfer does not cut the play short. The guard writes the
//! single row: from `record` on the normal path, from `Drop` if the task
//! dies first.
//!
//! ## Failure Classes
//!
//! | Class | Outcome row | Response |
//! |---|---|---|
//! | missing wallet | none | `BadRequest` |
//! | unknown account, no credits | none | `Forbidden` |
//! | missing credential/contract, chain rejection | `transfer_failed` | `success: false` |
//! | anything else after the debit | `error` | `Internal` |
//!
//! The credit is never refunded here; refunds are operator actions driven
//! by the outcome ledger.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use alloy_primitives::{TxHash, U256};
use shardvault_blockchain::{ChainClient, TransferError, VaultDispatcher};
use shardvault_economy::{
    fresh_rng, select_prize, truncate_note, AccountStore, AssetKind, DeploymentConfig,
    DrawOutcome, EconomyError, FallbackPolicy, InventoryStore, InventoryUnit, OutcomeStatus,
    OutcomeStore, PrizeCatalog, PrizeDefinition, XpStore,
};
use shardvault_shared::{WalletAddress, DEFAULT_ERROR_NOTE_LIMIT};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Caller-facing failure of a play request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// The request carried no wallet.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unknown account or no credit left. Nothing was debited.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The pipeline failed. If a credit was consumed, an `error` row exists.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Unexpected failure after the credit was debited.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A store call failed.
    #[error(transparent)]
    Store(#[from] EconomyError),

    /// A unique-asset prize was out of stock and no substitute exists.
    #[error("stockout of {slug} and no fallback prize is configured")]
    NoFallbackPrize {
        /// The prize that ran out.
        slug: String,
    },
}

// ============================================================================
// Stages and the attempt accumulator
// ============================================================================

/// Where a play currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    /// Request accepted.
    Received,
    /// Account exists and holds a credit.
    CreditChecked,
    /// One credit consumed. From here on a row is always written.
    CreditDebited,
    /// Prize drawn.
    PrizeSelected,
    /// A unit was reserved for the drawn unique-asset prize.
    InventoryAllocated,
    /// Stockout: the fallback prize replaced the drawn one.
    Substituted,
    /// Transfer submitted to the dispatcher.
    TransferAttempted,
    /// Transfer accepted by the chain.
    Transferred,
    /// Transfer failed.
    TransferFailed,
    /// Secondary side effects done.
    XpApplied,
    /// Outcome write attempted.
    OutcomeRecorded,
    /// Response built.
    Responded,
}

impl PipelineStage {
    /// Snake-case name used in logs and error notes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::CreditChecked => "credit_checked",
            Self::CreditDebited => "credit_debited",
            Self::PrizeSelected => "prize_selected",
            Self::InventoryAllocated => "inventory_allocated",
            Self::Substituted => "substituted",
            Self::TransferAttempted => "transfer_attempted",
            Self::Transferred => "transferred",
            Self::TransferFailed => "transfer_failed",
            Self::XpApplied => "xp_applied",
            Self::OutcomeRecorded => "outcome_recorded",
            Self::Responded => "responded",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about one play so far.
///
/// Threaded through every stage by `&mut`; the terminal outcome write reads
/// whatever has accumulated.
#[derive(Clone, Debug)]
pub struct DrawAttempt {
    /// Player wallet, caller casing.
    pub wallet: WalletAddress,
    /// Current stage.
    pub stage: PipelineStage,
    /// Prize finally resolved.
    pub prize_slug: Option<String>,
    /// Shard/native amount or token id.
    pub amount_or_id: Option<String>,
    /// Delivery transaction.
    pub tx_hash: Option<TxHash>,
    /// Disposition. Starts as `Error` so an early exit is never recorded as
    /// a success.
    pub status: OutcomeStatus,
    /// Operator notes, in the order they happened.
    pub notes: Vec<String>,
    /// XP granted.
    pub xp_awarded: Option<u64>,
}

impl DrawAttempt {
    /// Starts an attempt for `wallet`.
    #[must_use]
    pub fn new(wallet: WalletAddress) -> Self {
        Self {
            wallet,
            stage: PipelineStage::Received,
            prize_slug: None,
            amount_or_id: None,
            tx_hash: None,
            status: OutcomeStatus::Error,
            notes: Vec::new(),
            xp_awarded: None,
        }
    }

    /// Moves to `stage`.
    pub fn advance(&mut self, stage: PipelineStage) {
        tracing::debug!(wallet = %self.wallet, from = %self.stage, to = %stage, "play stage");
        self.stage = stage;
    }

    /// Appends an operator note.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// The outcome row for this attempt, notes joined and truncated.
    #[must_use]
    pub fn to_outcome(&self, note_limit: usize, recorded_at: SystemTime) -> DrawOutcome {
        let error_message = if self.notes.is_empty() {
            None
        } else {
            Some(truncate_note(&self.notes.join("; "), note_limit))
        };
        DrawOutcome {
            wallet: self.wallet.as_str().to_string(),
            prize_slug: self.prize_slug.clone(),
            amount_or_id: self.amount_or_id.clone(),
            tx_hash: self.tx_hash,
            status: self.status,
            error_message,
            xp_awarded: self.xp_awarded,
            recorded_at,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// The prize as shown to the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrizeDescriptor {
    /// Catalog slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Delivery kind.
    pub asset_kind: AssetKind,
    /// Image reference.
    pub image: Option<String>,
    /// Token id for unique-asset prizes.
    pub token_id: Option<U256>,
}

/// Answer to a play that consumed a credit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayResponse {
    /// True if the prize was delivered.
    pub success: bool,
    /// Human-readable explanation for a failed delivery.
    pub message: Option<String>,
    /// What was won.
    pub prize: PrizeDescriptor,
    /// XP granted.
    pub xp_gained: u64,
    /// Shards delivered.
    pub shards_gained: u64,
    /// Delivery transaction.
    pub tx_hash: Option<TxHash>,
    /// Credits left after this play.
    pub new_balance: u32,
}

// ============================================================================
// Pipeline
// ============================================================================

/// The stores a pipeline reads and writes.
#[derive(Clone)]
pub struct PipelineStores {
    /// Balance Ledger.
    pub accounts: Arc<dyn AccountStore>,
    /// Prize Catalog.
    pub catalog: Arc<dyn PrizeCatalog>,
    /// Inventory Allocator.
    pub inventory: Arc<dyn InventoryStore>,
    /// Experience Ledger.
    pub xp: Arc<dyn XpStore>,
    /// Outcome Ledger.
    pub outcomes: Arc<dyn OutcomeStore>,
}

/// Draw policy knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Stockout substitution.
    pub fallback: FallbackPolicy,
    /// Maximum characters stored in an outcome note.
    pub note_limit: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            note_limit: DEFAULT_ERROR_NOTE_LIMIT,
        }
    }
}

impl PipelineSettings {
    /// Settings from the `[draw]` section.
    #[must_use]
    pub fn from_config(config: &DeploymentConfig) -> Self {
        Self {
            fallback: config.fallback_policy(),
            note_limit: config.draw.error_note_limit,
        }
    }
}

/// The prize draw and fulfillment pipeline.
///
/// Holds no per-request state and clones cheaply; call
/// [`PlayPipeline::play`] from as many tasks as needed.
pub struct PlayPipeline<C> {
    core: Arc<PipelineCore<C>>,
}

impl<C> Clone for PlayPipeline<C> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

/// Shared state behind every clone of a pipeline.
struct PipelineCore<C> {
    stores: PipelineStores,
    dispatcher: VaultDispatcher<C>,
    settings: PipelineSettings,
}

impl<C: ChainClient + 'static> PlayPipeline<C> {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(stores: PipelineStores, dispatcher: VaultDispatcher<C>, settings: PipelineSettings) -> Self {
        Self {
            core: Arc::new(PipelineCore {
                stores,
                dispatcher,
                settings,
            }),
        }
    }

    /// The transfer dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &VaultDispatcher<C> {
        &self.core.dispatcher
    }

    /// Plays one ticket for `wallet`.
    ///
    /// Must be called inside a Tokio runtime. Once the credit is debited the
    /// rest of the play runs on its own task, so dropping the returned future
    /// (a disconnect, a timeout) stops neither the delivery nor the outcome
    /// write.
    ///
    /// # Errors
    ///
    /// - `PlayError::BadRequest` for an empty wallet
    /// - `PlayError::Forbidden` for an unknown account or no credits
    /// - `PlayError::Internal` for a store failure before the debit, or any
    ///   unexpected failure after it (an `error` row is written)
    pub async fn play(&self, wallet: &str) -> Result<PlayResponse, PlayError> {
        let wallet = WalletAddress::new(wallet);
        if wallet.is_empty() {
            return Err(PlayError::BadRequest("wallet address is required".to_string()));
        }

        let mut attempt = DrawAttempt::new(wallet);
        let balance_before = self.core.spend_credit(&mut attempt)?;

        // No await between the debit and the spawn: the guard owns the
        // attempt before the caller can go away.
        let guard = OutcomeGuard::new(
            attempt,
            Arc::clone(&self.core.stores.outcomes),
            self.core.settings.note_limit,
        );
        let core = Arc::clone(&self.core);
        let task = tokio::spawn(async move { core.finish(guard, balance_before).await });

        match task.await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "play task did not complete");
                Err(PlayError::Internal(ABANDONED_MESSAGE.to_string()))
            }
        }
    }
}

/// Answer for any play that ended in an `error` row.
const ABANDONED_MESSAGE: &str =
    "the draw could not be completed; the attempt has been logged for review";

impl<C: ChainClient> PipelineCore<C> {
    /// Every stage after the debit, then the single outcome write.
    async fn finish(
        &self,
        mut guard: OutcomeGuard,
        balance_before: u32,
    ) -> Result<PlayResponse, PlayError> {
        let new_balance = balance_before.saturating_sub(1);

        let response = match self.run_stages(&mut guard.attempt, new_balance).await {
            Ok(response) => Ok(response),
            Err(err) => {
                let attempt = &mut guard.attempt;
                tracing::error!(
                    wallet = %attempt.wallet,
                    stage = %attempt.stage,
                    error = %err,
                    "play failed after debit"
                );
                attempt.status = OutcomeStatus::Error;
                attempt.note(format!("pipeline failed at {}: {err}", attempt.stage));
                Err(PlayError::Internal(ABANDONED_MESSAGE.to_string()))
            }
        };

        guard.record();
        guard.attempt.advance(PipelineStage::Responded);
        response
    }

    /// Checks and debits one credit. Returns the balance before the debit.
    fn spend_credit(&self, attempt: &mut DrawAttempt) -> Result<u32, PlayError> {
        let forbidden_or_internal = |err: EconomyError| match err {
            EconomyError::AccountNotFound { .. } | EconomyError::InsufficientCredits { .. } => {
                tracing::info!(wallet = %attempt.wallet, reason = %err, "play refused");
                PlayError::Forbidden(err.to_string())
            }
            other => {
                tracing::error!(wallet = %attempt.wallet, error = %other, "balance ledger unavailable");
                PlayError::Internal("balance ledger unavailable".to_string())
            }
        };

        let account = self
            .stores
            .accounts
            .account(&attempt.wallet)
            .map_err(&forbidden_or_internal)?
            .ok_or_else(|| {
                forbidden_or_internal(EconomyError::AccountNotFound {
                    wallet: attempt.wallet.as_str().to_string(),
                })
            })?;
        if account.play_credits < 1 {
            return Err(forbidden_or_internal(EconomyError::InsufficientCredits {
                available: account.play_credits,
            }));
        }

        // The debit re-checks atomically; a concurrent play may have taken
        // the last credit since the read above.
        let before = self
            .stores
            .accounts
            .debit_play_credit(&attempt.wallet)
            .map_err(&forbidden_or_internal)?;

        attempt.advance(PipelineStage::CreditChecked);
        attempt.advance(PipelineStage::CreditDebited);
        tracing::info!(wallet = %attempt.wallet, credits_left = before.saturating_sub(1), "credit debited");
        Ok(before)
    }

    /// Every stage after the debit. Any `Err` becomes an `error` row.
    async fn run_stages(
        &self,
        attempt: &mut DrawAttempt,
        new_balance: u32,
    ) -> Result<PlayResponse, PipelineError> {
        let active = self.stores.catalog.active_prizes()?;
        let drawn = select_prize(&active, &mut fresh_rng())?.clone();
        attempt.prize_slug = Some(drawn.slug.clone());
        attempt.advance(PipelineStage::PrizeSelected);
        tracing::info!(wallet = %attempt.wallet, slug = %drawn.slug, "prize drawn");

        let (prize, unit) = self.allocate(attempt, drawn, &active)?;
        attempt.amount_or_id = amount_or_id(&prize, unit.as_ref());

        attempt.advance(PipelineStage::TransferAttempted);
        let transfer = self
            .dispatcher
            .transfer(&prize, unit.as_ref(), &attempt.wallet)
            .await;

        let descriptor = PrizeDescriptor {
            slug: prize.slug.clone(),
            name: prize.name.clone(),
            asset_kind: prize.asset_kind,
            image: prize.image.clone(),
            token_id: unit.as_ref().map(|u| u.token_id),
        };

        match transfer {
            Ok(tx_hash) => {
                self.on_delivered(attempt, &prize, unit.as_ref(), tx_hash);
                Ok(PlayResponse {
                    success: true,
                    message: None,
                    prize: descriptor,
                    xp_gained: attempt.xp_awarded.unwrap_or(0),
                    shards_gained: shards_gained(&prize),
                    tx_hash: Some(tx_hash),
                    new_balance,
                })
            }
            Err(err) => {
                self.on_transfer_failed(attempt, &prize, unit.as_ref(), &err);
                Ok(PlayResponse {
                    success: false,
                    message: Some(format!(
                        "You won {}, but delivery failed: {err}. The attempt has been logged for review.",
                        prize.name
                    )),
                    prize: descriptor,
                    xp_gained: 0,
                    shards_gained: 0,
                    tx_hash: None,
                    new_balance,
                })
            }
        }
    }

    /// Reserves a unit for a unique-asset prize, or substitutes on stockout.
    fn allocate(
        &self,
        attempt: &mut DrawAttempt,
        drawn: PrizeDefinition,
        active: &[PrizeDefinition],
    ) -> Result<(PrizeDefinition, Option<InventoryUnit>), PipelineError> {
        if !drawn.asset_kind.needs_inventory() {
            return Ok((drawn, None));
        }

        let reserved = self
            .stores
            .inventory
            .reserve_available(&drawn.slug, &attempt.wallet, SystemTime::now())?;
        if let Some(unit) = reserved {
            attempt.advance(PipelineStage::InventoryAllocated);
            tracing::info!(
                wallet = %attempt.wallet,
                slug = %drawn.slug,
                unit_id = unit.unit_id,
                "inventory unit reserved"
            );
            return Ok((drawn, Some(unit)));
        }

        let substitute = self
            .settings
            .fallback
            .resolve(active)
            .cloned()
            .ok_or_else(|| PipelineError::NoFallbackPrize {
                slug: drawn.slug.clone(),
            })?;

        tracing::warn!(
            wallet = %attempt.wallet,
            slug = %drawn.slug,
            substitute = %substitute.slug,
            "stockout, substituting fallback prize"
        );
        attempt.note(format!(
            "stockout: {} had no available unit, substituted {}",
            drawn.slug, substitute.slug
        ));
        attempt.prize_slug = Some(substitute.slug.clone());
        attempt.advance(PipelineStage::Substituted);
        Ok((substitute, None))
    }

    /// Success side effects. All best-effort.
    fn on_delivered(
        &self,
        attempt: &mut DrawAttempt,
        prize: &PrizeDefinition,
        unit: Option<&InventoryUnit>,
        tx_hash: TxHash,
    ) {
        attempt.advance(PipelineStage::Transferred);
        attempt.status = OutcomeStatus::Success;
        attempt.tx_hash = Some(tx_hash);
        tracing::info!(wallet = %attempt.wallet, slug = %prize.slug, %tx_hash, "prize delivered");

        if let Some(unit) = unit {
            if let Err(err) = self.stores.inventory.mark_claimed(unit.unit_id, tx_hash) {
                // The unit stays reserved and shows up in reconciliation.
                tracing::error!(
                    wallet = %attempt.wallet,
                    unit_id = unit.unit_id,
                    %tx_hash,
                    error = %err,
                    "delivered unit could not be marked claimed"
                );
                attempt.note(format!("unit {} not marked claimed: {err}", unit.unit_id));
            }
        }

        let shards = shards_gained(prize);
        if shards > 0 {
            if let Err(err) = self.stores.accounts.add_shards(&attempt.wallet, shards) {
                tracing::warn!(wallet = %attempt.wallet, shards, error = %err, "shard mirror not updated");
            }
        }

        attempt.xp_awarded = if prize.xp_reward == 0 {
            Some(0)
        } else {
            match self.stores.xp.add_xp(&attempt.wallet, prize.xp_reward) {
                Ok(_) => Some(prize.xp_reward),
                Err(err) => {
                    tracing::warn!(wallet = %attempt.wallet, xp = prize.xp_reward, error = %err, "xp not applied");
                    None
                }
            }
        };
        attempt.advance(PipelineStage::XpApplied);
    }

    /// Failure bookkeeping: the reserved unit goes to `transfer_failed`.
    fn on_transfer_failed(
        &self,
        attempt: &mut DrawAttempt,
        prize: &PrizeDefinition,
        unit: Option<&InventoryUnit>,
        err: &TransferError,
    ) {
        attempt.advance(PipelineStage::TransferFailed);
        attempt.status = OutcomeStatus::TransferFailed;
        attempt.note(format!("transfer failed: {err}"));
        tracing::warn!(wallet = %attempt.wallet, slug = %prize.slug, error = %err, "prize transfer failed");

        if let Some(unit) = unit {
            let note = truncate_note(&err.to_string(), self.settings.note_limit);
            if let Err(mark_err) = self.stores.inventory.mark_transfer_failed(unit.unit_id, &note) {
                tracing::error!(
                    wallet = %attempt.wallet,
                    unit_id = unit.unit_id,
                    error = %mark_err,
                    "failed unit could not be marked transfer_failed"
                );
            }
        }
    }
}

// ============================================================================
// Outcome guard
// ============================================================================

/// Owns a debited attempt and writes its row exactly once.
///
/// Dropped without [`OutcomeGuard::record`] (the runtime shutting down
/// mid-play, or an unwinding panic), it writes an `error` row with whatever
/// had accumulated.
struct OutcomeGuard {
    attempt: DrawAttempt,
    outcomes: Arc<dyn OutcomeStore>,
    note_limit: usize,
    recorded: bool,
}

impl OutcomeGuard {
    fn new(attempt: DrawAttempt, outcomes: Arc<dyn OutcomeStore>, note_limit: usize) -> Self {
        Self {
            attempt,
            outcomes,
            note_limit,
            recorded: false,
        }
    }

    /// The single terminal write. Failures are logged, never raised.
    fn record(&mut self) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let outcome = self.attempt.to_outcome(self.note_limit, SystemTime::now());
        match self.outcomes.append(&outcome) {
            Ok(()) => tracing::debug!(
                wallet = %self.attempt.wallet,
                status = %outcome.status,
                "outcome recorded"
            ),
            Err(err) => tracing::error!(
                wallet = %self.attempt.wallet,
                status = %outcome.status,
                slug = outcome.prize_slug.as_deref().unwrap_or("-"),
                error = %err,
                "OUTCOME WRITE FAILED: consumed credit has no ledger row"
            ),
        }
        self.attempt.advance(PipelineStage::OutcomeRecorded);
    }
}

impl Drop for OutcomeGuard {
    fn drop(&mut self) {
        // Abandoned after the debit: record it as an error
        if !self.recorded {
            let stage = self.attempt.stage;
            tracing::error!(wallet = %self.attempt.wallet, %stage, "play abandoned after debit");
            self.attempt.status = OutcomeStatus::Error;
            self.attempt.note(format!("play abandoned at {stage}"));
            self.record();
        }
    }
}

/// Shards delivered by a prize (zero for other kinds).
fn shards_gained(prize: &PrizeDefinition) -> u64 {
    match prize.asset_kind {
        AssetKind::FungibleShard => prize.shard_quantity(),
        AssetKind::FungibleNative | AssetKind::UniqueAsset => 0,
    }
}

/// The outcome's `amount_or_id` column.
fn amount_or_id(prize: &PrizeDefinition, unit: Option<&InventoryUnit>) -> Option<String> {
    match prize.asset_kind {
        AssetKind::FungibleShard => Some(prize.shard_quantity().to_string()),
        AssetKind::FungibleNative => prize.native_amount().map(|wei| wei.to_string()),
        AssetKind::UniqueAsset => unit.map(|u| u.token_id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_defaults_to_error() {
        let attempt = DrawAttempt::new(WalletAddress::new("0xA"));
        let row = attempt.to_outcome(500, SystemTime::now());
        assert_eq!(row.status, OutcomeStatus::Error);
        assert_eq!(row.prize_slug, None);
        assert_eq!(row.error_message, None);
    }

    #[test]
    fn test_attempt_notes_join_and_truncate() {
        let mut attempt = DrawAttempt::new(WalletAddress::new("0xA"));
        attempt.note("stockout: dragon_egg had no available unit, substituted shard_x5");
        attempt.note("transfer failed: chain error");

        let row = attempt.to_outcome(500, SystemTime::now());
        let message = row.error_message.unwrap();
        assert!(message.starts_with("stockout"));
        assert!(message.contains("; transfer failed"));

        let short = attempt.to_outcome(8, SystemTime::now());
        assert_eq!(short.error_message.as_deref(), Some("stockout"));
    }

    #[test]
    fn test_amount_or_id_per_kind() {
        let shard = PrizeDefinition::new("shard_x5", AssetKind::FungibleShard, 1.0);
        assert_eq!(amount_or_id(&shard, None).as_deref(), Some("5"));

        let native = PrizeDefinition::new("eth", AssetKind::FungibleNative, 1.0).with_amount(7);
        assert_eq!(amount_or_id(&native, None).as_deref(), Some("7"));

        let unique = PrizeDefinition::new("egg", AssetKind::UniqueAsset, 1.0);
        let unit = InventoryUnit::new(1, "egg", U256::from(4242));
        assert_eq!(amount_or_id(&unique, Some(&unit)).as_deref(), Some("4242"));
        assert_eq!(amount_or_id(&unique, None), None);
    }

    #[test]
    fn test_dropped_guard_writes_error_row() {
        let store = Arc::new(shardvault_economy::MemoryOutcomeStore::new());
        {
            let mut attempt = DrawAttempt::new(WalletAddress::new("0xA"));
            attempt.prize_slug = Some("dragon_egg".to_string());
            attempt.advance(PipelineStage::CreditDebited);
            attempt.advance(PipelineStage::TransferAttempted);
            let _guard = OutcomeGuard::new(attempt, store.clone(), 500);
        }

        let rows = store.outcomes();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, OutcomeStatus::Error);
        assert_eq!(rows[0].prize_slug.as_deref(), Some("dragon_egg"));
        let note = rows[0].error_message.as_deref().unwrap();
        assert!(note.contains("abandoned at transfer_attempted"));
    }

    #[test]
    fn test_recorded_guard_writes_once() {
        let store = Arc::new(shardvault_economy::MemoryOutcomeStore::new());
        {
            let mut attempt = DrawAttempt::new(WalletAddress::new("0xA"));
            attempt.status = OutcomeStatus::Success;
            let mut guard = OutcomeGuard::new(attempt, store.clone(), 500);
            guard.record();
            guard.record();
            assert_eq!(guard.attempt.stage, PipelineStage::OutcomeRecorded);
        }

        let rows = store.outcomes();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, OutcomeStatus::Success);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::CreditDebited.to_string(), "credit_debited");
        assert_eq!(PipelineStage::OutcomeRecorded.as_str(), "outcome_recorded");
    }
}
