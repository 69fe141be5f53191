//! # Outcome Ledger
//!
//! Append-only record of every draw attempt's final disposition. One row per
//! consumed credit, never zero and never two.
//!
//! Writing is best-effort but mandatory: the pipeline attempts the write on
//! every exit path, and a failed write is logged, not re-raised.

use std::fmt;
use std::time::SystemTime;

use alloy_primitives::TxHash;
use parking_lot::Mutex;

use crate::error::{EconomyError, EconomyResult};

/// Final disposition of a draw attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutcomeStatus {
    /// Prize delivered.
    Success = 1,
    /// Prize drawn but delivery failed (configuration or chain error).
    TransferFailed = 2,
    /// The pipeline failed unexpectedly after the debit.
    Error = 3,
}

impl OutcomeStatus {
    /// Storage name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::TransferFailed => "transfer_failed",
            Self::Error => "error",
        }
    }

    /// Converts from the on-disk tag.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Success),
            2 => Some(Self::TransferFailed),
            3 => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns true if the consumed credit is a refund candidate.
    #[inline]
    #[must_use]
    pub const fn needs_operator(self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outcome ledger row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Wallet as supplied by the caller.
    pub wallet: String,
    /// Slug of the prize finally resolved (after any substitution).
    pub prize_slug: Option<String>,
    /// Shard/native amount or unique token id.
    pub amount_or_id: Option<String>,
    /// Delivery transaction.
    pub tx_hash: Option<TxHash>,
    /// Final disposition.
    pub status: OutcomeStatus,
    /// Error or operator note, truncated.
    pub error_message: Option<String>,
    /// XP granted.
    pub xp_awarded: Option<u64>,
    /// When the row was produced.
    pub recorded_at: SystemTime,
}

/// Truncates a note to `limit` characters on a character boundary.
#[must_use]
pub fn truncate_note(note: &str, limit: usize) -> String {
    match note.char_indices().nth(limit) {
        Some((cut, _)) => note[..cut].to_string(),
        None => note.to_string(),
    }
}

/// Append-only outcome storage.
pub trait OutcomeStore: Send + Sync {
    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::StoreUnavailable` if the row could not be made
    /// durable.
    fn append(&self, outcome: &DrawOutcome) -> EconomyResult<()>;
}

/// In-memory outcome ledger.
#[derive(Debug, Default)]
pub struct MemoryOutcomeStore {
    rows: Mutex<Vec<DrawOutcome>>,
    /// Remaining forced failures (for exercising the swallow path).
    fail_next: Mutex<u32>,
}

impl MemoryOutcomeStore {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row written so far.
    #[must_use]
    pub fn outcomes(&self) -> Vec<DrawOutcome> {
        self.rows.lock().clone()
    }

    /// Makes the next `count` appends fail.
    pub fn fail_next(&self, count: u32) {
        *self.fail_next.lock() = count;
    }
}

impl OutcomeStore for MemoryOutcomeStore {
    fn append(&self, outcome: &DrawOutcome) -> EconomyResult<()> {
        {
            let mut fail_next = self.fail_next.lock();
            if *fail_next > 0 {
                *fail_next -= 1;
                return Err(EconomyError::StoreUnavailable("outcome ledger offline".to_string()));
            }
        }
        self.rows.lock().push(outcome.clone());
        Ok(())
    }
}
