//! # Economy Error Types
//!
//! All errors that can occur in the economy stores.

use thiserror::Error;

/// Errors that can occur in the economy system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// No account row matches the wallet (case-insensitive).
    #[error("account not found: {wallet}")]
    AccountNotFound {
        /// The wallet as supplied by the caller.
        wallet: String,
    },

    /// The account has no play credit left.
    #[error("insufficient credits: have {available}, need 1")]
    InsufficientCredits {
        /// Credits on the account at the time of the check.
        available: u32,
    },

    /// The catalog has no active prize with a positive weight.
    #[error("prize catalog is empty or has zero total weight")]
    EmptyCatalog,

    /// A prize slug was not found in the catalog.
    #[error("prize not found: {0}")]
    PrizeNotFound(String),

    /// Inventory unit not found.
    #[error("inventory unit not found: {0}")]
    UnitNotFound(u64),

    /// A status transition was attempted from the wrong state.
    #[error("unit {unit_id} is {actual}, expected {expected}")]
    UnexpectedUnitStatus {
        /// The unit being transitioned.
        unit_id: u64,
        /// The status the transition requires.
        expected: &'static str,
        /// The status the unit actually has.
        actual: &'static str,
    },

    /// Arithmetic overflow in a counter.
    #[error("arithmetic overflow in ledger counter")]
    ArithmeticOverflow,

    /// Invalid configuration file or row.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The backing store could not be read or written.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
