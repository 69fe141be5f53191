//! # ShardVault Shared
//!
//! Types and constants used by the economy stores, the chain bridge and the
//! play pipeline.
//!
//! ## Rule
//!
//! This crate must never depend on a store implementation or a runtime.
//! If it needs `tokio` or a lock, it belongs somewhere else.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod wallet;

pub use constants::{
    BASE_CHAIN_ID, DEFAULT_ERROR_NOTE_LIMIT, DEFAULT_RESERVATION_TIMEOUT_SECS,
    DEFAULT_SHARD_TOKEN_ID, FALLBACK_PRIZE_SLUG, SHARD_CATEGORY,
};
pub use wallet::WalletAddress;
