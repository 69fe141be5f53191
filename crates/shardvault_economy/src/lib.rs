//! # ShardVault Economy
//!
//! Stores and pure logic behind the prize draw pipeline.
//!
//! ## Components
//!
//! | Module | Component |
//! |---|---|
//! | [`account`] | Balance Ledger: conditional play-credit debit, shard mirror |
//! | [`catalog`] | Prize Catalog and fallback substitution policy |
//! | [`draw`] | Weighted Draw Selector |
//! | [`inventory`] | Inventory Allocator: compare-and-swap reservation |
//! | [`xp`] | Experience Ledger |
//! | [`outcome`] / [`outcome_log`] | Outcome Ledger, in memory and on disk |
//! | [`config`] | TOML deployment file |
//!
//! ## Concurrency
//!
//! Every store is a `Send + Sync` trait taking `&self`. Conditional updates
//! (decrement-if-sufficient, reserve-if-available) each run inside a single
//! critical section, so concurrent plays can interleave freely without
//! overdrawing a balance or double-allocating a unit.
//!
//! ## Example
//!
//! ```rust,ignore
//! use shardvault_economy::{fresh_rng, select_prize, DeploymentConfig, MemoryCatalog, PrizeCatalog};
//!
//! let config = DeploymentConfig::load("config/shardvault.toml")?;
//! let catalog = MemoryCatalog::new(config.prize_definitions()?);
//!
//! let active = catalog.active_prizes()?;
//! let prize = select_prize(&active, &mut fresh_rng())?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod account;
pub mod catalog;
pub mod config;
pub mod draw;
pub mod error;
pub mod inventory;
pub mod outcome;
pub mod outcome_log;
pub mod xp;

pub use account::{AccountStore, MemoryAccountStore, PlayerAccount};
pub use catalog::{AssetKind, FallbackPolicy, MemoryCatalog, PrizeCatalog, PrizeDefinition};
pub use config::DeploymentConfig;
pub use draw::{fresh_rng, run_statistics, select_prize, DrawRng, DrawStatistics};
pub use error::{EconomyError, EconomyResult};
pub use inventory::{
    stale_reservations, InventoryStore, InventoryUnit, MemoryInventory, UnitId, UnitStatus,
};
pub use outcome::{truncate_note, DrawOutcome, MemoryOutcomeStore, OutcomeStatus, OutcomeStore};
pub use outcome_log::OutcomeLog;
pub use xp::{MemoryXpStore, XpStore};
