//! # ShardVault
//!
//! The prize draw and fulfillment pipeline, integrating all units.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SHARDVAULT PIPELINE                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │ Balance Ledger  │────>│ Catalog + Draw  │────>│   Inventory     │    │
//! │  │ (debit 1)       │     │ (weighted)      │     │   (reserve CAS) │    │
//! │  └─────────────────┘     └─────────────────┘     └────────┬────────┘    │
//! │                                                           │             │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌────────▼────────┐    │
//! │  │ Outcome Ledger  │<────│  XP Ledger      │<────│ Vault Transfer  │    │
//! │  │ (always 1 row)  │     │ (best-effort)   │     │ Dispatcher      │    │
//! │  └─────────────────┘     └─────────────────┘     └─────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `pipeline`: the play state machine and its guaranteed outcome write
//! - `operator`: reconciliation and refund reports
//! - `deployment`: in-memory wiring from a TOML deployment file

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod deployment;
pub mod operator;
pub mod pipeline;

// Re-export the units
pub use shardvault_blockchain as blockchain;
pub use shardvault_economy as economy;
pub use shardvault_shared as shared;

pub use deployment::{dispatcher_config, in_memory, Deployment};
pub use operator::{reconciliation_report, refund_candidates, refund_totals, ReconciliationReport};
pub use pipeline::{
    DrawAttempt, PipelineError, PipelineSettings, PipelineStage, PipelineStores, PlayError,
    PlayPipeline, PlayResponse, PrizeDescriptor,
};
