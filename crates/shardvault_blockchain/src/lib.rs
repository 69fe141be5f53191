//! # ShardVault Blockchain Bridge
//!
//! Delivers drawn prizes from the custodial vault to player wallets.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   TransferOrder   ┌─────────────────┐   signed tx   ┌──────────┐
//! │ VaultDispatcher │ ────────────────▶ │   ChainClient   │ ────────────▶ │  Chain   │
//! │ (per asset kind)│ ◀──────────────── │ (node or sim)   │ ◀──────────── │          │
//! └─────────────────┘   TxHash / Error  └─────────────────┘               └──────────┘
//! ```
//!
//! The dispatcher is pure policy: it picks the contract, token id and amount
//! for a prize and builds calldata with the `sol!` interfaces in
//! [`contracts`]. Signing and submission sit behind [`ChainClient`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod client;
pub mod contracts;
pub mod dispatcher;
pub mod simulator;

pub use client::{ChainClient, ChainError, VaultAccount, VaultTransaction};
pub use dispatcher::{DispatcherConfig, TransferError, TransferOrder, VaultDispatcher};
pub use simulator::{SimulatedChain, SubmittedTx};
