//! # Chain Client
//!
//! The narrow seam between the dispatcher and a chain node: submit one
//! transaction signed by the vault key, get back its hash.
//!
//! ```text
//! ┌──────────────────┐  VaultTransaction  ┌──────────────────┐
//! │  VaultDispatcher │ ─────────────────▶ │   ChainClient    │ ──▶ node
//! │  (builds calls)  │ ◀───────────────── │  (signs, sends)  │
//! └──────────────────┘   TxHash / Error   └──────────────────┘
//! ```
//!
//! The client owns signing, nonce management and its own timeout. Whatever
//! it returns is final: the dispatcher never retries.

use std::fmt;
use std::future::Future;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use thiserror::Error;

/// Errors reported by a chain client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The node or contract rejected the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The node could not be reached or answered garbage.
    #[error("rpc failure: {0}")]
    Rpc(String),

    /// The client's own timeout elapsed before submission completed.
    #[error("submission timed out")]
    Timeout,
}

/// An unsigned transaction from the vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultTransaction {
    /// Vault address (transfer source).
    pub from: Address,
    /// Recipient for native payouts, token contract for calls.
    pub to: Address,
    /// Native value in wei.
    pub value: U256,
    /// Calldata (empty for native payouts).
    pub input: Bytes,
}

impl VaultTransaction {
    /// A plain native-currency payout.
    #[must_use]
    pub fn native(from: Address, to: Address, value: U256) -> Self {
        Self {
            from,
            to,
            value,
            input: Bytes::new(),
        }
    }

    /// A zero-value contract call.
    #[must_use]
    pub fn contract_call(from: Address, contract: Address, input: Bytes) -> Self {
        Self {
            from,
            to: contract,
            value: U256::ZERO,
            input,
        }
    }

    /// Returns true if this transaction carries calldata.
    #[inline]
    #[must_use]
    pub fn is_contract_call(&self) -> bool {
        !self.input.is_empty()
    }
}

/// The custodial vault account and its signing credential.
#[derive(Clone)]
pub struct VaultAccount {
    address: Address,
    signing_key: String,
}

impl VaultAccount {
    /// Creates a vault account from an address and its signing key.
    #[must_use]
    pub fn new(address: Address, signing_key: impl Into<String>) -> Self {
        Self {
            address,
            signing_key: signing_key.into(),
        }
    }

    /// Reads the signing key from an environment variable.
    ///
    /// Returns `None` when the variable is unset or blank; the dispatcher
    /// then runs without a credential and fails every transfer.
    #[must_use]
    pub fn from_env(address: Address, var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(address, key))
    }

    /// Vault address.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Raw signing key, for the client that signs.
    #[must_use]
    pub fn signing_key(&self) -> &str {
        &self.signing_key
    }
}

impl fmt::Debug for VaultAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // NEVER expose the key in debug output
        f.debug_struct("VaultAccount")
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Submits vault transactions to a chain.
pub trait ChainClient: Send + Sync {
    /// Signs `tx` with the vault key and submits it.
    ///
    /// Resolves once the node accepted the transaction.
    fn submit(
        &self,
        signer: &VaultAccount,
        tx: VaultTransaction,
    ) -> impl Future<Output = Result<TxHash, ChainError>> + Send;
}
