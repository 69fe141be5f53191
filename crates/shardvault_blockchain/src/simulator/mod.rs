//! # Simulated Chain
//!
//! In-process [`ChainClient`] for tests and the demo binary. Records every
//! submission, hands out deterministic hashes, and can be told to reject.

use std::collections::VecDeque;
use std::time::Duration;

use alloy_primitives::{keccak256, Address, TxHash};
use parking_lot::Mutex;

use crate::client::{ChainClient, ChainError, VaultAccount, VaultTransaction};

/// A transaction the simulator accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedTx {
    /// Hash handed back to the caller.
    pub hash: TxHash,
    /// Signing vault.
    pub signer: Address,
    /// The transaction as submitted.
    pub tx: VaultTransaction,
}

#[derive(Debug, Default)]
struct SimState {
    nonce: u64,
    accepted: Vec<SubmittedTx>,
    rejected: u64,
    queued_failures: VecDeque<ChainError>,
    reject_all: Option<String>,
}

/// Simulated chain client.
#[derive(Debug, Default)]
pub struct SimulatedChain {
    state: Mutex<SimState>,
    latency: Option<Duration>,
}

impl SimulatedChain {
    /// Creates a chain that accepts everything immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every submission, like a real node round trip.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Rejects every submission with `reason` until [`Self::accept_all`].
    pub fn reject_all(&self, reason: impl Into<String>) {
        self.state.lock().reject_all = Some(reason.into());
    }

    /// Stops rejecting.
    pub fn accept_all(&self) {
        self.state.lock().reject_all = None;
    }

    /// Fails the next submission with `error`. Calls queue up.
    pub fn fail_next(&self, error: ChainError) {
        self.state.lock().queued_failures.push_back(error);
    }

    /// Every accepted transaction, in submission order.
    #[must_use]
    pub fn submitted(&self) -> Vec<SubmittedTx> {
        self.state.lock().accepted.clone()
    }

    /// Number of rejected submissions.
    #[must_use]
    pub fn rejected_count(&self) -> u64 {
        self.state.lock().rejected
    }

    /// Total submissions seen, accepted or not.
    #[must_use]
    pub fn submission_count(&self) -> u64 {
        let state = self.state.lock();
        state.accepted.len() as u64 + state.rejected
    }

    fn record(&self, signer: &VaultAccount, tx: VaultTransaction) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock();

        if let Some(error) = state.queued_failures.pop_front() {
            state.rejected += 1;
            return Err(error);
        }
        if let Some(reason) = &state.reject_all {
            let error = ChainError::Rejected(reason.clone());
            state.rejected += 1;
            return Err(error);
        }

        let nonce = state.nonce;
        state.nonce += 1;

        let mut preimage = Vec::with_capacity(20 + 8 + 20 + tx.input.len());
        preimage.extend_from_slice(signer.address().as_slice());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(tx.to.as_slice());
        preimage.extend_from_slice(&tx.input);
        let hash = keccak256(&preimage);

        state.accepted.push(SubmittedTx {
            hash,
            signer: signer.address(),
            tx,
        });
        Ok(hash)
    }
}

impl ChainClient for SimulatedChain {
    fn submit(
        &self,
        signer: &VaultAccount,
        tx: VaultTransaction,
    ) -> impl std::future::Future<Output = Result<TxHash, ChainError>> + Send {
        // Decide synchronously so the state lock never crosses the await.
        let result = self.record(signer, tx);
        let latency = self.latency;
        async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        }
    }
}
