//! # Experience Ledger
//!
//! Per-wallet XP counter. Secondary progression signal, independent of the
//! credit and prize stores; callers treat failures as log-and-continue.

use std::collections::HashMap;

use parking_lot::Mutex;
use shardvault_shared::WalletAddress;

use crate::error::{EconomyError, EconomyResult};

/// Access to the XP counters.
pub trait XpStore: Send + Sync {
    /// Adds XP to the wallet's counter and returns the new total.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::ArithmeticOverflow` or a store error.
    fn add_xp(&self, wallet: &WalletAddress, amount: u64) -> EconomyResult<u64>;

    /// Current XP total (0 for unknown wallets).
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::StoreUnavailable` if the store cannot be reached.
    fn xp(&self, wallet: &WalletAddress) -> EconomyResult<u64>;
}

/// In-memory XP counters keyed by case-folded wallet.
#[derive(Debug, Default)]
pub struct MemoryXpStore {
    totals: Mutex<HashMap<String, u64>>,
}

impl MemoryXpStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XpStore for MemoryXpStore {
    fn add_xp(&self, wallet: &WalletAddress, amount: u64) -> EconomyResult<u64> {
        let mut totals = self.totals.lock();
        let total = totals.entry(wallet.folded()).or_insert(0);
        *total = total.checked_add(amount).ok_or(EconomyError::ArithmeticOverflow)?;
        Ok(*total)
    }

    fn xp(&self, wallet: &WalletAddress) -> EconomyResult<u64> {
        Ok(self.totals.lock().get(&wallet.folded()).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_xp_accumulates_across_casing() {
        let store = MemoryXpStore::new();
        assert_eq!(store.add_xp(&WalletAddress::new("0xAA"), 10).unwrap(), 10);
        assert_eq!(store.add_xp(&WalletAddress::new("0xaa"), 15).unwrap(), 25);
        assert_eq!(store.xp(&WalletAddress::new("0XAA")).unwrap(), 25);
        assert_eq!(store.xp(&WalletAddress::new("0xBB")).unwrap(), 0);
    }
}
