//! # Balance Ledger
//!
//! Player accounts: play credits and the cached shard mirror.
//!
//! Accounts are found case-insensitively and keep the casing they were
//! created with. They are created lazily by the first credit grant and never
//! deleted.
//!
//! A debit is final. Nothing in this module refunds a credit; refunds are an
//! operator action driven by the outcome ledger.

use std::collections::HashMap;

use parking_lot::Mutex;
use shardvault_shared::WalletAddress;

use crate::error::{EconomyError, EconomyResult};

/// A player's account row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerAccount {
    /// Wallet with the casing it was created with.
    pub wallet: String,
    /// Remaining play credits.
    pub play_credits: u32,
    /// Cached mirror of on-chain shard holdings.
    pub shard_balance: u64,
}

/// Access to player accounts.
pub trait AccountStore: Send + Sync {
    /// Debits exactly one play credit.
    ///
    /// Returns the balance *before* the debit.
    ///
    /// # Errors
    ///
    /// - `EconomyError::AccountNotFound` if no account matches the wallet
    /// - `EconomyError::InsufficientCredits` if the account has no credit
    fn debit_play_credit(&self, wallet: &WalletAddress) -> EconomyResult<u32>;

    /// Grants play credits, creating the account on first grant.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::ArithmeticOverflow` if the balance would overflow.
    fn grant_play_credits(&self, wallet: &WalletAddress, credits: u32) -> EconomyResult<u32>;

    /// Adds delivered shards to the cached mirror.
    ///
    /// Returns the new mirror balance.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::AccountNotFound` if no account matches.
    fn add_shards(&self, wallet: &WalletAddress, shards: u64) -> EconomyResult<u64>;

    /// Reads an account.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::StoreUnavailable` if the store cannot be reached.
    fn account(&self, wallet: &WalletAddress) -> EconomyResult<Option<PlayerAccount>>;
}

/// In-memory account store keyed by case-folded wallet.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<String, PlayerAccount>>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccountStore {
    fn debit_play_credit(&self, wallet: &WalletAddress) -> EconomyResult<u32> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(&wallet.folded())
            .ok_or_else(|| EconomyError::AccountNotFound {
                wallet: wallet.as_str().to_string(),
            })?;

        if account.play_credits < 1 {
            return Err(EconomyError::InsufficientCredits {
                available: account.play_credits,
            });
        }

        let before = account.play_credits;
        account.play_credits -= 1;
        Ok(before)
    }

    fn grant_play_credits(&self, wallet: &WalletAddress, credits: u32) -> EconomyResult<u32> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .entry(wallet.folded())
            .or_insert_with(|| PlayerAccount {
                wallet: wallet.as_str().to_string(),
                play_credits: 0,
                shard_balance: 0,
            });
        account.play_credits = account
            .play_credits
            .checked_add(credits)
            .ok_or(EconomyError::ArithmeticOverflow)?;
        Ok(account.play_credits)
    }

    fn add_shards(&self, wallet: &WalletAddress, shards: u64) -> EconomyResult<u64> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(&wallet.folded())
            .ok_or_else(|| EconomyError::AccountNotFound {
                wallet: wallet.as_str().to_string(),
            })?;
        account.shard_balance = account
            .shard_balance
            .checked_add(shards)
            .ok_or(EconomyError::ArithmeticOverflow)?;
        Ok(account.shard_balance)
    }

    fn account(&self, wallet: &WalletAddress) -> EconomyResult<Option<PlayerAccount>> {
        Ok(self.accounts.lock().get(&wallet.folded()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_debit_returns_pre_debit_balance() {
        let store = MemoryAccountStore::new();
        let wallet = WalletAddress::new("0xA");
        store.grant_play_credits(&wallet, 3).unwrap();

        assert_eq!(store.debit_play_credit(&wallet).unwrap(), 3);
        assert_eq!(store.debit_play_credit(&wallet).unwrap(), 2);
        assert_eq!(store.account(&wallet).unwrap().unwrap().play_credits, 1);
    }

    #[test]
    fn test_debit_unknown_account() {
        let store = MemoryAccountStore::new();
        let err = store.debit_play_credit(&WalletAddress::new("0xNOPE")).unwrap_err();
        assert!(matches!(err, EconomyError::AccountNotFound { .. }));
    }

    #[test]
    fn test_debit_zero_credits_leaves_balance() {
        let store = MemoryAccountStore::new();
        let wallet = WalletAddress::new("0xA");
        store.grant_play_credits(&wallet, 0).unwrap();

        let err = store.debit_play_credit(&wallet).unwrap_err();
        assert_eq!(err, EconomyError::InsufficientCredits { available: 0 });
        assert_eq!(store.account(&wallet).unwrap().unwrap().play_credits, 0);
    }

    #[test]
    fn test_case_insensitive_lookup_preserves_casing() {
        let store = MemoryAccountStore::new();
        store.grant_play_credits(&WalletAddress::new("0xAbCdEf"), 2).unwrap();

        // Later calls in different casing hit the same row.
        store.grant_play_credits(&WalletAddress::new("0xABCDEF"), 1).unwrap();
        assert_eq!(store.debit_play_credit(&WalletAddress::new("0xabcdef")).unwrap(), 3);

        let account = store.account(&WalletAddress::new("0XABCDEF")).unwrap().unwrap();
        assert_eq!(account.wallet, "0xAbCdEf");
        assert_eq!(account.play_credits, 2);
    }

    #[test]
    fn test_shard_mirror() {
        let store = MemoryAccountStore::new();
        let wallet = WalletAddress::new("0xA");
        assert!(store.add_shards(&wallet, 5).is_err());

        store.grant_play_credits(&wallet, 1).unwrap();
        assert_eq!(store.add_shards(&wallet, 5).unwrap(), 5);
        assert_eq!(store.add_shards(&wallet, 7).unwrap(), 12);
    }

    #[test]
    fn test_grant_overflow() {
        let store = MemoryAccountStore::new();
        let wallet = WalletAddress::new("0xA");
        store.grant_play_credits(&wallet, u32::MAX).unwrap();
        assert_eq!(
            store.grant_play_credits(&wallet, 1),
            Err(EconomyError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let store = Arc::new(MemoryAccountStore::new());
        let wallet = WalletAddress::new("0xA");
        store.grant_play_credits(&wallet, 10).unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = Arc::clone(&store);
                let wallet = wallet.clone();
                thread::spawn(move || store.debit_play_credit(&wallet).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 10);
        assert_eq!(store.account(&wallet).unwrap().unwrap().play_credits, 0);
    }
}
