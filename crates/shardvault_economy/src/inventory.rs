//! # Inventory Allocator
//!
//! Concrete stocked units backing unique-asset prizes, one row per token.
//!
//! ## Lifecycle
//!
//! ```text
//! available ──reserve──▶ reserved ──transfer ok──▶ claimed
//!   (active)                 │
//!                            └──transfer error──▶ transfer_failed
//! ```
//!
//! Reservation is a single compare-and-swap on the status: two draws racing
//! for the last unit cannot both win. A unit that never leaves `reserved`
//! (process crash between reservation and transfer result) is not resolved
//! automatically; [`stale_reservations`] lists them for an operator.

use std::fmt;
use std::time::{Duration, SystemTime};

use alloy_primitives::{Address, TxHash, U256};
use parking_lot::Mutex;
use shardvault_shared::WalletAddress;

use crate::error::{EconomyError, EconomyResult};

/// Unique identifier for an inventory unit.
pub type UnitId = u64;

/// Allocation state of an inventory unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitStatus {
    /// In stock.
    Available,
    /// Legacy spelling of `Available`, treated identically.
    Active,
    /// Exclusively held by one draw while its transfer runs.
    Reserved,
    /// Delivered; carries the transaction hash.
    Claimed,
    /// Delivery failed; waiting for an operator.
    TransferFailed,
}

impl UnitStatus {
    /// Storage name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Active => "active",
            Self::Reserved => "reserved",
            Self::Claimed => "claimed",
            Self::TransferFailed => "transfer_failed",
        }
    }

    /// Returns true if the unit can be reserved.
    #[inline]
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available | Self::Active)
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete unique asset tied to a prize definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryUnit {
    /// Unique identifier.
    pub unit_id: UnitId,
    /// Slug of the prize this unit backs.
    pub prize_slug: String,
    /// On-chain token id.
    pub token_id: U256,
    /// Contract holding the token, if it differs from the prize's.
    pub contract_address: Option<Address>,
    /// Quantity for semi-fungible units; `None` or 0 means strictly unique.
    pub amount: Option<u64>,
    /// Allocation state.
    pub status: UnitStatus,
    /// Wallet the unit was reserved for, original casing.
    pub winner_wallet: Option<String>,
    /// When the unit was reserved.
    pub won_at: Option<SystemTime>,
    /// Delivery transaction.
    pub tx_hash: Option<TxHash>,
    /// Why delivery failed.
    pub failure_note: Option<String>,
}

impl InventoryUnit {
    /// Creates an available unit.
    #[must_use]
    pub fn new(unit_id: UnitId, prize_slug: impl Into<String>, token_id: U256) -> Self {
        Self {
            unit_id,
            prize_slug: prize_slug.into(),
            token_id,
            contract_address: None,
            amount: None,
            status: UnitStatus::Available,
            winner_wallet: None,
            won_at: None,
            tx_hash: None,
            failure_note: None,
        }
    }

    /// Positive semi-fungible quantity carried by this unit, if any.
    #[inline]
    #[must_use]
    pub fn fungible_amount(&self) -> Option<u64> {
        self.amount.filter(|amount| *amount > 0)
    }
}

/// Access to the stocked inventory.
pub trait InventoryStore: Send + Sync {
    /// Reserves one available unit of the prize for the winner.
    ///
    /// Returns `Ok(None)` on stockout.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::StoreUnavailable` if the store cannot be reached.
    fn reserve_available(
        &self,
        prize_slug: &str,
        winner: &WalletAddress,
        now: SystemTime,
    ) -> EconomyResult<Option<InventoryUnit>>;

    /// Advances a reserved unit to `claimed`.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::UnexpectedUnitStatus` if the unit is not reserved.
    fn mark_claimed(&self, unit_id: UnitId, tx_hash: TxHash) -> EconomyResult<InventoryUnit>;

    /// Advances a reserved unit to `transfer_failed`.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::UnexpectedUnitStatus` if the unit is not reserved.
    fn mark_transfer_failed(&self, unit_id: UnitId, note: &str) -> EconomyResult<InventoryUnit>;

    /// All units currently in the given status.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::StoreUnavailable` if the store cannot be reached.
    fn units_with_status(&self, status: UnitStatus) -> EconomyResult<Vec<InventoryUnit>>;
}

/// Reserved units older than `timeout`, for operator reconciliation.
///
/// # Errors
///
/// Propagates store errors.
pub fn stale_reservations(
    store: &dyn InventoryStore,
    now: SystemTime,
    timeout: Duration,
) -> EconomyResult<Vec<InventoryUnit>> {
    let reserved = store.units_with_status(UnitStatus::Reserved)?;
    Ok(reserved
        .into_iter()
        .filter(|unit| match unit.won_at {
            // A reserved unit without a timestamp is already an anomaly.
            None => true,
            Some(won_at) => now.duration_since(won_at).map_or(false, |age| age >= timeout),
        })
        .collect())
}

/// In-memory inventory.
///
/// All transitions run inside one lock, so each is a single atomic
/// conditional update.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    units: Mutex<Vec<InventoryUnit>>,
}

impl MemoryInventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit to the pool (stocking is administrative).
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` if the unit id is already used.
    pub fn stock(&self, unit: InventoryUnit) -> EconomyResult<()> {
        let mut units = self.units.lock();
        if units.iter().any(|u| u.unit_id == unit.unit_id) {
            return Err(EconomyError::InvalidConfig(format!(
                "duplicate inventory unit id {}",
                unit.unit_id
            )));
        }
        units.push(unit);
        Ok(())
    }

    /// Snapshot of a single unit.
    #[must_use]
    pub fn get(&self, unit_id: UnitId) -> Option<InventoryUnit> {
        self.units.lock().iter().find(|u| u.unit_id == unit_id).cloned()
    }

    /// Number of reservable units for a prize.
    #[must_use]
    pub fn available_count(&self, prize_slug: &str) -> usize {
        self.units
            .lock()
            .iter()
            .filter(|u| u.prize_slug == prize_slug && u.status.is_available())
            .count()
    }

    /// Applies `update` to the unit iff its status is `expected`.
    fn transition(
        &self,
        unit_id: UnitId,
        expected: UnitStatus,
        update: impl FnOnce(&mut InventoryUnit),
    ) -> EconomyResult<InventoryUnit> {
        let mut units = self.units.lock();
        let unit = units
            .iter_mut()
            .find(|u| u.unit_id == unit_id)
            .ok_or(EconomyError::UnitNotFound(unit_id))?;
        if unit.status != expected {
            return Err(EconomyError::UnexpectedUnitStatus {
                unit_id,
                expected: expected.as_str(),
                actual: unit.status.as_str(),
            });
        }
        update(unit);
        Ok(unit.clone())
    }
}

impl InventoryStore for MemoryInventory {
    fn reserve_available(
        &self,
        prize_slug: &str,
        winner: &WalletAddress,
        now: SystemTime,
    ) -> EconomyResult<Option<InventoryUnit>> {
        let mut units = self.units.lock();
        let Some(unit) = units
            .iter_mut()
            .find(|u| u.prize_slug == prize_slug && u.status.is_available())
        else {
            return Ok(None);
        };

        unit.status = UnitStatus::Reserved;
        unit.winner_wallet = Some(winner.as_str().to_string());
        unit.won_at = Some(now);
        Ok(Some(unit.clone()))
    }

    fn mark_claimed(&self, unit_id: UnitId, tx_hash: TxHash) -> EconomyResult<InventoryUnit> {
        self.transition(unit_id, UnitStatus::Reserved, |unit| {
            unit.status = UnitStatus::Claimed;
            unit.tx_hash = Some(tx_hash);
        })
    }

    fn mark_transfer_failed(&self, unit_id: UnitId, note: &str) -> EconomyResult<InventoryUnit> {
        self.transition(unit_id, UnitStatus::Reserved, |unit| {
            unit.status = UnitStatus::TransferFailed;
            unit.failure_note = Some(note.to_string());
        })
    }

    fn units_with_status(&self, status: UnitStatus) -> EconomyResult<Vec<InventoryUnit>> {
        Ok(self
            .units
            .lock()
            .iter()
            .filter(|u| u.status == status)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn winner() -> WalletAddress {
        WalletAddress::new("0xAbC0000000000000000000000000000000000001")
    }

    fn stocked(units: &[(UnitId, &str, UnitStatus)]) -> MemoryInventory {
        let inv = MemoryInventory::new();
        for &(id, slug, status) in units {
            let mut unit = InventoryUnit::new(id, slug, U256::from(id * 100));
            unit.status = status;
            inv.stock(unit).unwrap();
        }
        inv
    }

    #[test]
    fn test_reserve_stamps_winner() {
        let inv = stocked(&[(1, "dragon", UnitStatus::Available)]);
        let now = SystemTime::now();

        let unit = inv.reserve_available("dragon", &winner(), now).unwrap().unwrap();

        assert_eq!(unit.status, UnitStatus::Reserved);
        assert_eq!(unit.winner_wallet.as_deref(), Some("0xAbC0000000000000000000000000000000000001"));
        assert_eq!(unit.won_at, Some(now));
        assert_eq!(inv.available_count("dragon"), 0);
    }

    #[test]
    fn test_legacy_active_is_reservable() {
        let inv = stocked(&[(1, "dragon", UnitStatus::Active)]);
        assert!(inv.reserve_available("dragon", &winner(), SystemTime::now()).unwrap().is_some());
    }

    #[test]
    fn test_stockout_returns_none() {
        let inv = stocked(&[
            (1, "dragon", UnitStatus::Claimed),
            (2, "dragon", UnitStatus::TransferFailed),
            (3, "griffin", UnitStatus::Available),
        ]);
        assert!(inv.reserve_available("dragon", &winner(), SystemTime::now()).unwrap().is_none());
    }

    #[test]
    fn test_claim_requires_reservation() {
        let inv = stocked(&[(1, "dragon", UnitStatus::Available)]);
        let err = inv.mark_claimed(1, TxHash::ZERO).unwrap_err();
        assert!(matches!(err, EconomyError::UnexpectedUnitStatus { unit_id: 1, .. }));

        inv.reserve_available("dragon", &winner(), SystemTime::now()).unwrap();
        let hash = TxHash::repeat_byte(0xab);
        let unit = inv.mark_claimed(1, hash).unwrap();
        assert_eq!(unit.status, UnitStatus::Claimed);
        assert_eq!(unit.tx_hash, Some(hash));

        // A claimed unit cannot be failed afterwards.
        assert!(inv.mark_transfer_failed(1, "late").is_err());
    }

    #[test]
    fn test_failed_transfer_never_returns_to_stock() {
        let inv = stocked(&[(1, "dragon", UnitStatus::Available)]);
        inv.reserve_available("dragon", &winner(), SystemTime::now()).unwrap();

        let unit = inv.mark_transfer_failed(1, "rpc timeout").unwrap();

        assert_eq!(unit.status, UnitStatus::TransferFailed);
        assert_eq!(unit.failure_note.as_deref(), Some("rpc timeout"));
        assert_eq!(inv.available_count("dragon"), 0);
        assert!(inv.reserve_available("dragon", &winner(), SystemTime::now()).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_stock_rejected() {
        let inv = stocked(&[(1, "dragon", UnitStatus::Available)]);
        assert!(inv.stock(InventoryUnit::new(1, "dragon", U256::from(1))).is_err());
    }

    #[test]
    fn test_concurrent_reservation_single_winner() {
        for _ in 0..50 {
            let inv = Arc::new(stocked(&[(1, "dragon", UnitStatus::Available)]));
            let barrier = Arc::new(Barrier::new(8));

            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let inv = Arc::clone(&inv);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        let wallet = WalletAddress::new(format!("0x{i:040x}"));
                        barrier.wait();
                        inv.reserve_available("dragon", &wallet, SystemTime::now()).unwrap()
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .count();
            assert_eq!(winners, 1);
        }
    }

    #[test]
    fn test_stale_reservations() {
        let inv = stocked(&[
            (1, "dragon", UnitStatus::Available),
            (2, "dragon", UnitStatus::Available),
        ]);
        let start = SystemTime::now();
        inv.reserve_available("dragon", &winner(), start).unwrap();
        inv.reserve_available("dragon", &winner(), start + Duration::from_secs(500)).unwrap();

        let now = start + Duration::from_secs(700);
        let stale = stale_reservations(&inv, now, Duration::from_secs(600)).unwrap();

        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].unit_id, 1);
    }
}
