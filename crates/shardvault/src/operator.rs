//! # Operator Reports
//!
//! Read-only views for the manual recovery path. Nothing here changes state:
//! retries and refunds are operator decisions.

use std::time::{Duration, SystemTime};

use shardvault_economy::{
    stale_reservations, DrawOutcome, EconomyResult, InventoryStore, InventoryUnit, UnitStatus,
};
use shardvault_shared::WalletAddress;

/// Inventory units that need an operator.
#[derive(Clone, Debug)]
pub struct ReconciliationReport {
    /// When the report was taken.
    pub generated_at: SystemTime,
    /// Units reserved longer than the timeout (crash between reservation
    /// and transfer result).
    pub stale_reservations: Vec<InventoryUnit>,
    /// Units whose delivery failed.
    pub failed_transfers: Vec<InventoryUnit>,
}

impl ReconciliationReport {
    /// Returns true if nothing needs attention.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.stale_reservations.is_empty() && self.failed_transfers.is_empty()
    }

    /// Number of units listed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stale_reservations.len() + self.failed_transfers.len()
    }

    /// Returns true if the report lists no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lists stale reservations and failed transfers.
///
/// # Errors
///
/// Propagates inventory store errors.
pub fn reconciliation_report(
    inventory: &dyn InventoryStore,
    now: SystemTime,
    reservation_timeout: Duration,
) -> EconomyResult<ReconciliationReport> {
    Ok(ReconciliationReport {
        generated_at: now,
        stale_reservations: stale_reservations(inventory, now, reservation_timeout)?,
        failed_transfers: inventory.units_with_status(UnitStatus::TransferFailed)?,
    })
}

/// Outcome rows whose consumed credit may be owed back.
#[must_use]
pub fn refund_candidates(outcomes: &[DrawOutcome]) -> Vec<&DrawOutcome> {
    outcomes.iter().filter(|o| o.status.needs_operator()).collect()
}

/// Refund candidates per wallet: `(wallet, credits)`.
///
/// Wallets group case-insensitively and keep the first casing seen.
#[must_use]
pub fn refund_totals(outcomes: &[DrawOutcome]) -> Vec<(String, u32)> {
    let mut totals: Vec<(String, u32)> = Vec::new();
    for outcome in refund_candidates(outcomes) {
        let wallet = WalletAddress::new(outcome.wallet.as_str());
        match totals.iter_mut().find(|(w, _)| wallet.matches(w)) {
            Some((_, credits)) => *credits = credits.saturating_add(1),
            None => totals.push((outcome.wallet.clone(), 1)),
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{TxHash, U256};
    use shardvault_economy::{MemoryInventory, OutcomeStatus};

    fn row(wallet: &str, status: OutcomeStatus) -> DrawOutcome {
        DrawOutcome {
            wallet: wallet.to_string(),
            prize_slug: Some("shard_x5".to_string()),
            amount_or_id: Some("5".to_string()),
            tx_hash: None,
            status,
            error_message: None,
            xp_awarded: None,
            recorded_at: SystemTime::now(),
        }
    }

    #[test]
    fn test_refunds_skip_successes() {
        let rows = vec![
            row("0xAbC", OutcomeStatus::TransferFailed),
            row("0xDEF", OutcomeStatus::Success),
            row("0xabc", OutcomeStatus::Error),
            row("0xDEF", OutcomeStatus::Error),
        ];

        assert_eq!(refund_candidates(&rows).len(), 3);
        assert_eq!(
            refund_totals(&rows),
            vec![("0xAbC".to_string(), 2), ("0xDEF".to_string(), 1)]
        );
    }

    #[test]
    fn test_report_lists_stale_and_failed() {
        let inventory = MemoryInventory::new();
        for id in 1..=4 {
            inventory.stock(InventoryUnit::new(id, "dragon_egg", U256::from(id))).unwrap();
        }

        let wallet = WalletAddress::new("0xA");
        let start = SystemTime::now();
        let timeout = Duration::from_secs(600);

        // Unit 1: reserved long ago, never resolved.
        let stale = inventory
            .reserve_available("dragon_egg", &wallet, start - Duration::from_secs(3600))
            .unwrap()
            .unwrap();
        // Unit 2: fresh reservation, still in flight.
        inventory.reserve_available("dragon_egg", &wallet, start).unwrap().unwrap();
        // Unit 3: failed delivery.
        let failed = inventory.reserve_available("dragon_egg", &wallet, start).unwrap().unwrap();
        inventory.mark_transfer_failed(failed.unit_id, "rpc down").unwrap();

        let report = reconciliation_report(&inventory, start, timeout).unwrap();
        assert_eq!(report.stale_reservations.len(), 1);
        assert_eq!(report.stale_reservations[0].unit_id, stale.unit_id);
        assert_eq!(report.failed_transfers.len(), 1);
        assert_eq!(report.failed_transfers[0].unit_id, failed.unit_id);
        assert_eq!(report.len(), 2);
        assert!(!report.is_clean());

        // Reporting never changes state.
        assert_eq!(inventory.get(stale.unit_id).unwrap().status, UnitStatus::Reserved);

        // Unit 4 is still available; claiming a fresh one leaves the report alone.
        let last = inventory.reserve_available("dragon_egg", &wallet, start).unwrap().unwrap();
        inventory.mark_claimed(last.unit_id, TxHash::repeat_byte(1)).unwrap();
        assert_eq!(reconciliation_report(&inventory, start, timeout).unwrap().len(), 2);
    }
}
