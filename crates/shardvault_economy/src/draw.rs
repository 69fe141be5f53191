//! # Weighted Draw Selector
//!
//! Pure selection over the active catalog:
//!
//! ```text
//! total = Σ drop_weight
//! r     ~ U[0, total)
//! pick  = first prize whose cumulative weight exceeds r
//! ```
//!
//! Floating-point accumulation can fall short of `r` when `r` lands at the
//! very top of the range; the walk then falls back to the last prize so a
//! draw is never left unselected.
//!
//! ## Randomness
//!
//! Every play gets its own [`DrawRng`] seeded from the OS. Nothing about a
//! draw is cached or shared between requests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::catalog::PrizeDefinition;
use crate::error::{EconomyError, EconomyResult};

/// Random stream used for one draw.
pub type DrawRng = ChaCha20Rng;

/// Creates a fresh draw stream from OS entropy.
#[must_use]
pub fn fresh_rng() -> DrawRng {
    ChaCha20Rng::from_entropy()
}

/// Sum of the usable weights in the catalog.
///
/// Negative and non-finite weights count as zero.
#[must_use]
pub fn total_weight(catalog: &[PrizeDefinition]) -> f64 {
    catalog.iter().map(effective_weight).sum()
}

#[inline]
fn effective_weight(prize: &PrizeDefinition) -> f64 {
    if prize.drop_weight.is_finite() && prize.drop_weight > 0.0 {
        prize.drop_weight
    } else {
        0.0
    }
}

/// Draws one prize from the catalog.
///
/// # Errors
///
/// Returns `EconomyError::EmptyCatalog` if the catalog is empty or every
/// weight is zero.
pub fn select_prize<'a, R: Rng + ?Sized>(
    catalog: &'a [PrizeDefinition],
    rng: &mut R,
) -> EconomyResult<&'a PrizeDefinition> {
    let total = total_weight(catalog);
    if !(total.is_finite() && total > 0.0) {
        return Err(EconomyError::EmptyCatalog);
    }
    let roll = rng.gen_range(0.0..total);
    select_with_roll(catalog, roll)
}

/// Walks the catalog with a pre-drawn roll in `[0, total)`.
///
/// # Errors
///
/// Returns `EconomyError::EmptyCatalog` if no prize has a positive weight.
pub fn select_with_roll(catalog: &[PrizeDefinition], roll: f64) -> EconomyResult<&PrizeDefinition> {
    let mut cumulative = 0.0;
    let mut last_weighted = None;

    for prize in catalog {
        let weight = effective_weight(prize);
        if weight == 0.0 {
            continue;
        }
        cumulative += weight;
        last_weighted = Some(prize);
        if cumulative > roll {
            return Ok(prize);
        }
    }

    // Rounding at the upper boundary: the last weighted prize wins.
    last_weighted.ok_or(EconomyError::EmptyCatalog)
}

/// Statistics from a draw simulation.
#[derive(Clone, Debug, Default)]
pub struct DrawStatistics {
    /// Total number of draws performed.
    pub total_draws: u64,
    /// Selection counts by slug, in catalog order.
    pub counts: Vec<(String, u64)>,
}

impl DrawStatistics {
    /// Observed selection frequency of a slug, as a percentage.
    #[must_use]
    pub fn percent(&self, slug: &str) -> f64 {
        if self.total_draws == 0 {
            return 0.0;
        }
        let count = self
            .counts
            .iter()
            .find(|(s, _)| s == slug)
            .map_or(0, |(_, c)| *c);
        #[allow(clippy::cast_precision_loss)]
        let pct = (count as f64 / self.total_draws as f64) * 100.0;
        pct
    }
}

/// Runs many draws against the catalog and counts the selections.
///
/// # Errors
///
/// Returns `EconomyError::EmptyCatalog` if the catalog cannot be drawn from.
pub fn run_statistics<R: Rng + ?Sized>(
    catalog: &[PrizeDefinition],
    rng: &mut R,
    iterations: u64,
) -> EconomyResult<DrawStatistics> {
    let mut stats = DrawStatistics {
        total_draws: 0,
        counts: catalog.iter().map(|p| (p.slug.clone(), 0)).collect(),
    };

    for _ in 0..iterations {
        let prize = select_prize(catalog, rng)?;
        if let Some(entry) = stats.counts.iter_mut().find(|(s, _)| *s == prize.slug) {
            entry.1 += 1;
        }
        stats.total_draws += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssetKind;

    fn create_test_catalog() -> Vec<PrizeDefinition> {
        vec![
            PrizeDefinition::new("first", AssetKind::FungibleShard, 10.0),
            PrizeDefinition::new("never", AssetKind::UniqueAsset, 0.0),
            PrizeDefinition::new("third", AssetKind::FungibleNative, 90.0),
        ]
    }

    #[test]
    fn test_weights_converge() {
        let catalog = create_test_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let stats = run_statistics(&catalog, &mut rng, 100_000).unwrap();

        let first = stats.percent("first");
        let third = stats.percent("third");
        assert!((first - 10.0).abs() < 1.5, "first selected {first:.2}% of the time");
        assert!((third - 90.0).abs() < 1.5, "third selected {third:.2}% of the time");
        assert!(stats.percent("never").abs() < f64::EPSILON, "zero weight was selected");
    }

    #[test]
    fn test_roll_walk() {
        let catalog = create_test_catalog();
        assert_eq!(select_with_roll(&catalog, 0.0).unwrap().slug, "first");
        assert_eq!(select_with_roll(&catalog, 9.999).unwrap().slug, "first");
        assert_eq!(select_with_roll(&catalog, 10.0).unwrap().slug, "third");
        assert_eq!(select_with_roll(&catalog, 99.999).unwrap().slug, "third");
    }

    #[test]
    fn test_boundary_falls_back_to_last() {
        let catalog = create_test_catalog();
        // A roll at (or past) the accumulated total must still select.
        assert_eq!(select_with_roll(&catalog, 100.0).unwrap().slug, "third");
        assert_eq!(select_with_roll(&catalog, 1e9).unwrap().slug, "third");
    }

    #[test]
    fn test_trailing_zero_weight_never_chosen_at_boundary() {
        let catalog = vec![
            PrizeDefinition::new("only", AssetKind::FungibleShard, 5.0),
            PrizeDefinition::new("dead", AssetKind::FungibleShard, 0.0),
        ];
        assert_eq!(select_with_roll(&catalog, 5.0).unwrap().slug, "only");
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(select_prize(&[], &mut rng), Err(EconomyError::EmptyCatalog));

        let zeros = vec![
            PrizeDefinition::new("a", AssetKind::FungibleShard, 0.0),
            PrizeDefinition::new("b", AssetKind::FungibleShard, 0.0),
        ];
        assert_eq!(select_prize(&zeros, &mut rng), Err(EconomyError::EmptyCatalog));
    }

    #[test]
    fn test_negative_and_nan_weights_ignored() {
        let catalog = vec![
            PrizeDefinition::new("neg", AssetKind::FungibleShard, -50.0),
            PrizeDefinition::new("nan", AssetKind::FungibleShard, f64::NAN),
            PrizeDefinition::new("real", AssetKind::FungibleShard, 1.0),
        ];
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(select_prize(&catalog, &mut rng).unwrap().slug, "real");
        }
    }

    #[test]
    fn test_fresh_rng_streams_differ() {
        let catalog: Vec<_> = (0..50)
            .map(|i| PrizeDefinition::new(format!("p{i}"), AssetKind::FungibleShard, 1.0))
            .collect();
        let mut a = fresh_rng();
        let mut b = fresh_rng();
        let picks_a: Vec<_> = (0..20).map(|_| select_prize(&catalog, &mut a).unwrap().slug.clone()).collect();
        let picks_b: Vec<_> = (0..20).map(|_| select_prize(&catalog, &mut b).unwrap().slug.clone()).collect();
        assert_ne!(picks_a, picks_b);
    }
}
