//! # Prize Catalog
//!
//! Read-mostly list of prize definitions. The pipeline only ever reads the
//! active rows; stocking and weighting are administrative.
//!
//! ## Fallback Substitution
//!
//! When a unique-asset prize is out of stock the pipeline substitutes a
//! fungible prize instead of failing the play:
//!
//! ```text
//! 1. active prize with the fallback slug ("shard_x5")
//! 2. else the first active non-unique prize in the fallback category ("shard")
//! 3. else: hard configuration error
//! ```

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shardvault_shared::{FALLBACK_PRIZE_SLUG, SHARD_CATEGORY};

use crate::error::{EconomyError, EconomyResult};

/// How a prize is delivered on chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    /// One concrete stocked token (ERC-721, or an ERC-1155 unit with an amount).
    UniqueAsset,
    /// A quantity of the semi-fungible shard token.
    FungibleShard,
    /// A quantity of the chain's native currency.
    FungibleNative,
}

impl AssetKind {
    /// Wire name of the asset kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UniqueAsset => "unique-asset",
            Self::FungibleShard => "fungible-shard",
            Self::FungibleNative => "fungible-native",
        }
    }

    /// Returns true if this kind needs a reserved inventory unit.
    #[inline]
    #[must_use]
    pub const fn needs_inventory(self) -> bool {
        matches!(self, Self::UniqueAsset)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unique-asset" | "nft" => Ok(Self::UniqueAsset),
            "fungible-shard" | "shard" => Ok(Self::FungibleShard),
            "fungible-native" | "native" => Ok(Self::FungibleNative),
            other => Err(EconomyError::InvalidConfig(format!("unknown asset kind: {other}"))),
        }
    }
}

/// A catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PrizeDefinition {
    /// Stable identity.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Grouping used by fallback resolution (e.g. "shard").
    pub category: String,
    /// Delivery kind.
    pub asset_kind: AssetKind,
    /// Relative drop weight (not normalized).
    pub drop_weight: f64,
    /// XP granted on successful delivery.
    pub xp_reward: u64,
    /// Contract delivering the prize, if not the deployment default.
    pub contract_address: Option<Address>,
    /// Quantity for fungible kinds (shards, or wei for native).
    pub amount: Option<u64>,
    /// Native payout in wei when it does not fit `amount`.
    pub amount_wei: Option<U256>,
    /// Image reference returned to the caller.
    pub image: Option<String>,
    /// Only active prizes take part in a draw.
    pub is_active: bool,
}

impl PrizeDefinition {
    /// Creates an active prize with no contract, amount or image.
    #[must_use]
    pub fn new(slug: impl Into<String>, asset_kind: AssetKind, drop_weight: f64) -> Self {
        let slug = slug.into();
        Self {
            name: slug.clone(),
            category: match asset_kind {
                AssetKind::FungibleShard => SHARD_CATEGORY.to_string(),
                AssetKind::FungibleNative => "native".to_string(),
                AssetKind::UniqueAsset => "nft".to_string(),
            },
            slug,
            asset_kind,
            drop_weight,
            xp_reward: 0,
            contract_address: None,
            amount: None,
            amount_wei: None,
            image: None,
            is_active: true,
        }
    }

    /// Sets the fungible amount.
    #[must_use]
    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets a native payout in wei, overriding `amount`.
    #[must_use]
    pub fn with_amount_wei(mut self, amount_wei: U256) -> Self {
        self.amount_wei = Some(amount_wei);
        self
    }

    /// Sets the XP reward.
    #[must_use]
    pub fn with_xp(mut self, xp_reward: u64) -> Self {
        self.xp_reward = xp_reward;
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the delivering contract.
    #[must_use]
    pub fn with_contract(mut self, contract: Address) -> Self {
        self.contract_address = Some(contract);
        self
    }

    /// Shard quantity delivered for this prize.
    ///
    /// Uses `amount` when set, otherwise an `x<N>` suffix in the slug or the
    /// name (`shard_x5` delivers 5), otherwise 1.
    #[must_use]
    pub fn shard_quantity(&self) -> u64 {
        self.amount
            .filter(|amount| *amount > 0)
            .or_else(|| quantity_suffix(&self.slug))
            .or_else(|| quantity_suffix(&self.name))
            .unwrap_or(1)
    }

    /// Native payout in wei: `amount_wei`, else `amount`. `None` if zero.
    #[must_use]
    pub fn native_amount(&self) -> Option<U256> {
        self.amount_wei
            .or_else(|| self.amount.map(U256::from))
            .filter(|wei| !wei.is_zero())
    }
}

/// Parses a trailing `x<N>` / `X<N>` quantity from a name.
fn quantity_suffix(name: &str) -> Option<u64> {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    let marker = name[..digits_start].chars().next_back()?;
    if !marker.eq_ignore_ascii_case(&'x') {
        return None;
    }
    name[digits_start..].parse().ok().filter(|n| *n > 0)
}

/// Where to look for a substitute prize on stockout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Preferred fallback slug.
    pub slug: String,
    /// Category scanned when the slug is not active.
    pub category: String,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            slug: FALLBACK_PRIZE_SLUG.to_string(),
            category: SHARD_CATEGORY.to_string(),
        }
    }
}

impl FallbackPolicy {
    /// Picks the substitute from the active catalog, if any exists.
    ///
    /// Unique-asset prizes are never substitutes: they could be out of stock
    /// themselves.
    #[must_use]
    pub fn resolve<'a>(&self, active: &'a [PrizeDefinition]) -> Option<&'a PrizeDefinition> {
        let eligible = |p: &&PrizeDefinition| p.is_active && !p.asset_kind.needs_inventory();
        active
            .iter()
            .filter(eligible)
            .find(|p| p.slug == self.slug)
            .or_else(|| {
                active
                    .iter()
                    .filter(eligible)
                    .find(|p| p.category == self.category)
            })
    }
}

/// Read access to the prize catalog.
pub trait PrizeCatalog: Send + Sync {
    /// All active prize definitions, heaviest first.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::StoreUnavailable` if the catalog cannot be read.
    fn active_prizes(&self) -> EconomyResult<Vec<PrizeDefinition>>;
}

/// In-memory catalog.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    prizes: RwLock<Vec<PrizeDefinition>>,
}

impl MemoryCatalog {
    /// Creates a catalog from a list of definitions.
    #[must_use]
    pub fn new(prizes: Vec<PrizeDefinition>) -> Self {
        Self {
            prizes: RwLock::new(prizes),
        }
    }

    /// Inserts or replaces a definition by slug.
    pub fn upsert(&self, prize: PrizeDefinition) {
        let mut prizes = self.prizes.write();
        if let Some(existing) = prizes.iter_mut().find(|p| p.slug == prize.slug) {
            *existing = prize;
        } else {
            prizes.push(prize);
        }
    }

    /// Activates or deactivates a prize.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::PrizeNotFound` for an unknown slug.
    pub fn set_active(&self, slug: &str, active: bool) -> EconomyResult<()> {
        let mut prizes = self.prizes.write();
        let prize = prizes
            .iter_mut()
            .find(|p| p.slug == slug)
            .ok_or_else(|| EconomyError::PrizeNotFound(slug.to_string()))?;
        prize.is_active = active;
        Ok(())
    }
}

impl PrizeCatalog for MemoryCatalog {
    fn active_prizes(&self) -> EconomyResult<Vec<PrizeDefinition>> {
        let mut active: Vec<PrizeDefinition> =
            self.prizes.read().iter().filter(|p| p.is_active).cloned().collect();
        active.sort_by(|a, b| b.drop_weight.total_cmp(&a.drop_weight));
        Ok(active)
    }
}
