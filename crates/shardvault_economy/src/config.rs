//! # Deployment Configuration
//!
//! One TOML document describes a deployment: the vault, draw policy, the
//! prize catalog and the stocked inventory.
//!
//! ```toml
//! [vault]
//! address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
//! credential_env = "SHARDVAULT_VAULT_KEY"
//! shard_contract = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
//!
//! [draw]
//! fallback_slug = "shard_x5"
//!
//! [[prizes]]
//! slug = "shard_x5"
//! kind = "fungible-shard"
//! weight = 90.0
//!
//! [[inventory]]
//! unit_id = 1
//! prize = "dragon_egg"
//! token_id = "4242"
//! ```
//!
//! Rows stay plain strings until [`DeploymentConfig::prize_definitions`] and
//! [`DeploymentConfig::inventory_units`] convert them. A bad row fails the
//! whole load with `EconomyError::InvalidConfig`.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use shardvault_shared::{
    BASE_CHAIN_ID, DEFAULT_ERROR_NOTE_LIMIT, DEFAULT_RESERVATION_TIMEOUT_SECS,
    DEFAULT_SHARD_TOKEN_ID, FALLBACK_PRIZE_SLUG, SHARD_CATEGORY,
};

use crate::catalog::{AssetKind, FallbackPolicy, PrizeDefinition};
use crate::error::{EconomyError, EconomyResult};
use crate::inventory::{InventoryUnit, UnitStatus};

/// Default environment variable holding the vault signing key.
pub const DEFAULT_CREDENTIAL_ENV: &str = "SHARDVAULT_VAULT_KEY";

/// Top-level deployment document.
#[derive(Clone, Debug, Deserialize)]
pub struct DeploymentConfig {
    /// Custodial vault settings.
    pub vault: VaultSection,
    /// Draw policy.
    #[serde(default)]
    pub draw: DrawSection,
    /// Catalog rows.
    #[serde(default)]
    pub prizes: Vec<PrizeRow>,
    /// Stocked units.
    #[serde(default)]
    pub inventory: Vec<InventoryRow>,
}

/// `[vault]` section.
#[derive(Clone, Debug, Deserialize)]
pub struct VaultSection {
    /// Vault account address (transfer source).
    pub address: String,
    /// Environment variable holding the signing key. The key itself never
    /// appears in the file.
    #[serde(default = "default_credential_env")]
    pub credential_env: String,
    /// Chain the vault lives on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Default contract for fungible-shard prizes.
    #[serde(default)]
    pub shard_contract: Option<String>,
    /// Token id of the shard inside the shard contract.
    #[serde(default = "default_shard_token_id")]
    pub shard_token_id: u64,
}

/// `[draw]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DrawSection {
    /// Preferred stockout substitute.
    pub fallback_slug: String,
    /// Category scanned when the fallback slug is not active.
    pub fallback_category: String,
    /// Maximum characters kept in an outcome note.
    pub error_note_limit: usize,
    /// Seconds after which a reserved unit is reported as stale.
    pub reservation_timeout_secs: u64,
}

impl Default for DrawSection {
    fn default() -> Self {
        Self {
            fallback_slug: FALLBACK_PRIZE_SLUG.to_string(),
            fallback_category: SHARD_CATEGORY.to_string(),
            error_note_limit: DEFAULT_ERROR_NOTE_LIMIT,
            reservation_timeout_secs: DEFAULT_RESERVATION_TIMEOUT_SECS,
        }
    }
}

/// One `[[prizes]]` row.
#[derive(Clone, Debug, Deserialize)]
pub struct PrizeRow {
    /// Stable identity.
    pub slug: String,
    /// Display name (defaults to the slug).
    #[serde(default)]
    pub name: Option<String>,
    /// Asset kind: `unique-asset`, `fungible-shard` or `fungible-native`.
    pub kind: String,
    /// Relative drop weight.
    pub weight: f64,
    /// Fallback category override.
    #[serde(default)]
    pub category: Option<String>,
    /// XP granted on delivery.
    #[serde(default)]
    pub xp: u64,
    /// Delivering contract.
    #[serde(default)]
    pub contract: Option<String>,
    /// Fungible quantity (shards, or wei for native).
    #[serde(default)]
    pub amount: Option<u64>,
    /// Native payout in wei, decimal or `0x` hex. TOML integers stop at
    /// `i64::MAX`, so payouts above ~9.2 ETH go here.
    #[serde(default)]
    pub amount_wei: Option<String>,
    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Whether the prize takes part in draws.
    #[serde(default = "default_true")]
    pub active: bool,
}

/// One `[[inventory]]` row.
#[derive(Clone, Debug, Deserialize)]
pub struct InventoryRow {
    /// Unit identifier.
    pub unit_id: u64,
    /// Slug of the backed prize.
    pub prize: String,
    /// Token id, decimal or `0x` hex.
    pub token_id: String,
    /// Contract holding the token.
    #[serde(default)]
    pub contract: Option<String>,
    /// Semi-fungible quantity.
    #[serde(default)]
    pub amount: Option<u64>,
    /// Initial status: `available` (default) or the legacy `active`.
    #[serde(default)]
    pub status: Option<String>,
}

fn default_credential_env() -> String {
    DEFAULT_CREDENTIAL_ENV.to_string()
}

const fn default_chain_id() -> u64 {
    BASE_CHAIN_ID
}

const fn default_shard_token_id() -> u64 {
    DEFAULT_SHARD_TOKEN_ID
}

const fn default_true() -> bool {
    true
}

fn parse_address(field: &str, value: &str) -> EconomyResult<Address> {
    Address::from_str(value.trim())
        .map_err(|e| EconomyError::InvalidConfig(format!("{field}: bad address {value:?}: {e}")))
}

impl DeploymentConfig {
    /// Parses a deployment document.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` on malformed TOML or invalid rows.
    pub fn from_toml_str(text: &str) -> EconomyResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a deployment file.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` if the file cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> EconomyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EconomyError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Converts every row once so a bad file fails at load, not mid-play.
    fn validate(&self) -> EconomyResult<()> {
        self.vault_address()?;
        self.shard_contract()?;
        let prizes = self.prize_definitions()?;
        let units = self.inventory_units()?;

        let mut slugs = HashSet::new();
        for prize in &prizes {
            if !slugs.insert(prize.slug.as_str()) {
                return Err(EconomyError::InvalidConfig(format!(
                    "duplicate prize slug {}",
                    prize.slug
                )));
            }
        }

        let mut ids = HashSet::new();
        for unit in &units {
            if !ids.insert(unit.unit_id) {
                return Err(EconomyError::InvalidConfig(format!(
                    "duplicate inventory unit id {}",
                    unit.unit_id
                )));
            }
            let backs_unique = prizes
                .iter()
                .any(|p| p.slug == unit.prize_slug && p.asset_kind == AssetKind::UniqueAsset);
            if !backs_unique {
                return Err(EconomyError::InvalidConfig(format!(
                    "inventory unit {} references {:?}, which is not a unique-asset prize",
                    unit.unit_id, unit.prize_slug
                )));
            }
        }

        Ok(())
    }

    /// Vault account address.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` for a malformed address.
    pub fn vault_address(&self) -> EconomyResult<Address> {
        parse_address("vault.address", &self.vault.address)
    }

    /// Default shard contract, if configured.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` for a malformed address.
    pub fn shard_contract(&self) -> EconomyResult<Option<Address>> {
        self.vault
            .shard_contract
            .as_deref()
            .map(|value| parse_address("vault.shard_contract", value))
            .transpose()
    }

    /// Stockout substitution policy.
    #[must_use]
    pub fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy {
            slug: self.draw.fallback_slug.clone(),
            category: self.draw.fallback_category.clone(),
        }
    }

    /// Age at which a reservation is reported as stale.
    #[must_use]
    pub const fn reservation_timeout(&self) -> Duration {
        Duration::from_secs(self.draw.reservation_timeout_secs)
    }

    /// Catalog rows converted to definitions.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` for an unknown kind, a negative or
    /// non-finite weight, or a malformed contract address.
    pub fn prize_definitions(&self) -> EconomyResult<Vec<PrizeDefinition>> {
        self.prizes
            .iter()
            .map(|row| {
                let kind: AssetKind = row.kind.parse()?;
                if !row.weight.is_finite() || row.weight < 0.0 {
                    return Err(EconomyError::InvalidConfig(format!(
                        "prize {}: weight must be a non-negative number",
                        row.slug
                    )));
                }

                let mut prize = PrizeDefinition::new(row.slug.clone(), kind, row.weight).with_xp(row.xp);
                if let Some(name) = &row.name {
                    prize.name.clone_from(name);
                }
                if let Some(category) = &row.category {
                    prize = prize.with_category(category.clone());
                }
                if let Some(contract) = &row.contract {
                    prize = prize.with_contract(parse_address(&row.slug, contract)?);
                }
                prize.amount = row.amount;
                if let Some(wei) = &row.amount_wei {
                    prize.amount_wei = Some(U256::from_str(wei.trim()).map_err(|e| {
                        EconomyError::InvalidConfig(format!(
                            "prize {}: bad amount_wei {wei:?}: {e}",
                            row.slug
                        ))
                    })?);
                }
                prize.image.clone_from(&row.image);
                prize.is_active = row.active;
                Ok(prize)
            })
            .collect()
    }

    /// Inventory rows converted to units.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` for a malformed token id, contract
    /// or status.
    pub fn inventory_units(&self) -> EconomyResult<Vec<InventoryUnit>> {
        self.inventory
            .iter()
            .map(|row| {
                let token_id = U256::from_str(row.token_id.trim()).map_err(|e| {
                    EconomyError::InvalidConfig(format!(
                        "unit {}: bad token id {:?}: {e}",
                        row.unit_id, row.token_id
                    ))
                })?;

                let mut unit = InventoryUnit::new(row.unit_id, row.prize.clone(), token_id);
                unit.contract_address = row
                    .contract
                    .as_deref()
                    .map(|value| parse_address("inventory.contract", value))
                    .transpose()?;
                unit.amount = row.amount;
                unit.status = match row.status.as_deref() {
                    None | Some("available") => UnitStatus::Available,
                    Some("active") => UnitStatus::Active,
                    Some(other) => {
                        return Err(EconomyError::InvalidConfig(format!(
                            "unit {}: cannot stock a unit as {other:?}",
                            row.unit_id
                        )))
                    }
                };
                Ok(unit)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [vault]
        address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        shard_contract = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"

        [draw]
        error_note_limit = 200

        [[prizes]]
        slug = "shard_x5"
        kind = "fungible-shard"
        weight = 90.0
        xp = 10

        [[prizes]]
        slug = "dragon_egg"
        name = "Dragon Egg"
        kind = "unique-asset"
        weight = 10.0
        contract = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
        image = "ipfs://egg.png"

        [[inventory]]
        unit_id = 1
        prize = "dragon_egg"
        token_id = "4242"

        [[inventory]]
        unit_id = 2
        prize = "dragon_egg"
        token_id = "0x10"
        amount = 3
        status = "active"
    "#;

    #[test]
    fn test_load_sample() {
        let config = DeploymentConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.vault.credential_env, DEFAULT_CREDENTIAL_ENV);
        assert_eq!(config.vault.chain_id, BASE_CHAIN_ID);
        assert_eq!(config.vault.shard_token_id, DEFAULT_SHARD_TOKEN_ID);
        assert!(config.shard_contract().unwrap().is_some());
        assert_eq!(config.draw.error_note_limit, 200);
        assert_eq!(config.draw.fallback_slug, FALLBACK_PRIZE_SLUG);

        let prizes = config.prize_definitions().unwrap();
        assert_eq!(prizes.len(), 2);
        assert_eq!(prizes[0].category, SHARD_CATEGORY);
        assert_eq!(prizes[0].xp_reward, 10);
        assert_eq!(prizes[1].name, "Dragon Egg");
        assert_eq!(prizes[1].asset_kind, AssetKind::UniqueAsset);
        assert!(prizes[1].contract_address.is_some());

        let units = config.inventory_units().unwrap();
        assert_eq!(units[0].token_id, U256::from(4242u64));
        assert_eq!(units[1].token_id, U256::from(16u64));
        assert_eq!(units[1].status, UnitStatus::Active);
        assert_eq!(units[1].fungible_amount(), Some(3));
    }

    #[test]
    fn test_rejects_bad_kind() {
        let text = SAMPLE.replace("\"fungible-shard\"", "\"gift-card\"");
        assert!(matches!(
            DeploymentConfig::from_toml_str(&text),
            Err(EconomyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_address() {
        let text = SAMPLE.replace("0x5FbDB2315678afecb367f032d93F642f64180aa3", "0xnope");
        assert!(matches!(
            DeploymentConfig::from_toml_str(&text),
            Err(EconomyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_orphan_inventory() {
        let text = SAMPLE.replace("prize = \"dragon_egg\"", "prize = \"shard_x5\"");
        assert!(matches!(
            DeploymentConfig::from_toml_str(&text),
            Err(EconomyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let text = SAMPLE.replace("weight = 90.0", "weight = -1.0");
        assert!(DeploymentConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_minimal_document() {
        let config = DeploymentConfig::from_toml_str(
            "[vault]\naddress = \"0x5FbDB2315678afecb367f032d93F642f64180aa3\"\n",
        )
        .unwrap();
        assert!(config.prizes.is_empty());
        assert_eq!(config.shard_contract().unwrap(), None);
        assert_eq!(
            config.reservation_timeout(),
            Duration::from_secs(DEFAULT_RESERVATION_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_native_amount_wei_string() {
        let text = r#"
            [vault]
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

            [[prizes]]
            slug = "eth_jackpot"
            kind = "fungible-native"
            weight = 1.0
            amount_wei = "25000000000000000000"
        "#;
        let config = DeploymentConfig::from_toml_str(text).unwrap();
        let prizes = config.prize_definitions().unwrap();
        assert_eq!(
            prizes[0].native_amount(),
            Some(U256::from_str("25000000000000000000").unwrap())
        );

        let bad = text.replace("25000000000000000000", "lots");
        assert!(matches!(
            DeploymentConfig::from_toml_str(&bad),
            Err(EconomyError::InvalidConfig(_))
        ));
    }
}
