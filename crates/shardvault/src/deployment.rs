//! # In-Memory Deployment
//!
//! Builds a ready-to-play pipeline from a [`DeploymentConfig`]: the catalog
//! is loaded, inventory is stocked, and the dispatcher is configured. The
//! concrete stores stay reachable for credit grants and inspection.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use shardvault_blockchain::{ChainClient, DispatcherConfig, VaultAccount, VaultDispatcher};
use shardvault_economy::{
    DeploymentConfig, EconomyResult, MemoryAccountStore, MemoryCatalog, MemoryInventory,
    MemoryXpStore, OutcomeStore,
};

use crate::pipeline::{PipelineSettings, PipelineStores, PlayPipeline};

/// A pipeline over in-memory stores.
pub struct Deployment<C> {
    /// Balance Ledger.
    pub accounts: Arc<MemoryAccountStore>,
    /// Prize Catalog.
    pub catalog: Arc<MemoryCatalog>,
    /// Inventory Allocator.
    pub inventory: Arc<MemoryInventory>,
    /// Experience Ledger.
    pub xp: Arc<MemoryXpStore>,
    /// The pipeline.
    pub pipeline: PlayPipeline<C>,
    /// Age at which reservations are reported stale.
    pub reservation_timeout: Duration,
}

/// Dispatcher settings from the `[vault]` section.
///
/// # Errors
///
/// Returns `EconomyError::InvalidConfig` for a malformed shard contract.
pub fn dispatcher_config(config: &DeploymentConfig) -> EconomyResult<DispatcherConfig> {
    Ok(DispatcherConfig {
        shard_contract: config.shard_contract()?,
        shard_token_id: U256::from(config.vault.shard_token_id),
    })
}

/// Builds an in-memory deployment.
///
/// `vault` is `None` when the credential is missing; the deployment still
/// starts and every transfer fails as `transfer_failed`.
///
/// # Errors
///
/// Returns `EconomyError::InvalidConfig` for bad rows or duplicate units.
pub fn in_memory<C: ChainClient + 'static>(
    config: &DeploymentConfig,
    client: C,
    vault: Option<VaultAccount>,
    outcomes: Arc<dyn OutcomeStore>,
) -> EconomyResult<Deployment<C>> {
    let catalog = Arc::new(MemoryCatalog::new(config.prize_definitions()?));
    let inventory = Arc::new(MemoryInventory::new());
    for unit in config.inventory_units()? {
        inventory.stock(unit)?;
    }
    let accounts = Arc::new(MemoryAccountStore::new());
    let xp = Arc::new(MemoryXpStore::new());

    let stores = PipelineStores {
        accounts: accounts.clone(),
        catalog: catalog.clone(),
        inventory: inventory.clone(),
        xp: xp.clone(),
        outcomes,
    };
    let dispatcher = VaultDispatcher::new(client, vault, dispatcher_config(config)?);
    let pipeline = PlayPipeline::new(stores, dispatcher, PipelineSettings::from_config(config));

    tracing::info!(
        prizes = config.prizes.len(),
        units = config.inventory.len(),
        chain_id = config.vault.chain_id,
        "deployment ready"
    );

    Ok(Deployment {
        accounts,
        catalog,
        inventory,
        xp,
        pipeline,
        reservation_timeout: config.reservation_timeout(),
    })
}
