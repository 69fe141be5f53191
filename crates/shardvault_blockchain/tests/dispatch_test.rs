//! # Vault Dispatch Tests
//!
//! Drives the dispatcher against the simulated chain and checks what
//! actually reaches the chain for each asset kind.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use shardvault_blockchain::contracts::{IERC1155, IERC721};
use shardvault_blockchain::{
    ChainError, DispatcherConfig, SimulatedChain, TransferError, VaultAccount, VaultDispatcher,
};
use shardvault_economy::{AssetKind, InventoryUnit, PrizeDefinition};
use shardvault_shared::WalletAddress;

const PLAYER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

fn vault() -> VaultAccount {
    VaultAccount::new(Address::repeat_byte(0xAA), "vault-key")
}

fn config() -> DispatcherConfig {
    DispatcherConfig {
        shard_contract: Some(Address::repeat_byte(0x5A)),
        ..DispatcherConfig::default()
    }
}

fn dispatcher(vault: Option<VaultAccount>) -> VaultDispatcher<SimulatedChain> {
    VaultDispatcher::new(SimulatedChain::new(), vault, config())
}

#[tokio::test]
async fn test_shard_prize_reaches_shard_contract() {
    let dispatcher = dispatcher(Some(vault()));
    let prize = PrizeDefinition::new("shard_x5", AssetKind::FungibleShard, 100.0).with_amount(5);

    let hash = dispatcher
        .transfer(&prize, None, &WalletAddress::new(PLAYER))
        .await
        .unwrap();

    let submitted = dispatcher.client().submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].hash, hash);
    assert_eq!(submitted[0].tx.to, Address::repeat_byte(0x5A));

    let call = IERC1155::safeTransferFromCall::abi_decode(&submitted[0].tx.input, true).unwrap();
    assert_eq!(call.from, Address::repeat_byte(0xAA));
    assert_eq!(call.to, PLAYER.parse::<Address>().unwrap());
    assert_eq!(call.amount, U256::from(5));
    assert!(call.data.is_empty());
}

#[tokio::test]
async fn test_unique_unit_uses_erc721() {
    let dispatcher = dispatcher(Some(vault()));
    let prize = PrizeDefinition::new("dragon_egg", AssetKind::UniqueAsset, 1.0)
        .with_contract(Address::repeat_byte(0x01));
    let unit = InventoryUnit::new(7, "dragon_egg", U256::from(4242));

    dispatcher
        .transfer(&prize, Some(&unit), &WalletAddress::new(PLAYER))
        .await
        .unwrap();

    let submitted = dispatcher.client().submitted();
    let call = IERC721::safeTransferFromCall::abi_decode(&submitted[0].tx.input, true).unwrap();
    assert_eq!(call.tokenId, U256::from(4242));
    assert_eq!(submitted[0].tx.to, Address::repeat_byte(0x01));
}

#[tokio::test]
async fn test_native_prize_sends_value() {
    let dispatcher = dispatcher(Some(vault()));
    let prize =
        PrizeDefinition::new("eth_dust", AssetKind::FungibleNative, 1.0).with_amount(10_000_000_000);

    dispatcher
        .transfer(&prize, None, &WalletAddress::new(PLAYER))
        .await
        .unwrap();

    let submitted = dispatcher.client().submitted();
    assert_eq!(submitted[0].tx.value, U256::from(10_000_000_000u64));
    assert_eq!(submitted[0].tx.to, PLAYER.parse::<Address>().unwrap());
    assert!(submitted[0].tx.input.is_empty());
}

#[tokio::test]
async fn test_missing_credential_never_submits() {
    let dispatcher = dispatcher(None);
    assert!(!dispatcher.has_credential());

    let prize = PrizeDefinition::new("shard_x5", AssetKind::FungibleShard, 100.0);
    let result = dispatcher
        .transfer(&prize, None, &WalletAddress::new(PLAYER))
        .await;

    assert_eq!(result, Err(TransferError::MissingCredential));
    assert_eq!(dispatcher.client().submission_count(), 0);
}

#[tokio::test]
async fn test_invalid_destination_never_submits() {
    let dispatcher = dispatcher(Some(vault()));
    let prize = PrizeDefinition::new("shard_x5", AssetKind::FungibleShard, 100.0);

    let result = dispatcher
        .transfer(&prize, None, &WalletAddress::new("0xA"))
        .await;

    assert!(matches!(result, Err(TransferError::InvalidDestination { .. })));
    assert_eq!(dispatcher.client().submission_count(), 0);
}

#[tokio::test]
async fn test_chain_rejection_carries_text() {
    let dispatcher = dispatcher(Some(vault()));
    dispatcher
        .client()
        .fail_next(ChainError::Rejected("ERC1155: insufficient balance for transfer".to_string()));
    let prize = PrizeDefinition::new("shard_x5", AssetKind::FungibleShard, 100.0);

    let err = dispatcher
        .transfer(&prize, None, &WalletAddress::new(PLAYER))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("insufficient balance"));
    assert!(matches!(err, TransferError::Chain(ChainError::Rejected(_))));
}
