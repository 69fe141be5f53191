//! # Vault Transfer Dispatcher
//!
//! Delivers one drawn prize from the custodial vault to the winner.
//!
//! ## Dispatch
//!
//! ```text
//! prize + unit? ──resolve──▶ TransferOrder ──build──▶ VaultTransaction ──submit──▶ TxHash
//!
//!   fungible-shard   ─▶ Shard            ─▶ ERC-1155 safeTransferFrom(shard id, quantity)
//!   fungible-native  ─▶ Native           ─▶ value transfer
//!   unique-asset     ─▶ SemiFungibleUnit ─▶ ERC-1155 safeTransferFrom(token id, unit amount)
//!                    ─▶ UniqueUnit       ─▶ ERC-721  safeTransferFrom(token id)
//! ```
//!
//! Every dispatch performs exactly one submission, or none when the order
//! cannot be built. Configuration problems (no vault credential, no
//! contract) come back as [`TransferError`] values before anything is sent.

use alloy_primitives::{Address, TxHash, U256};
use shardvault_economy::{AssetKind, InventoryUnit, PrizeDefinition};
use shardvault_shared::{WalletAddress, DEFAULT_SHARD_TOKEN_ID};
use thiserror::Error;

use crate::client::{ChainClient, ChainError, VaultAccount, VaultTransaction};
use crate::contracts::{erc1155_transfer_calldata, erc721_transfer_calldata};

/// Why a delivery did not happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The vault signing key is not configured.
    #[error("vault credential is not configured")]
    MissingCredential,

    /// No contract address could be resolved for the prize.
    #[error("no contract address configured for prize {0}")]
    MissingContract(String),

    /// A unique-asset prize reached the dispatcher without a reserved unit.
    #[error("no inventory unit reserved for prize {0}")]
    MissingInventoryUnit(String),

    /// A native prize has no positive amount.
    #[error("no payout amount configured for prize {0}")]
    MissingAmount(String),

    /// The winner's wallet is not a valid address.
    #[error("invalid destination wallet {wallet}: {reason}")]
    InvalidDestination {
        /// Wallet as supplied.
        wallet: String,
        /// Parse failure.
        reason: String,
    },

    /// The chain client rejected or failed the submission.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Static dispatch settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Default contract for fungible-shard prizes.
    pub shard_contract: Option<Address>,
    /// Token id of the shard inside the shard contract.
    pub shard_token_id: U256,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            shard_contract: None,
            shard_token_id: U256::from(DEFAULT_SHARD_TOKEN_ID),
        }
    }
}

/// One fully resolved transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOrder {
    /// Shard quantity from the shard contract.
    Shard {
        /// Shard contract.
        contract: Address,
        /// Shard token id.
        token_id: U256,
        /// Quantity.
        amount: u64,
    },
    /// Native currency payout.
    Native {
        /// Amount in wei.
        amount_wei: U256,
    },
    /// Quantity-bearing stocked unit (ERC-1155).
    SemiFungibleUnit {
        /// Unit contract.
        contract: Address,
        /// Unit token id.
        token_id: U256,
        /// Quantity carried by the unit.
        amount: u64,
    },
    /// Strictly unique stocked unit (ERC-721).
    UniqueUnit {
        /// Unit contract.
        contract: Address,
        /// Unit token id.
        token_id: U256,
    },
}

impl TransferOrder {
    /// Resolves what to send for a prize.
    ///
    /// A unit's own contract wins over the prize's; for shards the prize's
    /// contract wins over the configured shard contract.
    ///
    /// # Errors
    ///
    /// Returns the configuration [`TransferError`] that prevents delivery.
    pub fn resolve(
        prize: &PrizeDefinition,
        unit: Option<&InventoryUnit>,
        config: &DispatcherConfig,
    ) -> Result<Self, TransferError> {
        match prize.asset_kind {
            AssetKind::FungibleShard => {
                let contract = prize
                    .contract_address
                    .or(config.shard_contract)
                    .ok_or_else(|| TransferError::MissingContract(prize.slug.clone()))?;
                Ok(Self::Shard {
                    contract,
                    token_id: config.shard_token_id,
                    amount: prize.shard_quantity(),
                })
            }
            AssetKind::FungibleNative => {
                let amount_wei = prize
                    .native_amount()
                    .ok_or_else(|| TransferError::MissingAmount(prize.slug.clone()))?;
                Ok(Self::Native { amount_wei })
            }
            AssetKind::UniqueAsset => {
                let Some(unit) = unit else {
                    return Err(match prize.contract_address {
                        None => TransferError::MissingContract(prize.slug.clone()),
                        Some(_) => TransferError::MissingInventoryUnit(prize.slug.clone()),
                    });
                };
                let contract = unit
                    .contract_address
                    .or(prize.contract_address)
                    .ok_or_else(|| TransferError::MissingContract(prize.slug.clone()))?;
                Ok(match unit.fungible_amount() {
                    Some(amount) => Self::SemiFungibleUnit {
                        contract,
                        token_id: unit.token_id,
                        amount,
                    },
                    None => Self::UniqueUnit {
                        contract,
                        token_id: unit.token_id,
                    },
                })
            }
        }
    }

    /// Builds the vault transaction for this order.
    #[must_use]
    pub fn to_transaction(&self, vault: Address, destination: Address) -> VaultTransaction {
        match *self {
            Self::Shard {
                contract,
                token_id,
                amount,
            }
            | Self::SemiFungibleUnit {
                contract,
                token_id,
                amount,
            } => VaultTransaction::contract_call(
                vault,
                contract,
                erc1155_transfer_calldata(vault, destination, token_id, U256::from(amount)),
            ),
            Self::Native { amount_wei } => VaultTransaction::native(vault, destination, amount_wei),
            Self::UniqueUnit { contract, token_id } => VaultTransaction::contract_call(
                vault,
                contract,
                erc721_transfer_calldata(vault, destination, token_id),
            ),
        }
    }
}

/// Executes prize transfers from the vault through a [`ChainClient`].
pub struct VaultDispatcher<C> {
    client: C,
    vault: Option<VaultAccount>,
    config: DispatcherConfig,
}

impl<C: ChainClient> VaultDispatcher<C> {
    /// Creates a dispatcher. With `vault` unset every transfer fails with
    /// [`TransferError::MissingCredential`].
    #[must_use]
    pub fn new(client: C, vault: Option<VaultAccount>, config: DispatcherConfig) -> Self {
        if vault.is_none() {
            tracing::warn!("vault credential missing: every transfer will fail");
        }
        Self {
            client,
            vault,
            config,
        }
    }

    /// The chain client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns true if a vault credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.vault.is_some()
    }

    /// Delivers `prize` (backed by `unit` for unique assets) to `destination`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransferError`] for missing configuration, an invalid
    /// destination, or a chain rejection.
    pub async fn transfer(
        &self,
        prize: &PrizeDefinition,
        unit: Option<&InventoryUnit>,
        destination: &WalletAddress,
    ) -> Result<TxHash, TransferError> {
        let vault = self.vault.as_ref().ok_or(TransferError::MissingCredential)?;

        let to = destination
            .to_address()
            .map_err(|e| TransferError::InvalidDestination {
                wallet: destination.as_str().to_string(),
                reason: e.to_string(),
            })?;

        let order = TransferOrder::resolve(prize, unit, &self.config)?;
        let tx = order.to_transaction(vault.address(), to);

        tracing::debug!(slug = %prize.slug, ?order, "submitting vault transfer");
        let tx_hash = self.client.submit(vault, tx).await?;
        tracing::debug!(slug = %prize.slug, %tx_hash, "vault transfer accepted");

        Ok(tx_hash)
    }
}
