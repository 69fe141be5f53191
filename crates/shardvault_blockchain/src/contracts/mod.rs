//! # Contract Definitions
//!
//! Token contract ABIs used by the vault, and calldata builders for the two
//! transfer shapes the dispatcher submits.

// The sol! macro generates code that we can't document, so allow missing_docs
#![allow(missing_docs)]

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

// ERC-1155 and ERC-721 both name their transfer `safeTransferFrom`. One
// `sol!` block would treat them as overloads, so each gets its own.
sol! {
    /// Semi-fungible token contract: shards and quantity-bearing units.
    #[derive(Debug)]
    interface IERC1155 {
        /// Emitted for every single-id transfer.
        event TransferSingle(
            address indexed operator,
            address indexed from,
            address indexed to,
            uint256 id,
            uint256 value
        );

        /// Moves `amount` of token `id` from `from` to `to`.
        function safeTransferFrom(
            address from,
            address to,
            uint256 id,
            uint256 amount,
            bytes data
        ) external;

        /// Balance of one token id.
        function balanceOf(address account, uint256 id) external view returns (uint256);
    }
}

sol! {
    /// Strictly unique token contract.
    #[derive(Debug)]
    interface IERC721 {
        /// Emitted when a token changes hands.
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 indexed tokenId
        );

        /// Moves token `tokenId` from `from` to `to`.
        function safeTransferFrom(address from, address to, uint256 tokenId) external;

        /// Gets the owner of a token.
        function ownerOf(uint256 tokenId) external view returns (address);
    }
}

/// Calldata for an ERC-1155 `safeTransferFrom` with empty `data`.
#[must_use]
pub fn erc1155_transfer_calldata(from: Address, to: Address, id: U256, amount: U256) -> Bytes {
    IERC1155::safeTransferFromCall {
        from,
        to,
        id,
        amount,
        data: Vec::new(),
    }
    .abi_encode()
    .into()
}

/// Calldata for an ERC-721 `safeTransferFrom(address,address,uint256)`.
#[must_use]
pub fn erc721_transfer_calldata(from: Address, to: Address, token_id: U256) -> Bytes {
    IERC721::safeTransferFromCall {
        from,
        to,
        tokenId: token_id,
    }
    .abi_encode()
    .into()
}
