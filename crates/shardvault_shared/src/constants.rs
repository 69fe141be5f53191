//! # Deployment Constants
//!
//! Defaults for the draw pipeline and the vault bridge.
//!
//! **NOTE:** Everything here can be overridden from the TOML config except the
//! chain id, which is baked into signed transactions.

// =============================================================================
// DRAW CONFIGURATION
// =============================================================================

/// Slug of the prize substituted when a unique-asset prize is out of stock.
pub const FALLBACK_PRIZE_SLUG: &str = "shard_x5";

/// Category searched for a substitute when the fallback slug is not active.
pub const SHARD_CATEGORY: &str = "shard";

/// Maximum length (in characters) of an outcome's error note.
pub const DEFAULT_ERROR_NOTE_LIMIT: usize = 500;

/// Age after which a `reserved` inventory unit is reported as stuck.
///
/// A chain transfer that has not resolved in ten minutes has either crashed
/// or hung, and both need an operator.
pub const DEFAULT_RESERVATION_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// BLOCKCHAIN CONFIGURATION
// =============================================================================

/// Token id of the semi-fungible shard on the shard contract.
pub const DEFAULT_SHARD_TOKEN_ID: u64 = 1;

/// Base Mainnet Chain ID
pub const BASE_CHAIN_ID: u64 = 8453;
