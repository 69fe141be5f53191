//! # Wallet Addresses
//!
//! Players are identified by the wallet string they connect with. Lookups
//! compare case-folded, storage keeps whatever casing the caller supplied.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;

/// A wallet address exactly as the caller supplied it.
///
/// Equality is not derived. Two wallets differing only in
/// casing are the same player, so compare with [`WalletAddress::matches`] or
/// through [`WalletAddress::folded`].
#[derive(Clone, Debug)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Wraps a caller-supplied wallet string, trimming surrounding whitespace.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.len() == raw.len() {
            Self(raw)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Returns the wallet with its original casing.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no wallet was supplied.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-folded form used as a lookup key. Never stored as the wallet.
    #[must_use]
    pub fn folded(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Case-insensitive comparison against another wallet string.
    #[inline]
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// Parses the wallet as an on-chain address.
    ///
    /// Checksums are not enforced: players paste addresses in every casing.
    ///
    /// # Errors
    ///
    /// Returns the hex parse error if the string is not a 20-byte address.
    pub fn to_address(&self) -> Result<Address, <Address as FromStr>::Err> {
        Address::from_str(&self.0)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for WalletAddress {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casing_preserved() {
        let wallet = WalletAddress::new("0xAbCd00000000000000000000000000000000eF12");
        assert_eq!(wallet.as_str(), "0xAbCd00000000000000000000000000000000eF12");
        assert_eq!(wallet.folded(), "0xabcd00000000000000000000000000000000ef12");
    }

    #[test]
    fn test_case_insensitive_match() {
        let wallet = WalletAddress::new("0xABCDEF0000000000000000000000000000000001");
        assert!(wallet.matches("0xabcdef0000000000000000000000000000000001"));
        assert!(!wallet.matches("0xabcdef0000000000000000000000000000000002"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        let wallet = WalletAddress::new("  0xA  ");
        assert_eq!(wallet.as_str(), "0xA");
        assert!(WalletAddress::new("   ").is_empty());
    }

    #[test]
    fn test_to_address() {
        let wallet = WalletAddress::new("0x13A66f39406b8bea69ad0d8be910e1ecaccf6382");
        assert!(wallet.to_address().is_ok());
        assert!(WalletAddress::new("0xA").to_address().is_err());
    }
}
