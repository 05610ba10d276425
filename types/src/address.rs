//! Account address type with `tly_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger account address, always prefixed with `tly_`.
///
/// Derived from the hash of the account's key set (see `tally_crypto::derive_address`),
/// so the address survives key rotation only through an explicit key update.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all addresses.
    pub const PREFIX: &'static str = "tly_";

    /// Length of the encoded part after the prefix: 52 hash chars + 8 checksum chars.
    pub const ENCODED_LEN: usize = 60;

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Structural check: prefix, length and alphabet. The checksum is verified by
    /// `tally_crypto::validate_address`.
    pub fn is_well_formed(&self) -> bool {
        match self.0.strip_prefix(Self::PREFIX) {
            Some(encoded) => {
                encoded.len() == Self::ENCODED_LEN
                    && encoded
                        .bytes()
                        .all(|b| b"13456789abcdefghijkmnopqrstuwxyz".contains(&b))
            }
            None => false,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_prefix_is_malformed() {
        let body = "1".repeat(Address::ENCODED_LEN);
        assert!(Address::new(format!("tly_{body}")).is_well_formed());
        assert!(!Address::new(format!("brn_{body}")).is_well_formed());
    }

    #[test]
    fn wrong_length_or_alphabet_is_malformed() {
        assert!(!Address::new("tly_").is_well_formed());
        assert!(!Address::new("tly_tooshort").is_well_formed());
        let bad = format!("tly_{}", "0".repeat(Address::ENCODED_LEN));
        assert!(!Address::new(bad).is_well_formed());
    }
}
