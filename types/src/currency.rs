//! Currency identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Identifies a registered currency, e.g. `"MCC"` or `"FINDME"`.
///
/// Between [`CurrencyId::MIN_LEN`] and [`CurrencyId::MAX_LEN`] characters drawn from
/// upper-case ASCII letters, digits and `_.!$*@`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyId(String);

impl CurrencyId {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 10;

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        let len = self.0.len();
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&len)
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b"_.!$*@".contains(&b))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cid = Self::new(s.trim());
        if cid.is_valid() {
            Ok(cid)
        } else {
            Err(TypesError::InvalidCurrencyId(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_ids() {
        assert!(CurrencyId::new("MCC").is_valid());
        assert!(CurrencyId::new("FINDME").is_valid());
        assert!(CurrencyId::new("A_B.C$1").is_valid());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!CurrencyId::new("").is_valid());
        assert!(!CurrencyId::new("AB").is_valid());
        assert!(!CurrencyId::new("lower").is_valid());
        assert!(!CurrencyId::new("ELEVENCHARS").is_valid());
        assert!("S P".parse::<CurrencyId>().is_err());
    }
}
