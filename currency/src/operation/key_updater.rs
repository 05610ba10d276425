//! KeyUpdater: replace an account's key set.

use serde::{Deserialize, Serialize};
use tally_types::{Address, CurrencyId, FactHash};

use super::{fact_header, Fact, Hint, OperationKind, SignedOperation, HINT_VERSION};
use crate::canonical::hex_bytes;
use crate::error::InvalidError;
use crate::keys::{validate_address, Keys};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyUpdaterFact {
    hash: FactHash,
    #[serde(with = "hex_bytes")]
    token: Vec<u8>,
    target: Address,
    keys: Keys,
    /// The currency the update fee is paid in.
    currency: CurrencyId,
}

impl KeyUpdaterFact {
    pub fn new(token: impl Into<Vec<u8>>, target: Address, keys: Keys, currency: CurrencyId) -> Self {
        let mut fact = Self {
            hash: FactHash::ZERO,
            token: token.into(),
            target,
            keys,
            currency,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn target(&self) -> &Address {
        &self.target
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl Fact for KeyUpdaterFact {
    const HINT: Hint = Hint::new("tally-currency-key-updater-fact", HINT_VERSION);
    const KIND: OperationKind = OperationKind::KeyUpdater;

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> FactHash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        fact_header(&self.token, Self::HINT)
            .put(&self.target.to_bytes())
            .put(&self.keys.to_bytes())
            .put(&self.currency.to_bytes())
            .finish()
    }

    fn validate_fields(&self) -> Result<(), InvalidError> {
        validate_address(&self.target)?;
        self.keys.validate()?;
        if !self.currency.is_valid() {
            return Err(InvalidError::Currency(self.currency.to_string()));
        }
        Ok(())
    }
}

pub type KeyUpdater = SignedOperation<KeyUpdaterFact>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use tally_types::PublicKey;

    fn keys(b: u8) -> Keys {
        Keys::new(vec![Key::new(PublicKey([b; 32]), 100)], 100).unwrap()
    }

    #[test]
    fn valid_and_hash_sensitive_to_keys() {
        let a = KeyUpdaterFact::new(b"t".to_vec(), keys(1).address(), keys(2), CurrencyId::new("MCC"));
        let b = KeyUpdaterFact::new(b"t".to_vec(), keys(1).address(), keys(3), CurrencyId::new("MCC"));
        assert_eq!(a.validate(), Ok(()));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn invalid_fee_currency() {
        let f = KeyUpdaterFact::new(b"t".to_vec(), keys(1).address(), keys(2), CurrencyId::new("m"));
        assert!(matches!(f.validate(), Err(InvalidError::Currency(_))));
    }
}
