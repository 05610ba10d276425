//! The block's fee settlement operation.
//!
//! Built by the engine when a pass closes, never signed. Each amount is the total
//! fee a currency collected during the block; processing it credits that total to
//! the currency's fee receiver.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_types::FactHash;

use super::{fact_header, Fact, Hint, OperationKind, SignedOperation, HINT_VERSION};
use crate::amount::Amount;
use crate::canonical::hex_bytes;
use crate::error::InvalidError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeFact {
    hash: FactHash,
    #[serde(with = "hex_bytes")]
    token: Vec<u8>,
    amounts: Vec<Amount>,
}

impl FeeFact {
    pub fn new(token: impl Into<Vec<u8>>, amounts: Vec<Amount>) -> Self {
        let mut fact = Self {
            hash: FactHash::ZERO,
            token: token.into(),
            amounts,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    /// The settlement fact for block `height`.
    pub fn for_height(height: u64, amounts: Vec<Amount>) -> Self {
        Self::new(height.to_be_bytes().to_vec(), amounts)
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }
}

impl Fact for FeeFact {
    const HINT: Hint = Hint::new("tally-currency-fee-fact", HINT_VERSION);
    const KIND: OperationKind = OperationKind::Fee;

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> FactHash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        fact_header(&self.token, Self::HINT)
            .put_list(&self.amounts, Amount::to_bytes)
            .finish()
    }

    fn validate_fields(&self) -> Result<(), InvalidError> {
        let mut seen = HashSet::with_capacity(self.amounts.len());
        for am in &self.amounts {
            am.validate()?;
            if !seen.insert(am.currency()) {
                return Err(InvalidError::Amount(format!(
                    "duplicate fee currency {}",
                    am.currency()
                )));
            }
        }
        Ok(())
    }
}

pub type FeeOperation = SignedOperation<FeeFact>;

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::CurrencyId;

    #[test]
    fn height_is_the_token() {
        let a = FeeFact::for_height(7, vec![Amount::new(3u64, CurrencyId::new("MCC"))]);
        let b = FeeFact::for_height(8, vec![Amount::new(3u64, CurrencyId::new("MCC"))]);
        assert_eq!(a.token(), &7u64.to_be_bytes());
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.validate(), Ok(()));
    }

    #[test]
    fn duplicate_currency_rejected() {
        let f = FeeFact::for_height(
            1,
            vec![
                Amount::new(3u64, CurrencyId::new("MCC")),
                Amount::new(4u64, CurrencyId::new("MCC")),
            ],
        );
        assert!(matches!(f.validate(), Err(InvalidError::Amount(_))));
    }
}
