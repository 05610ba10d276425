//! CurrencyRegister: introduce a new currency and mint its genesis amount.

use serde::{Deserialize, Serialize};
use tally_types::FactHash;

use super::{fact_header, Fact, Hint, OperationKind, SignedOperation, HINT_VERSION};
use crate::canonical::hex_bytes;
use crate::error::InvalidError;
use crate::fee::CurrencyDesign;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRegisterFact {
    hash: FactHash,
    #[serde(with = "hex_bytes")]
    token: Vec<u8>,
    currency: CurrencyDesign,
}

impl CurrencyRegisterFact {
    pub fn new(token: impl Into<Vec<u8>>, currency: CurrencyDesign) -> Self {
        let mut fact = Self {
            hash: FactHash::ZERO,
            token: token.into(),
            currency,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn currency(&self) -> &CurrencyDesign {
        &self.currency
    }
}

impl Fact for CurrencyRegisterFact {
    const HINT: Hint = Hint::new("tally-currency-currency-register-fact", HINT_VERSION);
    const KIND: OperationKind = OperationKind::CurrencyRegister;

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> FactHash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        fact_header(&self.token, Self::HINT)
            .put(&self.currency.to_bytes())
            .finish()
    }

    fn validate_fields(&self) -> Result<(), InvalidError> {
        self.currency.validate()
    }
}

pub type CurrencyRegister = SignedOperation<CurrencyRegisterFact>;
