//! CurrencyPolicyUpdater: replace the policy of a registered currency.

use serde::{Deserialize, Serialize};
use tally_types::{CurrencyId, FactHash};

use super::{fact_header, Fact, Hint, OperationKind, SignedOperation, HINT_VERSION};
use crate::canonical::hex_bytes;
use crate::error::InvalidError;
use crate::fee::CurrencyPolicy;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPolicyUpdaterFact {
    hash: FactHash,
    #[serde(with = "hex_bytes")]
    token: Vec<u8>,
    currency: CurrencyId,
    policy: CurrencyPolicy,
}

impl CurrencyPolicyUpdaterFact {
    pub fn new(token: impl Into<Vec<u8>>, currency: CurrencyId, policy: CurrencyPolicy) -> Self {
        let mut fact = Self {
            hash: FactHash::ZERO,
            token: token.into(),
            currency,
            policy,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }
}

impl Fact for CurrencyPolicyUpdaterFact {
    const HINT: Hint = Hint::new("tally-currency-currency-policy-updater-fact", HINT_VERSION);
    const KIND: OperationKind = OperationKind::CurrencyPolicyUpdater;

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> FactHash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        fact_header(&self.token, Self::HINT)
            .put(&self.currency.to_bytes())
            .put(&self.policy.to_bytes())
            .finish()
    }

    fn validate_fields(&self) -> Result<(), InvalidError> {
        if !self.currency.is_valid() {
            return Err(InvalidError::Currency(self.currency.to_string()));
        }
        self.policy.validate()
    }
}

pub type CurrencyPolicyUpdater = SignedOperation<CurrencyPolicyUpdaterFact>;
