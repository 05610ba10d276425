//! Currency amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_types::{Big, CurrencyId};

use crate::canonical::CanonicalBytes;
use crate::error::InvalidError;

/// A quantity of one currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    big: Big,
    currency: CurrencyId,
}

impl Amount {
    pub fn new(big: impl Into<Big>, currency: CurrencyId) -> Self {
        Self {
            big: big.into(),
            currency,
        }
    }

    pub fn zero(currency: CurrencyId) -> Self {
        Self::new(Big::zero(), currency)
    }

    pub fn big(&self) -> &Big {
        &self.big
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    /// Same currency, different value.
    pub fn with_big(&self, big: Big) -> Self {
        Self {
            big,
            currency: self.currency.clone(),
        }
    }

    /// Non-negative value and a valid currency id.
    pub fn validate(&self) -> Result<(), InvalidError> {
        if !self.currency.is_valid() {
            return Err(InvalidError::Currency(self.currency.to_string()));
        }
        if !self.big.is_valid() {
            return Err(InvalidError::Amount(format!("negative amount {self}")));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus a strictly positive value, as required of
    /// every amount carried in a fact.
    pub fn validate_positive(&self) -> Result<(), InvalidError> {
        self.validate()?;
        if !self.big.is_positive() {
            return Err(InvalidError::Amount(format!("amount must be positive, got {self}")));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        CanonicalBytes::new()
            .put(&self.big.to_bytes())
            .put(&self.currency.to_bytes())
            .finish()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.big, self.currency)
    }
}
