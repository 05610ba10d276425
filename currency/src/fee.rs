//! Fee policy and currency designs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use tally_types::{Address, Big, CurrencyId};

use crate::amount::Amount;
use crate::canonical::CanonicalBytes;
use crate::error::InvalidError;
use crate::keys::validate_address;
use crate::limits::RATIO_PRECISION;

const RATIO_DENOM: NonZeroU64 = match NonZeroU64::new(RATIO_PRECISION) {
    Some(d) => d,
    None => panic!("ratio precision must be non-zero"),
};

/// A fee ratio in parts per billion, `0..=1_000_000_000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRatio(u64);

impl FeeRatio {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(RATIO_PRECISION);

    pub fn from_ppb(ppb: u64) -> Result<Self, InvalidError> {
        let r = Self(ppb);
        r.validate()?;
        Ok(r)
    }

    /// Convert a decimal ratio such as `0.005`. Rounded to the nearest part per
    /// billion; only meant for operator input.
    pub fn from_f64(ratio: f64) -> Result<Self, InvalidError> {
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(InvalidError::Policy(format!("fee ratio {ratio} not in [0, 1]")));
        }
        Ok(Self((ratio * RATIO_PRECISION as f64).round() as u64))
    }

    pub fn ppb(&self) -> u64 {
        self.0
    }

    pub fn validate(&self) -> Result<(), InvalidError> {
        if self.0 > RATIO_PRECISION {
            return Err(InvalidError::Policy(format!(
                "fee ratio {} ppb above {}",
                self.0, RATIO_PRECISION
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FeeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, RATIO_PRECISION)
    }
}

/// How a currency charges fees on the amounts moved by an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feeer {
    /// No fee.
    Nil,
    /// A flat fee per charged amount.
    Fixed {
        receiver: Option<Address>,
        amount: Big,
    },
    /// `amount * ratio`, truncated, then clamped into `[min, max]`.
    Ratio {
        receiver: Option<Address>,
        ratio: FeeRatio,
        min: Big,
        max: Big,
    },
}

impl Feeer {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Fixed { .. } => "fixed",
            Self::Ratio { .. } => "ratio",
        }
    }

    /// The account fees are settled to. `None` means fees are not collected.
    pub fn receiver(&self) -> Option<&Address> {
        match self {
            Self::Nil => None,
            Self::Fixed { receiver, .. } | Self::Ratio { receiver, .. } => receiver.as_ref(),
        }
    }

    /// The fee owed for moving `amount`. Never negative for a valid feeer; zero
    /// without a receiver.
    pub fn fee(&self, amount: &Big) -> Big {
        if self.receiver().is_none() {
            return Big::zero();
        }
        match self {
            Self::Nil => Big::zero(),
            Self::Fixed { amount: fixed, .. } => fixed.clone(),
            Self::Ratio { ratio, min, max, .. } => {
                amount.mul_div(ratio.ppb(), RATIO_DENOM).clamp_between(min, max)
            }
        }
    }

    pub fn validate(&self) -> Result<(), InvalidError> {
        match self {
            Self::Nil => Ok(()),
            Self::Fixed { receiver, amount } => {
                if let Some(receiver) = receiver {
                    validate_address(receiver)?;
                }
                if !amount.is_valid() {
                    return Err(InvalidError::Policy(format!("negative fixed fee {amount}")));
                }
                Ok(())
            }
            Self::Ratio {
                receiver,
                ratio,
                min,
                max,
            } => {
                if let Some(receiver) = receiver {
                    validate_address(receiver)?;
                }
                ratio.validate()?;
                if !min.is_valid() || !max.is_valid() {
                    return Err(InvalidError::Policy(format!(
                        "negative fee bound, min {min}, max {max}"
                    )));
                }
                if min > max {
                    return Err(InvalidError::Policy(format!("fee min {min} above max {max}")));
                }
                Ok(())
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = CanonicalBytes::new();
        out.put(self.kind().as_bytes());
        match self {
            Self::Nil => {}
            Self::Fixed { receiver, amount } => {
                out.put(&receiver_bytes(receiver.as_ref())).put(&amount.to_bytes());
            }
            Self::Ratio {
                receiver,
                ratio,
                min,
                max,
            } => {
                out.put(&receiver_bytes(receiver.as_ref()))
                    .put_u64(ratio.ppb())
                    .put(&min.to_bytes())
                    .put(&max.to_bytes());
            }
        }
        out.finish()
    }
}

/// Empty for an absent receiver; addresses are never empty.
fn receiver_bytes(receiver: Option<&Address>) -> Vec<u8> {
    receiver.map(Address::to_bytes).unwrap_or_default()
}

/// Per-currency rules: the minimum balance a newly created account must receive,
/// and the feeer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPolicy {
    new_account_min_balance: Big,
    feeer: Feeer,
}

impl CurrencyPolicy {
    pub fn new(new_account_min_balance: impl Into<Big>, feeer: Feeer) -> Self {
        Self {
            new_account_min_balance: new_account_min_balance.into(),
            feeer,
        }
    }

    pub fn new_account_min_balance(&self) -> &Big {
        &self.new_account_min_balance
    }

    pub fn feeer(&self) -> &Feeer {
        &self.feeer
    }

    pub fn validate(&self) -> Result<(), InvalidError> {
        if !self.new_account_min_balance.is_valid() {
            return Err(InvalidError::Policy(format!(
                "negative new account minimum balance {}",
                self.new_account_min_balance
            )));
        }
        self.feeer.validate()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        CanonicalBytes::new()
            .put(&self.new_account_min_balance.to_bytes())
            .put(&self.feeer.to_bytes())
            .finish()
    }
}

/// A registered currency: its genesis allocation and current policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDesign {
    amount: Amount,
    genesis_account: Address,
    policy: CurrencyPolicy,
}

impl CurrencyDesign {
    pub fn new(amount: Amount, genesis_account: Address, policy: CurrencyPolicy) -> Self {
        Self {
            amount,
            genesis_account,
            policy,
        }
    }

    pub fn currency(&self) -> &CurrencyId {
        self.amount.currency()
    }

    /// The genesis amount credited on registration.
    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn genesis_account(&self) -> &Address {
        &self.genesis_account
    }

    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }

    pub fn feeer(&self) -> &Feeer {
        self.policy.feeer()
    }

    /// A copy with `policy` in place of the current one. Genesis data is kept.
    pub fn with_policy(&self, policy: CurrencyPolicy) -> Self {
        Self {
            amount: self.amount.clone(),
            genesis_account: self.genesis_account.clone(),
            policy,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidError> {
        self.amount.validate_positive()?;
        validate_address(&self.genesis_account)?;
        self.policy.validate()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        CanonicalBytes::new()
            .put(&self.amount.to_bytes())
            .put(&self.genesis_account.to_bytes())
            .put(&self.policy.to_bytes())
            .finish()
    }
}
