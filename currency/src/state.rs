//! State keys and the encoding of values the engine stores.
//!
//! | Key | Value |
//! |---|---|
//! | `balance:<address>:<currency>` | [`Amount`] |
//! | `account:<address>` | [`Account`] |
//! | `currency-design:<currency>` | [`CurrencyDesign`] |

use serde::{Deserialize, Serialize};
use tally_store::{State, StateReader};
use tally_types::{Address, CurrencyId};

use crate::amount::Amount;
use crate::error::ProcessError;
use crate::fee::CurrencyDesign;
use crate::keys::Account;

pub fn balance_key(address: &Address, currency: &CurrencyId) -> String {
    format!("balance:{address}:{currency}")
}

pub fn account_key(address: &Address) -> String {
    format!("account:{address}")
}

pub fn currency_design_key(currency: &CurrencyId) -> String {
    format!("currency-design:{currency}")
}

/// Everything the engine writes into a [`State`] value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateValue {
    Balance(Amount),
    Account(Account),
    CurrencyDesign(CurrencyDesign),
}

impl StateValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Balance(_) => "balance",
            Self::Account(_) => "account",
            Self::CurrencyDesign(_) => "currency design",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProcessError> {
        bincode::serialize(self).map_err(|e| ProcessError::Encode {
            kind: self.kind(),
            reason: e.to_string(),
        })
    }

    pub fn decode(state: &State) -> Result<Self, ProcessError> {
        bincode::deserialize(state.value()).map_err(|e| ProcessError::Decode {
            key: state.key().to_string(),
            reason: e.to_string(),
        })
    }

    /// The next version of `state` holding this value.
    pub fn into_state(self, state: &State) -> Result<State, ProcessError> {
        Ok(state.with_value(self.encode()?))
    }
}

fn unexpected(state: &State, want: &str) -> ProcessError {
    ProcessError::Inconsistent(format!("state {} does not hold {want}", state.key()))
}

pub fn decode_balance(state: &State) -> Result<Amount, ProcessError> {
    match StateValue::decode(state)? {
        StateValue::Balance(a) => Ok(a),
        _ => Err(unexpected(state, "a balance")),
    }
}

pub fn decode_account(state: &State) -> Result<Account, ProcessError> {
    match StateValue::decode(state)? {
        StateValue::Account(a) => Ok(a),
        _ => Err(unexpected(state, "an account")),
    }
}

pub fn decode_currency_design(state: &State) -> Result<CurrencyDesign, ProcessError> {
    match StateValue::decode(state)? {
        StateValue::CurrencyDesign(d) => Ok(d),
        _ => Err(unexpected(state, "a currency design")),
    }
}

/// Read an account; `None` when it does not exist.
pub fn read_account(
    reader: &dyn StateReader,
    address: &Address,
) -> Result<Option<(State, Account)>, ProcessError> {
    match reader.get_state(&account_key(address))? {
        Some(st) => {
            let acc = decode_account(&st)?;
            Ok(Some((st, acc)))
        }
        None => Ok(None),
    }
}

/// Read a balance. A missing balance reads as zero with an empty (version 0) state,
/// ready to be written as the first version.
pub fn read_balance(
    reader: &dyn StateReader,
    address: &Address,
    currency: &CurrencyId,
) -> Result<(State, Amount), ProcessError> {
    let (st, found) = reader.get_state_or_empty(&balance_key(address, currency))?;
    if !found {
        return Ok((st, Amount::zero(currency.clone())));
    }
    let amount = decode_balance(&st)?;
    if amount.currency() != currency {
        return Err(ProcessError::Inconsistent(format!(
            "balance state {} holds currency {}",
            st.key(),
            amount.currency()
        )));
    }
    Ok((st, amount))
}

pub fn read_currency_design(
    reader: &dyn StateReader,
    currency: &CurrencyId,
) -> Result<Option<(State, CurrencyDesign)>, ProcessError> {
    match reader.get_state(&currency_design_key(currency))? {
        Some(st) => {
            let design = decode_currency_design(&st)?;
            Ok(Some((st, design)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, Keys};
    use tally_types::PublicKey;

    #[test]
    fn key_layout() {
        let addr = Address::new("tly_abc");
        let cid = CurrencyId::new("MCC");
        assert_eq!(balance_key(&addr, &cid), "balance:tly_abc:MCC");
        assert_eq!(account_key(&addr), "account:tly_abc");
        assert_eq!(currency_design_key(&cid), "currency-design:MCC");
    }

    #[test]
    fn value_roundtrips_through_state() {
        let keys = Keys::new(vec![Key::new(PublicKey([4; 32]), 100)], 100).unwrap();
        let acc = Account::from_keys(keys);
        let st = StateValue::Account(acc.clone())
            .into_state(&State::empty(account_key(acc.address())))
            .unwrap();
        assert_eq!(st.version(), 1);
        assert_eq!(decode_account(&st).unwrap(), acc);
        assert!(matches!(
            decode_balance(&st),
            Err(ProcessError::Inconsistent(_))
        ));
    }

    #[test]
    fn encode_failure_names_the_value_kind() {
        let value = StateValue::Balance(Amount::new(1u64, CurrencyId::new("MCC")));
        assert_eq!(value.kind(), "balance");
        let err = ProcessError::Encode {
            kind: value.kind(),
            reason: "sink full".into(),
        };
        assert_eq!(err.to_string(), "failed to encode balance state value: sink full");
    }

    #[test]
    fn garbage_value_is_decode_error() {
        let st = State::from_parts("account:x", vec![0xff; 3], 1);
        assert!(matches!(
            StateValue::decode(&st),
            Err(ProcessError::Decode { .. })
        ));
    }
}
