//! CreateAccounts: fund brand-new accounts whose addresses derive from their keys.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_types::{Address, FactHash};

use super::{fact_header, validate_item_amounts, validate_item_count, Fact, Hint, OperationKind, SignedOperation, HINT_VERSION};
use crate::amount::Amount;
use crate::canonical::{hex_bytes, CanonicalBytes};
use crate::error::InvalidError;
use crate::keys::{validate_address, Keys};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountsItem {
    keys: Keys,
    amounts: Vec<Amount>,
}

impl CreateAccountsItem {
    pub fn new(keys: Keys, amounts: Vec<Amount>) -> Self {
        Self { keys, amounts }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }

    /// The address the new account is created under.
    pub fn address(&self) -> Address {
        self.keys.address()
    }

    fn validate(&self) -> Result<(), InvalidError> {
        self.keys.validate()?;
        validate_item_amounts(&self.amounts)
    }

    fn to_bytes(&self) -> Vec<u8> {
        CanonicalBytes::new()
            .put(&self.keys.to_bytes())
            .put_list(&self.amounts, Amount::to_bytes)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountsFact {
    hash: FactHash,
    #[serde(with = "hex_bytes")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<CreateAccountsItem>,
}

impl CreateAccountsFact {
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<CreateAccountsItem>) -> Self {
        let mut fact = Self {
            hash: FactHash::ZERO,
            token: token.into(),
            sender,
            items,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn items(&self) -> &[CreateAccountsItem] {
        &self.items
    }

    /// Addresses of the accounts this fact creates, in item order.
    pub fn targets(&self) -> Vec<Address> {
        self.items.iter().map(CreateAccountsItem::address).collect()
    }
}

impl Fact for CreateAccountsFact {
    const HINT: Hint = Hint::new("tally-currency-create-accounts-fact", HINT_VERSION);
    const KIND: OperationKind = OperationKind::CreateAccounts;

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> FactHash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        fact_header(&self.token, Self::HINT)
            .put(&self.sender.to_bytes())
            .put_list(&self.items, CreateAccountsItem::to_bytes)
            .finish()
    }

    fn validate_fields(&self) -> Result<(), InvalidError> {
        validate_address(&self.sender)?;
        validate_item_count(self.items.len())?;
        let mut targets = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.validate()?;
            let target = item.address();
            if target == self.sender {
                return Err(InvalidError::Items(format!("target {target} is the sender")));
            }
            if !targets.insert(target.clone()) {
                return Err(InvalidError::Items(format!("duplicate target {target}")));
            }
        }
        Ok(())
    }
}

pub type CreateAccounts = SignedOperation<CreateAccountsFact>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use tally_types::{CurrencyId, PublicKey};

    fn keys(b: u8) -> Keys {
        Keys::new(vec![Key::new(PublicKey([b; 32]), 100)], 100).unwrap()
    }

    fn mcc(v: u64) -> Amount {
        Amount::new(v, CurrencyId::new("MCC"))
    }

    #[test]
    fn targets_derive_from_keys() {
        let fact = CreateAccountsFact::new(
            b"t".to_vec(),
            keys(1).address(),
            vec![CreateAccountsItem::new(keys(2), vec![mcc(5)])],
        );
        assert_eq!(fact.validate(), Ok(()));
        assert_eq!(fact.targets(), vec![keys(2).address()]);
    }

    #[test]
    fn same_keys_twice_is_duplicate_target() {
        let fact = CreateAccountsFact::new(
            b"t".to_vec(),
            keys(1).address(),
            vec![
                CreateAccountsItem::new(keys(2), vec![mcc(5)]),
                CreateAccountsItem::new(keys(2), vec![mcc(6)]),
            ],
        );
        assert!(matches!(fact.validate(), Err(InvalidError::Items(_))));
    }

    #[test]
    fn unusable_keys_rejected() {
        let weak = Keys::new(vec![Key::new(PublicKey([2; 32]), 10)], 50).unwrap();
        let fact = CreateAccountsFact::new(
            b"t".to_vec(),
            keys(1).address(),
            vec![CreateAccountsItem::new(weak, vec![mcc(5)])],
        );
        assert!(matches!(fact.validate(), Err(InvalidError::Keys(_))));
    }

    #[test]
    fn at_most_ten_amounts_per_item() {
        let amounts = (0..11)
            .map(|i| Amount::new(1u64, CurrencyId::new(format!("CC{i}"))))
            .collect();
        let fact = CreateAccountsFact::new(
            b"t".to_vec(),
            keys(1).address(),
            vec![CreateAccountsItem::new(keys(2), amounts)],
        );
        assert!(matches!(fact.validate(), Err(InvalidError::Items(_))));
    }
}
