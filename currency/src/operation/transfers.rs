//! Transfers: move amounts from one account to existing accounts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_types::{Address, FactHash};

use super::{fact_header, validate_item_amounts, validate_item_count, Fact, Hint, OperationKind, SignedOperation, HINT_VERSION};
use crate::amount::Amount;
use crate::canonical::{hex_bytes, CanonicalBytes};
use crate::error::InvalidError;
use crate::keys::validate_address;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransfersItem {
    receiver: Address,
    amounts: Vec<Amount>,
}

impl TransfersItem {
    pub fn new(receiver: Address, amounts: Vec<Amount>) -> Self {
        Self { receiver, amounts }
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }

    fn validate(&self) -> Result<(), InvalidError> {
        validate_address(&self.receiver)?;
        validate_item_amounts(&self.amounts)
    }

    fn to_bytes(&self) -> Vec<u8> {
        CanonicalBytes::new()
            .put(&self.receiver.to_bytes())
            .put_list(&self.amounts, Amount::to_bytes)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransfersFact {
    hash: FactHash,
    #[serde(with = "hex_bytes")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<TransfersItem>,
}

impl TransfersFact {
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<TransfersItem>) -> Self {
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

    pub fn items(&self) -> &[TransfersItem] {
        &self.items
    }
}

impl Fact for TransfersFact {
    const HINT: Hint = Hint::new("tally-currency-transfers-fact", HINT_VERSION);
    const KIND: OperationKind = OperationKind::Transfers;

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> FactHash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        fact_header(&self.token, Self::HINT)
            .put(&self.sender.to_bytes())
            .put_list(&self.items, TransfersItem::to_bytes)
            .finish()
    }

    fn validate_fields(&self) -> Result<(), InvalidError> {
        validate_address(&self.sender)?;
        validate_item_count(self.items.len())?;
        let mut receivers = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.validate()?;
            if item.receiver == self.sender {
                return Err(InvalidError::Items(format!(
                    "receiver {} is the sender",
                    item.receiver
                )));
            }
            if !receivers.insert(&item.receiver) {
                return Err(InvalidError::Items(format!(
                    "duplicate receiver {}",
                    item.receiver
                )));
            }
        }
        Ok(())
    }
}

pub type Transfers = SignedOperation<TransfersFact>;
