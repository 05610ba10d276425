//! Weighted key sets and accounts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_types::{Address, PublicKey};

use crate::canonical::CanonicalBytes;
use crate::error::InvalidError;
use crate::limits::{MAX_KEYS, MAX_KEY_WEIGHT, MAX_THRESHOLD, MIN_KEY_WEIGHT, MIN_THRESHOLD};

/// One public key and the weight its signature contributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    key: PublicKey,
    weight: u32,
}

impl Key {
    pub fn new(key: PublicKey, weight: u32) -> Self {
        Self { key, weight }
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn validate(&self) -> Result<(), InvalidError> {
        if !(MIN_KEY_WEIGHT..=MAX_KEY_WEIGHT).contains(&self.weight) {
            return Err(InvalidError::Keys(format!(
                "weight {} of {} out of range {}..={}",
                self.weight, self.key, MIN_KEY_WEIGHT, MAX_KEY_WEIGHT
            )));
        }
        Ok(())
    }

    fn to_bytes(&self) -> Vec<u8> {
        CanonicalBytes::new()
            .put(self.key.as_bytes())
            .put_u32(self.weight)
            .finish()
    }
}

/// The authority of an account: weighted keys and the weight needed to act.
///
/// Keys are held in ascending public-key order, so two sets with the same members
/// always encode, hash and derive to the same address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keys {
    keys: Vec<Key>,
    threshold: u32,
}

impl Keys {
    /// Build a key set, checking structure (count, duplicates, ranges). Whether the
    /// weights can reach the threshold is left to [`Keys::validate`].
    pub fn new(mut keys: Vec<Key>, threshold: u32) -> Result<Self, InvalidError> {
        keys.sort_by(|a, b| a.key.cmp(&b.key));
        let ks = Self { keys, threshold };
        ks.validate_structure()?;
        Ok(ks)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn total_weight(&self) -> u64 {
        self.keys.iter().map(|k| u64::from(k.weight)).sum()
    }

    /// `(public key, weight)` pairs as consumed by the signature verifier.
    pub fn required(&self) -> Vec<(PublicKey, u32)> {
        self.keys.iter().map(|k| (k.key.clone(), k.weight)).collect()
    }

    fn validate_structure(&self) -> Result<(), InvalidError> {
        if self.keys.is_empty() || self.keys.len() > MAX_KEYS {
            return Err(InvalidError::Keys(format!(
                "{} keys, expected 1..={}",
                self.keys.len(),
                MAX_KEYS
            )));
        }
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&self.threshold) {
            return Err(InvalidError::Keys(format!(
                "threshold {} out of range {}..={}",
                self.threshold, MIN_THRESHOLD, MAX_THRESHOLD
            )));
        }
        let mut seen = HashSet::with_capacity(self.keys.len());
        for k in &self.keys {
            k.validate()?;
            if !seen.insert(&k.key) {
                return Err(InvalidError::Keys(format!("duplicate key {}", k.key)));
            }
        }
        Ok(())
    }

    /// Full validity: structure plus `sum(weights) >= threshold`.
    pub fn validate(&self) -> Result<(), InvalidError> {
        self.validate_structure()?;
        if self.total_weight() < u64::from(self.threshold) {
            return Err(InvalidError::Keys(format!(
                "total weight {} below threshold {}",
                self.total_weight(),
                self.threshold
            )));
        }
        Ok(())
    }

    /// Same members, weights and threshold, regardless of stored order.
    pub fn same_as(&self, other: &Keys) -> bool {
        self.to_bytes() == other.to_bytes()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut sorted: Vec<&Key> = self.keys.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        let mut out = CanonicalBytes::new();
        out.put_u32(sorted.len() as u32);
        for k in sorted {
            out.put(&k.to_bytes());
        }
        out.put_u32(self.threshold).finish()
    }

    pub fn hash(&self) -> [u8; 32] {
        tally_crypto::blake2b_256(&self.to_bytes())
    }

    /// The address an account owning exactly these keys is created under.
    pub fn address(&self) -> Address {
        tally_crypto::derive_address(&self.hash())
    }
}

/// An account: its address and current key set. The address is fixed at creation;
/// the keys may later be replaced by a key update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    address: Address,
    keys: Keys,
}

impl Account {
    pub fn new(address: Address, keys: Keys) -> Self {
        Self { address, keys }
    }

    pub fn from_keys(keys: Keys) -> Self {
        Self::new(keys.address(), keys)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn with_keys(&self, keys: Keys) -> Self {
        Self::new(self.address.clone(), keys)
    }

    pub fn validate(&self) -> Result<(), InvalidError> {
        validate_address(&self.address)?;
        self.keys.validate()
    }
}

pub(crate) fn validate_address(address: &Address) -> Result<(), InvalidError> {
    if !tally_crypto::validate_address(address.as_str()) {
        return Err(InvalidError::Address(address.to_string()));
    }
    Ok(())
}
