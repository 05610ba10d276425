//! Versioned state values.

use serde::{Deserialize, Serialize};

/// An opaque versioned value addressed by a string key.
///
/// The value bytes are owned by whoever interprets them (the currency engine stores
/// bincode-encoded balances, accounts and currency designs). A state that has never
/// been written has version 0; every write yields a new state one version higher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    key: String,
    value: Vec<u8>,
    version: u64,
}

impl State {
    /// The placeholder returned for a key that does not exist yet.
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Vec::new(),
            version: 0,
        }
    }

    /// Rebuild a stored state, e.g. when loading a snapshot.
    pub fn from_parts(key: impl Into<String>, value: Vec<u8>, version: u64) -> Self {
        Self {
            key: key.into(),
            value,
            version,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.version == 0
    }

    /// The next version of this state carrying `value`. `self` is left untouched.
    pub fn with_value(&self, value: Vec<u8>) -> Self {
        Self {
            key: self.key.clone(),
            value,
            version: self.version + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_has_version_zero() {
        let st = State::empty("account:x");
        assert!(st.is_empty());
        assert_eq!(st.version(), 0);
        assert!(st.value().is_empty());
    }

    #[test]
    fn with_value_bumps_version_and_keeps_original() {
        let st = State::empty("balance:x:MCC");
        let next = st.with_value(vec![1, 2, 3]);
        assert_eq!(next.version(), 1);
        assert_eq!(next.key(), "balance:x:MCC");
        assert_eq!(st.version(), 0);
        assert_eq!(next.with_value(vec![4]).version(), 2);
    }
}
