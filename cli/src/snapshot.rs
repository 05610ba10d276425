//! JSON form of committed state, as read and written by `tally process`, and the
//! in-memory state a replayed block runs against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tally_currency::{ProcessError, StateValue};
use tally_store::{State, StateReader, StoreError, UpdatedState};

/// One state with its value decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub key: String,
    pub version: u64,
    pub value: StateValue,
}

impl StateEntry {
    pub fn from_state(state: &State) -> Result<Self, ProcessError> {
        Ok(Self {
            key: state.key().to_string(),
            version: state.version(),
            value: StateValue::decode(state)?,
        })
    }

    pub fn into_state(self) -> Result<State, ProcessError> {
        Ok(State::from_parts(self.key, self.value.encode()?, self.version))
    }
}

/// State loaded from a snapshot file, kept in key order.
#[derive(Debug, Default)]
pub struct SnapshotState {
    states: BTreeMap<String, State>,
}

impl SnapshotState {
    /// Load `entries`; a key may appear only once.
    pub fn from_entries(entries: Vec<StateEntry>) -> Result<Self, ProcessError> {
        let mut states = BTreeMap::new();
        for entry in entries {
            let state = entry.into_state()?;
            let key = state.key().to_string();
            if states.insert(key.clone(), state).is_some() {
                return Err(StoreError::Duplicate { key }.into());
            }
        }
        Ok(Self { states })
    }

    /// Apply a finished pass's updates. Versions were checked by the pass.
    pub fn apply(&mut self, updates: Vec<UpdatedState>) {
        for update in updates {
            self.states.insert(update.state.key().to_string(), update.state);
        }
    }

    pub fn to_entries(&self) -> Result<Vec<StateEntry>, ProcessError> {
        self.states.values().map(StateEntry::from_state).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateReader for SnapshotState {
    fn get_state(&self, key: &str) -> Result<Option<State>, StoreError> {
        Ok(self.states.get(key).cloned())
    }
}
