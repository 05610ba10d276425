//! Block-scoped write-set.
//!
//! A [`StatePool`] overlays a committed [`StateReader`]. Reads fall through to the
//! base unless the pool already holds a newer version; writes are buffered and
//! attributed to the fact that caused them. Nothing reaches the base store: the
//! caller collects [`StatePool::updates`] at the end of the block and commits them.

use std::collections::{BTreeMap, HashSet};

use tally_types::FactHash;

use crate::{State, StateReader, StateWriter, StoreError};

/// The final version of one state plus every fact that wrote it during the pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdatedState {
    pub state: State,
    pub causes: Vec<FactHash>,
}

pub struct StatePool<'a> {
    base: &'a dyn StateReader,
    updated: BTreeMap<String, UpdatedState>,
}

impl<'a> StatePool<'a> {
    pub fn new(base: &'a dyn StateReader) -> Self {
        Self {
            base,
            updated: BTreeMap::new(),
        }
    }

    /// Accumulated updates, ordered by state key.
    pub fn updates(&self) -> impl Iterator<Item = &UpdatedState> {
        self.updated.values()
    }

    pub fn into_updates(self) -> Vec<UpdatedState> {
        self.updated.into_values().collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.updated.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
    }
}

impl StateReader for StatePool<'_> {
    fn get_state(&self, key: &str) -> Result<Option<State>, StoreError> {
        match self.updated.get(key) {
            Some(u) => Ok(Some(u.state.clone())),
            None => self.base.get_state(key),
        }
    }
}

impl StateWriter for StatePool<'_> {
    /// Every state must be exactly one version ahead of what the pool currently
    /// sees for its key, and a cause may not write the same key twice. The call is
    /// all-or-nothing.
    fn set_state(&mut self, cause: &FactHash, states: Vec<State>) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(states.len());
        for st in &states {
            if !seen.insert(st.key()) {
                return Err(StoreError::Duplicate {
                    key: st.key().to_string(),
                });
            }
            let current = self.get_state(st.key())?.map_or(0, |c| c.version());
            if st.version() != current + 1 {
                return Err(StoreError::Conflict {
                    key: st.key().to_string(),
                    expected: current + 1,
                    actual: st.version(),
                });
            }
        }

        for st in states {
            tracing::trace!(key = st.key(), version = st.version(), cause = %cause, "state staged");
            let entry = self
                .updated
                .entry(st.key().to_string())
                .or_insert_with(|| UpdatedState {
                    state: st.clone(),
                    causes: Vec::new(),
                });
            entry.state = st;
            entry.causes.push(*cause);
        }
        Ok(())
    }
}
