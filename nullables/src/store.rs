//! Nullable store: thread-safe in-memory committed state for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use tally_store::{State, StateReader, StoreError, UpdatedState};

/// The committed state of a ledger, held in memory.
///
/// Block passes read it through [`StateReader`]; their updates land only through
/// [`MemoryStateStore::commit`].
#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, State>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_states(states: impl IntoIterator<Item = State>) -> Self {
        Self {
            states: Mutex::new(
                states
                    .into_iter()
                    .map(|st| (st.key().to_string(), st))
                    .collect(),
            ),
        }
    }

    /// Put a state in place directly, e.g. to seed a genesis account.
    pub fn insert(&self, state: State) -> Result<(), StoreError> {
        self.lock()?.insert(state.key().to_string(), state);
        Ok(())
    }

    /// Apply a pass's updates atomically. Every update must move its state to a
    /// newer version than the one committed.
    pub fn commit(&self, updates: &[UpdatedState]) -> Result<(), StoreError> {
        let mut states = self.lock()?;
        for u in updates {
            let current = states.get(u.state.key()).map_or(0, State::version);
            if u.state.version() <= current {
                return Err(StoreError::Conflict {
                    key: u.state.key().to_string(),
                    expected: current + 1,
                    actual: u.state.version(),
                });
            }
        }
        for u in updates {
            states.insert(u.state.key().to_string(), u.state.clone());
        }
        Ok(())
    }

    /// All committed states in key order.
    pub fn snapshot(&self) -> Result<Vec<State>, StoreError> {
        let mut all: Vec<State> = self.lock()?.values().cloned().collect();
        all.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(all)
    }

    pub fn len(&self) -> usize {
        self.lock().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, State>>, StoreError> {
        self.states
            .lock()
            .map_err(|_| StoreError::Backend("state map lock poisoned".into()))
    }
}

impl StateReader for MemoryStateStore {
    fn get_state(&self, key: &str) -> Result<Option<State>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::{StatePool, StateWriter};
    use tally_types::FactHash;

    #[test]
    fn commit_applies_pool_updates() {
        let store = MemoryStateStore::new();
        store.insert(State::from_parts("a", vec![1], 1)).unwrap();

        let updates = {
            let mut pool = StatePool::new(&store);
            let a = pool.get_state("a").unwrap().unwrap();
            pool.set_state(&FactHash::new([1; 32]), vec![a.with_value(vec![2]), State::empty("b").with_value(vec![3])])
                .unwrap();
            pool.into_updates()
        };
        store.commit(&updates).unwrap();

        assert_eq!(store.get_state("a").unwrap().unwrap().version(), 2);
        assert_eq!(store.get_state("b").unwrap().unwrap().value(), &[3]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn stale_commit_is_refused_whole() {
        let store = MemoryStateStore::new();
        store.insert(State::from_parts("a", vec![1], 3)).unwrap();
        let updates = vec![
            UpdatedState {
                state: State::from_parts("b", vec![], 1),
                causes: vec![],
            },
            UpdatedState {
                state: State::from_parts("a", vec![9], 2),
                causes: vec![],
            },
        ];
        assert!(matches!(store.commit(&updates), Err(StoreError::Conflict { .. })));
        assert!(store.get_state("b").unwrap().is_none());
    }

    #[test]
    fn snapshot_is_sorted() {
        let store = MemoryStateStore::from_states([
            State::from_parts("z", vec![], 1),
            State::from_parts("m", vec![], 1),
        ]);
        let keys: Vec<_> = store.snapshot().unwrap().iter().map(|s| s.key().to_string()).collect();
        assert_eq!(keys, vec!["m", "z"]);
    }
}
