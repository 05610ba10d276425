//! State-store contract for the Tally ledger.
//!
//! The engine never touches storage directly. It reads through [`StateReader`]
//! (`getState`) and proposes writes through [`StateWriter`] (`setState`). Backends
//! implement the reader; a block-processing pass wraps the committed backend in a
//! [`StatePool`], which collects the pass's writes so the caller can commit them
//! atomically once the whole block has been processed.

pub mod error;
pub mod pool;
pub mod state;

pub use error::StoreError;
pub use pool::{StatePool, UpdatedState};
pub use state::State;

use tally_types::FactHash;

/// Read access to versioned states (`getState`).
pub trait StateReader {
    /// Fetch the state stored under `key`, or `None` when nothing was ever written.
    fn get_state(&self, key: &str) -> Result<Option<State>, StoreError>;

    /// Fetch the state under `key`, or an empty version-0 state when absent.
    fn get_state_or_empty(&self, key: &str) -> Result<(State, bool), StoreError> {
        Ok(match self.get_state(key)? {
            Some(st) => (st, true),
            None => (State::empty(key), false),
        })
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.get_state(key).map(|st| st.is_some())
    }
}

/// Write access (`setState`). Writers are also readers so that a processor sees its
/// own earlier writes.
pub trait StateWriter: StateReader {
    /// Record the complete set of states touched by the fact `cause`.
    fn set_state(&mut self, cause: &FactHash, states: Vec<State>) -> Result<(), StoreError>;
}
