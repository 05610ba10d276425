//! Per-pass cache of currency designs.

use std::collections::HashMap;

use tally_store::StateReader;
use tally_types::CurrencyId;

use crate::error::ProcessError;
use crate::fee::{CurrencyDesign, Feeer};
use crate::state::read_currency_design;

/// Read-through cache `CurrencyId -> CurrencyDesign`, owned by one block pass.
///
/// A miss costs one state read; a hit is remembered for the rest of the pass.
/// Unknown currencies are not cached, so a currency registered mid-pass is picked
/// up once [`CurrencyPool::set`] has been called for it.
#[derive(Debug, Default)]
pub struct CurrencyPool {
    designs: HashMap<CurrencyId, CurrencyDesign>,
}

impl CurrencyPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn design(
        &mut self,
        reader: &dyn StateReader,
        currency: &CurrencyId,
    ) -> Result<Option<CurrencyDesign>, ProcessError> {
        if let Some(d) = self.designs.get(currency) {
            return Ok(Some(d.clone()));
        }
        tracing::debug!(currency = %currency, "currency pool miss");
        match read_currency_design(reader, currency)? {
            Some((_, design)) => {
                self.designs.insert(currency.clone(), design.clone());
                Ok(Some(design))
            }
            None => Ok(None),
        }
    }

    pub fn exists(
        &mut self,
        reader: &dyn StateReader,
        currency: &CurrencyId,
    ) -> Result<bool, ProcessError> {
        Ok(self.design(reader, currency)?.is_some())
    }

    pub fn feeer(
        &mut self,
        reader: &dyn StateReader,
        currency: &CurrencyId,
    ) -> Result<Option<Feeer>, ProcessError> {
        Ok(self
            .design(reader, currency)?
            .map(|d| d.feeer().clone()))
    }

    /// Replace the cached design after a committed registration or policy update.
    pub fn set(&mut self, design: CurrencyDesign) {
        self.designs.insert(design.currency().clone(), design);
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::fee::CurrencyPolicy;
    use crate::keys::{Key, Keys};
    use crate::state::{currency_design_key, StateValue};
    use std::cell::Cell;
    use tally_store::{State, StoreError};
    use tally_types::PublicKey;

    struct CountingReader {
        state: Option<State>,
        reads: Cell<usize>,
    }

    impl StateReader for CountingReader {
        fn get_state(&self, _key: &str) -> Result<Option<State>, StoreError> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.state.clone())
        }
    }

    fn design(cid: &str) -> CurrencyDesign {
        let genesis = Keys::new(vec![Key::new(PublicKey([1; 32]), 100)], 100)
            .unwrap()
            .address();
        CurrencyDesign::new(
            Amount::new(10u64, CurrencyId::new(cid)),
            genesis,
            CurrencyPolicy::new(0u64, Feeer::Nil),
        )
    }

    #[test]
    fn hit_is_cached_after_one_read() {
        let d = design("MCC");
        let st = StateValue::CurrencyDesign(d.clone())
            .into_state(&State::empty(currency_design_key(d.currency())))
            .unwrap();
        let reader = CountingReader {
            state: Some(st),
            reads: Cell::new(0),
        };
        let mut pool = CurrencyPool::new();
        let cid = CurrencyId::new("MCC");
        assert_eq!(pool.design(&reader, &cid).unwrap(), Some(d));
        assert!(pool.exists(&reader, &cid).unwrap());
        assert_eq!(pool.feeer(&reader, &cid).unwrap(), Some(Feeer::Nil));
        assert_eq!(reader.reads.get(), 1);
    }

    #[test]
    fn miss_is_not_cached() {
        let reader = CountingReader {
            state: None,
            reads: Cell::new(0),
        };
        let mut pool = CurrencyPool::new();
        let cid = CurrencyId::new("NOPE");
        assert!(!pool.exists(&reader, &cid).unwrap());
        assert!(!pool.exists(&reader, &cid).unwrap());
        assert_eq!(reader.reads.get(), 2);

        pool.set(design("NOPE"));
        assert!(pool.exists(&reader, &cid).unwrap());
        assert_eq!(reader.reads.get(), 2);
    }
}
