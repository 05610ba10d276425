use tally_store::{State, StateWriter};

use super::{Context, Effects, Processor};
use crate::error::{PreProcessError, ProcessError};
use crate::fee::CurrencyDesign;
use crate::operation::{CurrencyPolicyUpdater, CurrencyPolicyUpdaterFact};
use crate::sign::Suffrage;
use crate::state::{read_currency_design, StateValue};

#[derive(Clone, Debug)]
pub(crate) struct CurrencyPolicyUpdaterProcessor {
    pub(crate) suffrage: Suffrage,
}

pub(crate) struct Prepared {
    design_state: State,
    design: CurrencyDesign,
}

impl Processor for CurrencyPolicyUpdaterProcessor {
    type Fact = CurrencyPolicyUpdaterFact;
    type Prepared = Prepared;

    fn pre_process(
        &self,
        op: &CurrencyPolicyUpdater,
        ctx: &mut Context<'_>,
    ) -> Result<Prepared, PreProcessError> {
        ctx.check_suffrage_signs(&self.suffrage, op)?;

        let fact = op.fact();
        ctx.registered(fact.currency())?;
        let (design_state, current) = read_currency_design(ctx.reader(), fact.currency())?
            .ok_or_else(|| {
                ProcessError::Inconsistent(format!(
                    "currency {} is cached but has no design state",
                    fact.currency()
                ))
            })?;

        if let Some(receiver) = fact.policy().feeer().receiver() {
            ctx.require_account(receiver)?;
        }

        Ok(Prepared {
            design_state,
            design: current.with_policy(fact.policy().clone()),
        })
    }

    fn process(
        &self,
        op: &CurrencyPolicyUpdater,
        prepared: Prepared,
        writer: &mut dyn StateWriter,
    ) -> Result<Effects, ProcessError> {
        let state = StateValue::CurrencyDesign(prepared.design.clone()).into_state(&prepared.design_state)?;
        writer.set_state(&op.fact_hash(), vec![state])?;

        Ok(Effects {
            fees: Vec::new(),
            design: Some(prepared.design),
        })
    }
}
