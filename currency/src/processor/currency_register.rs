use tally_store::{State, StateWriter};

use super::{BalanceChange, Context, Effects, Processor};
use crate::error::{PreProcessError, ProcessError, ReasonError};
use crate::fee::CurrencyDesign;
use crate::operation::{CurrencyRegister, CurrencyRegisterFact};
use crate::sign::Suffrage;
use crate::state::{currency_design_key, StateValue};

#[derive(Clone, Debug)]
pub(crate) struct CurrencyRegisterProcessor {
    pub(crate) suffrage: Suffrage,
}

pub(crate) struct Prepared {
    design_state: State,
    genesis: BalanceChange,
}

impl Processor for CurrencyRegisterProcessor {
    type Fact = CurrencyRegisterFact;
    type Prepared = Prepared;

    fn pre_process(
        &self,
        op: &CurrencyRegister,
        ctx: &mut Context<'_>,
    ) -> Result<Prepared, PreProcessError> {
        ctx.check_suffrage_signs(&self.suffrage, op)?;

        let design = op.fact().currency();
        let cid = design.currency();
        if ctx.currency_design(cid)?.is_some() {
            return Err(ReasonError::DuplicateCurrency(cid.clone()).into());
        }
        let (design_state, found) = ctx.reader().get_state_or_empty(&currency_design_key(cid))?;
        if found {
            return Err(ReasonError::DuplicateCurrency(cid.clone()).into());
        }

        ctx.require_account(design.genesis_account())?;
        if let Some(receiver) = design.feeer().receiver() {
            ctx.require_account(receiver)?;
        }

        let genesis = ctx.credit(design.genesis_account(), cid, design.amount().big())?;
        Ok(Prepared {
            design_state,
            genesis,
        })
    }

    fn process(
        &self,
        op: &CurrencyRegister,
        prepared: Prepared,
        writer: &mut dyn StateWriter,
    ) -> Result<Effects, ProcessError> {
        let design: CurrencyDesign = op.fact().currency().clone();
        let states = vec![
            StateValue::CurrencyDesign(design.clone()).into_state(&prepared.design_state)?,
            prepared.genesis.into_state()?,
        ];
        writer.set_state(&op.fact_hash(), states)?;

        Ok(Effects {
            fees: Vec::new(),
            design: Some(design),
        })
    }
}
