use tally_store::{State, StateWriter};
use tally_types::Big;

use super::{BalanceChange, Context, Effects, Processor};
use crate::amount::Amount;
use crate::error::{InvalidError, PreProcessError, ProcessError};
use crate::keys::Account;
use crate::operation::{KeyUpdater, KeyUpdaterFact};
use crate::state::StateValue;

#[derive(Clone, Debug)]
pub(crate) struct KeyUpdaterProcessor;

pub(crate) struct Prepared {
    account_state: State,
    account: Account,
    fee: Amount,
    debit: Option<BalanceChange>,
}

impl Processor for KeyUpdaterProcessor {
    type Fact = KeyUpdaterFact;
    type Prepared = Prepared;

    fn pre_process(&self, op: &KeyUpdater, ctx: &mut Context<'_>) -> Result<Prepared, PreProcessError> {
        let fact = op.fact();
        let (account_state, account) = ctx.existing_account(fact.target())?;
        ctx.check_account_signs(&account, op)?;

        if fact.keys().same_as(account.keys()) {
            return Err(InvalidError::Keys("new keys are the current keys".into()).into());
        }

        let design = ctx.registered(fact.currency())?;
        let fee = design.feeer().fee(&Big::zero());
        let debit = if fee.is_positive() {
            Some(ctx.debit(fact.target(), fact.currency(), &fee)?)
        } else {
            None
        };

        Ok(Prepared {
            account_state,
            account: account.with_keys(fact.keys().clone()),
            fee: Amount::new(fee, fact.currency().clone()),
            debit,
        })
    }

    fn process(
        &self,
        op: &KeyUpdater,
        prepared: Prepared,
        writer: &mut dyn StateWriter,
    ) -> Result<Effects, ProcessError> {
        let mut states = vec![StateValue::Account(prepared.account).into_state(&prepared.account_state)?];
        if let Some(debit) = prepared.debit {
            states.push(debit.into_state()?);
        }
        writer.set_state(&op.fact_hash(), states)?;

        let fees = if prepared.fee.big().is_positive() {
            vec![prepared.fee]
        } else {
            Vec::new()
        };
        Ok(Effects { fees, design: None })
    }
}
