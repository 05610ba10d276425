use tally_store::{State, StateWriter};

use super::{BalanceChange, Context, Effects, Processor};
use crate::error::{PreProcessError, ProcessError};
use crate::operation::{FeeFact, FeeOperation};
use crate::state::read_account;

/// Credits each currency's collected fees to its fee receiver. Every failure here
/// is fatal: the amounts were already taken from payers during the pass.
#[derive(Clone, Debug)]
pub(crate) struct FeeProcessor;

impl Processor for FeeProcessor {
    type Fact = FeeFact;
    type Prepared = Vec<BalanceChange>;

    fn pre_process(
        &self,
        op: &FeeOperation,
        ctx: &mut Context<'_>,
    ) -> Result<Vec<BalanceChange>, PreProcessError> {
        let mut credits = Vec::new();
        for am in op.fact().amounts() {
            if am.big().is_zero() {
                continue;
            }
            let design = ctx.currency_design(am.currency())?.ok_or_else(|| {
                ProcessError::Inconsistent(format!("fee collected in unknown currency {}", am.currency()))
            })?;
            let Some(receiver) = design.feeer().receiver() else {
                tracing::debug!(currency = %am.currency(), amount = %am.big(), "no fee receiver, fee not credited");
                continue;
            };
            if read_account(ctx.reader(), receiver)?.is_none() {
                return Err(ProcessError::Inconsistent(format!(
                    "fee receiver {receiver} for {} does not exist",
                    am.currency()
                ))
                .into());
            }
            credits.push(ctx.credit(receiver, am.currency(), am.big())?);
        }
        Ok(credits)
    }

    fn process(
        &self,
        op: &FeeOperation,
        prepared: Vec<BalanceChange>,
        writer: &mut dyn StateWriter,
    ) -> Result<Effects, ProcessError> {
        let states = prepared
            .into_iter()
            .map(BalanceChange::into_state)
            .collect::<Result<Vec<State>, _>>()?;
        writer.set_state(&op.fact_hash(), states)?;
        Ok(Effects::default())
    }
}
