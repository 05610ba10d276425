use tally_store::{State, StateWriter};

use super::{BalanceChange, Charges, Context, Effects, Processor};
use crate::error::{PreProcessError, ProcessError};
use crate::operation::{Transfers, TransfersFact};

#[derive(Clone, Debug)]
pub(crate) struct TransfersProcessor;

pub(crate) struct Prepared {
    debits: Vec<BalanceChange>,
    credits: Vec<BalanceChange>,
    charges: Charges,
}

impl Processor for TransfersProcessor {
    type Fact = TransfersFact;
    type Prepared = Prepared;

    fn pre_process(&self, op: &Transfers, ctx: &mut Context<'_>) -> Result<Prepared, PreProcessError> {
        let fact = op.fact();
        let (_, sender) = ctx.existing_account(fact.sender())?;
        ctx.check_account_signs(&sender, op)?;

        let mut charges = Charges::default();
        let mut credits = Vec::new();
        for item in fact.items() {
            ctx.require_account(item.receiver())?;
            for am in item.amounts() {
                let design = ctx.registered(am.currency())?;
                let fee = design.feeer().fee(am.big());
                charges.add(am.currency(), am.big(), &fee);
                credits.push(ctx.credit(item.receiver(), am.currency(), am.big())?);
            }
        }
        let debits = charges.debits(ctx, fact.sender())?;

        Ok(Prepared {
            debits,
            credits,
            charges,
        })
    }

    fn process(
        &self,
        op: &Transfers,
        prepared: Prepared,
        writer: &mut dyn StateWriter,
    ) -> Result<Effects, ProcessError> {
        let states = prepared
            .debits
            .into_iter()
            .chain(prepared.credits)
            .map(BalanceChange::into_state)
            .collect::<Result<Vec<State>, _>>()?;
        writer.set_state(&op.fact_hash(), states)?;

        Ok(Effects {
            fees: prepared.charges.fees(),
            design: None,
        })
    }
}
