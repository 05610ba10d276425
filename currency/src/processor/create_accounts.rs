use tally_store::{State, StateWriter};

use super::{BalanceChange, Charges, Context, Effects, Processor};
use crate::error::{PreProcessError, ProcessError, ReasonError};
use crate::keys::Account;
use crate::operation::{CreateAccounts, CreateAccountsFact};
use crate::state::{account_key, StateValue};

#[derive(Clone, Debug)]
pub(crate) struct CreateAccountsProcessor;

pub(crate) struct Prepared {
    accounts: Vec<Account>,
    debits: Vec<BalanceChange>,
    credits: Vec<BalanceChange>,
    charges: Charges,
}

impl Processor for CreateAccountsProcessor {
    type Fact = CreateAccountsFact;
    type Prepared = Prepared;

    fn pre_process(
        &self,
        op: &CreateAccounts,
        ctx: &mut Context<'_>,
    ) -> Result<Prepared, PreProcessError> {
        let fact = op.fact();
        let (_, sender) = ctx.existing_account(fact.sender())?;
        ctx.check_account_signs(&sender, op)?;

        let mut charges = Charges::default();
        let mut accounts = Vec::with_capacity(fact.items().len());
        let mut credits = Vec::new();
        for item in fact.items() {
            let account = Account::from_keys(item.keys().clone());
            ctx.require_no_account(account.address())?;

            for am in item.amounts() {
                let design = ctx.registered(am.currency())?;
                let minimum = design.policy().new_account_min_balance();
                if am.big() < minimum {
                    return Err(ReasonError::BelowMinimumBalance {
                        address: account.address().clone(),
                        currency: am.currency().clone(),
                        amount: am.big().clone(),
                        minimum: minimum.clone(),
                    }
                    .into());
                }
                let fee = design.feeer().fee(am.big());
                charges.add(am.currency(), am.big(), &fee);
                credits.push(ctx.credit(account.address(), am.currency(), am.big())?);
            }
            accounts.push(account);
        }
        let debits = charges.debits(ctx, fact.sender())?;

        Ok(Prepared {
            accounts,
            debits,
            credits,
            charges,
        })
    }

    fn process(
        &self,
        op: &CreateAccounts,
        prepared: Prepared,
        writer: &mut dyn StateWriter,
    ) -> Result<Effects, ProcessError> {
        let mut states = Vec::with_capacity(
            prepared.accounts.len() + prepared.debits.len() + prepared.credits.len(),
        );
        for account in prepared.accounts {
            let empty = State::empty(account_key(account.address()));
            states.push(StateValue::Account(account).into_state(&empty)?);
        }
        for change in prepared.debits.into_iter().chain(prepared.credits) {
            states.push(change.into_state()?);
        }
        writer.set_state(&op.fact_hash(), states)?;

        Ok(Effects {
            fees: prepared.charges.fees(),
            design: None,
        })
    }
}
