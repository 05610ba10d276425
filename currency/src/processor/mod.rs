//! Two-phase operation processing.
//!
//! Each operation goes through `pre_process`, which reads state and decides whether
//! the operation may apply, then `process`, which writes every state it changes in
//! one `set_state` call. Business failures during `pre_process` reject just that
//! operation; anything else aborts the pass.
//!
//! A pass is driven by an [`OperationProcessor`] over a [`StatePool`], so operation
//! `i + 1` sees the writes of operation `i` while the committed store stays
//! untouched until the caller commits the pool's updates.

mod create_accounts;
mod currency_policy_updater;
mod currency_register;
mod fee;
mod key_updater;
mod transfers;

use std::collections::BTreeMap;

use tally_store::{State, StatePool, StateReader, StateWriter, UpdatedState};
use tally_types::{Address, Big, CurrencyId, NetworkId, OperationHash};

use crate::amount::Amount;
use crate::error::{PreProcessError, ProcessError, ReasonError, Rejection};
use crate::fee::CurrencyDesign;
use crate::keys::Account;
use crate::operation::{Fact, FeeFact, FeeOperation, Operation, SignedOperation};
use crate::pool::CurrencyPool;
use crate::sign::{check_fact_signs, Suffrage};
use crate::state::{read_account, read_balance, read_currency_design, StateValue};

use self::create_accounts::CreateAccountsProcessor;
use self::currency_policy_updater::CurrencyPolicyUpdaterProcessor;
use self::currency_register::CurrencyRegisterProcessor;
use self::fee::FeeProcessor;
use self::key_updater::KeyUpdaterProcessor;
use self::transfers::TransfersProcessor;

/// Per-kind processing. `Prepared` carries whatever `pre_process` loaded so that
/// `process` does not read again.
pub(crate) trait Processor {
    type Fact: Fact;
    type Prepared;

    fn pre_process(
        &self,
        op: &SignedOperation<Self::Fact>,
        ctx: &mut Context<'_>,
    ) -> Result<Self::Prepared, PreProcessError>;

    fn process(
        &self,
        op: &SignedOperation<Self::Fact>,
        prepared: Self::Prepared,
        writer: &mut dyn StateWriter,
    ) -> Result<Effects, ProcessError>;
}

/// What a committed operation leaves behind besides its state writes.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    /// Fees charged, at most one entry per currency.
    pub fees: Vec<Amount>,
    /// A currency design registered or updated.
    pub design: Option<CurrencyDesign>,
}

/// Read access handed to `pre_process`.
pub(crate) struct Context<'c> {
    reader: &'c dyn StateReader,
    currencies: Option<&'c mut CurrencyPool>,
    network_id: &'c NetworkId,
}

impl<'c> Context<'c> {
    pub(crate) fn new(
        reader: &'c dyn StateReader,
        currencies: Option<&'c mut CurrencyPool>,
        network_id: &'c NetworkId,
    ) -> Self {
        Self {
            reader,
            currencies,
            network_id,
        }
    }

    pub(crate) fn reader(&self) -> &'c dyn StateReader {
        self.reader
    }

    /// Look a currency up through the pool, or straight from state without one.
    pub(crate) fn currency_design(
        &mut self,
        currency: &CurrencyId,
    ) -> Result<Option<CurrencyDesign>, ProcessError> {
        match self.currencies.as_deref_mut() {
            Some(pool) => pool.design(self.reader, currency),
            None => Ok(read_currency_design(self.reader, currency)?.map(|(_, d)| d)),
        }
    }

    pub(crate) fn registered(&mut self, currency: &CurrencyId) -> Result<CurrencyDesign, PreProcessError> {
        self.currency_design(currency)?
            .ok_or_else(|| ReasonError::UnknownCurrency(currency.clone()).into())
    }

    pub(crate) fn existing_account(&self, address: &Address) -> Result<(State, Account), PreProcessError> {
        read_account(self.reader, address)?
            .ok_or_else(|| ReasonError::AccountNotFound(address.clone()).into())
    }

    pub(crate) fn require_account(&self, address: &Address) -> Result<(), PreProcessError> {
        self.existing_account(address).map(|_| ())
    }

    pub(crate) fn require_no_account(&self, address: &Address) -> Result<(), PreProcessError> {
        match read_account(self.reader, address)? {
            Some(_) => Err(ReasonError::AccountAlreadyExists(address.clone()).into()),
            None => Ok(()),
        }
    }

    /// The account's current keys must have signed the fact.
    pub(crate) fn check_account_signs<F: Fact>(
        &self,
        account: &Account,
        op: &SignedOperation<F>,
    ) -> Result<(), PreProcessError> {
        let keys = account.keys();
        check_fact_signs(
            &keys.required(),
            u64::from(keys.threshold()),
            op.signs(),
            &op.fact_hash(),
            self.network_id,
        )?;
        Ok(())
    }

    pub(crate) fn check_suffrage_signs<F: Fact>(
        &self,
        suffrage: &Suffrage,
        op: &SignedOperation<F>,
    ) -> Result<(), PreProcessError> {
        suffrage.check(op.signs(), &op.fact_hash(), self.network_id)?;
        Ok(())
    }

    /// Plan taking `total` from `address`'s balance; `InsufficientFunds` if short.
    pub(crate) fn debit(
        &self,
        address: &Address,
        currency: &CurrencyId,
        total: &Big,
    ) -> Result<BalanceChange, PreProcessError> {
        let (state, balance) = read_balance(self.reader, address, currency)?;
        if balance.big() < total {
            return Err(ReasonError::InsufficientFunds {
                address: address.clone(),
                currency: currency.clone(),
                balance: balance.big().clone(),
                required: total.clone(),
            }
            .into());
        }
        Ok(BalanceChange {
            state,
            balance,
            delta: &Big::zero() - total,
        })
    }

    /// Plan adding `amount` to `address`'s balance.
    pub(crate) fn credit(
        &self,
        address: &Address,
        currency: &CurrencyId,
        amount: &Big,
    ) -> Result<BalanceChange, ProcessError> {
        let (state, balance) = read_balance(self.reader, address, currency)?;
        Ok(BalanceChange {
            state,
            balance,
            delta: amount.clone(),
        })
    }
}

/// A planned change to one balance state.
#[derive(Debug)]
pub(crate) struct BalanceChange {
    state: State,
    balance: Amount,
    delta: Big,
}

impl BalanceChange {
    /// The next version of the balance state. Refuses to produce a negative balance.
    pub(crate) fn into_state(self) -> Result<State, ProcessError> {
        let next = self.balance.big() + &self.delta;
        if !next.is_valid() {
            return Err(ProcessError::Inconsistent(format!(
                "balance {} would become {next}",
                self.state.key()
            )));
        }
        StateValue::Balance(self.balance.with_big(next)).into_state(&self.state)
    }
}

/// Sums per currency: amounts moved plus the fee they incur.
#[derive(Debug, Default)]
pub(crate) struct Charges {
    totals: BTreeMap<CurrencyId, (Big, Big)>,
}

impl Charges {
    pub(crate) fn add(&mut self, currency: &CurrencyId, amount: &Big, fee: &Big) {
        let entry = self
            .totals
            .entry(currency.clone())
            .or_insert_with(|| (Big::zero(), Big::zero()));
        let moved = &entry.0 + amount;
        let fees = &entry.1 + fee;
        *entry = (moved, fees);
    }

    /// One debit per currency for `amount + fee`, checking affordability.
    pub(crate) fn debits(&self, ctx: &Context<'_>, payer: &Address) -> Result<Vec<BalanceChange>, PreProcessError> {
        self.totals
            .iter()
            .map(|(cid, (moved, fee))| ctx.debit(payer, cid, &(moved + fee)))
            .collect()
    }

    /// Non-zero fees per currency.
    pub(crate) fn fees(&self) -> Vec<Amount> {
        self.totals
            .iter()
            .filter(|(_, (_, fee))| fee.is_positive())
            .map(|(cid, (_, fee))| Amount::new(fee.clone(), cid.clone()))
            .collect()
    }
}

/// The processors available to a pass, fixed when the pass starts.
#[derive(Clone, Debug)]
pub struct ProcessorRegistry {
    network_id: NetworkId,
    create_accounts: Option<CreateAccountsProcessor>,
    transfers: Option<TransfersProcessor>,
    key_updater: Option<KeyUpdaterProcessor>,
    currency_register: Option<CurrencyRegisterProcessor>,
    currency_policy_updater: Option<CurrencyPolicyUpdaterProcessor>,
}

impl ProcessorRegistry {
    /// A registry that accepts nothing yet.
    pub fn new(network_id: NetworkId) -> Self {
        Self {
            network_id,
            create_accounts: None,
            transfers: None,
            key_updater: None,
            currency_register: None,
            currency_policy_updater: None,
        }
    }

    /// Every user-submitted kind, with `suffrage` as the operator authority.
    pub fn standard(network_id: NetworkId, suffrage: Suffrage) -> Self {
        Self::new(network_id)
            .with_create_accounts()
            .with_transfers()
            .with_key_updater()
            .with_currency_register(suffrage.clone())
            .with_currency_policy_updater(suffrage)
    }

    pub fn with_create_accounts(mut self) -> Self {
        self.create_accounts = Some(CreateAccountsProcessor);
        self
    }

    pub fn with_transfers(mut self) -> Self {
        self.transfers = Some(TransfersProcessor);
        self
    }

    pub fn with_key_updater(mut self) -> Self {
        self.key_updater = Some(KeyUpdaterProcessor);
        self
    }

    pub fn with_currency_register(mut self, suffrage: Suffrage) -> Self {
        self.currency_register = Some(CurrencyRegisterProcessor { suffrage });
        self
    }

    pub fn with_currency_policy_updater(mut self, suffrage: Suffrage) -> Self {
        self.currency_policy_updater = Some(CurrencyPolicyUpdaterProcessor { suffrage });
        self
    }

    pub fn network_id(&self) -> &NetworkId {
        &self.network_id
    }
}

/// Result of processing one operation that did not abort the pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    Applied,
    Rejected(Rejection),
}

/// Drives one block pass.
pub struct OperationProcessor<'a> {
    registry: &'a ProcessorRegistry,
    states: StatePool<'a>,
    currencies: Option<CurrencyPool>,
    fees: BTreeMap<CurrencyId, Big>,
}

impl<'a> OperationProcessor<'a> {
    pub fn new(registry: &'a ProcessorRegistry, base: &'a dyn StateReader) -> Self {
        Self {
            registry,
            states: StatePool::new(base),
            currencies: Some(CurrencyPool::new()),
            fees: BTreeMap::new(),
        }
    }

    /// Run without a currency cache; every currency lookup reads state.
    pub fn without_currency_pool(mut self) -> Self {
        self.currencies = None;
        self
    }

    pub fn process(&mut self, op: &Operation) -> Result<ProcessOutcome, ProcessError> {
        let registry = self.registry;
        match op {
            Operation::CreateAccounts(o) => self.run(registry.create_accounts.as_ref(), o),
            Operation::Transfers(o) => self.run(registry.transfers.as_ref(), o),
            Operation::KeyUpdater(o) => self.run(registry.key_updater.as_ref(), o),
            Operation::CurrencyRegister(o) => self.run(registry.currency_register.as_ref(), o),
            Operation::CurrencyPolicyUpdater(o) => {
                self.run(registry.currency_policy_updater.as_ref(), o)
            }
            // Settlement is produced by `close`, never submitted.
            Operation::Fee(o) => self.run(None::<&FeeProcessor>, o),
        }
    }

    fn run<P: Processor>(
        &mut self,
        processor: Option<&P>,
        op: &SignedOperation<P::Fact>,
    ) -> Result<ProcessOutcome, ProcessError> {
        let kind = <P::Fact as Fact>::KIND;
        let processor =
            processor.ok_or_else(|| ProcessError::UnsupportedOperation(kind.to_string()))?;

        if let Err(e) = op.validate() {
            if e.is_hash_mismatch() {
                return Err(ProcessError::HashMismatch {
                    operation: op.hash(),
                    source: e,
                });
            }
            return Ok(self.reject(op, ReasonError::InvalidFact(e)));
        }

        let prepared = {
            let mut ctx = Context::new(&self.states, self.currencies.as_mut(), &self.registry.network_id);
            match processor.pre_process(op, &mut ctx) {
                Ok(p) => p,
                Err(PreProcessError::Reason(reason)) => return Ok(self.reject(op, reason)),
                Err(PreProcessError::Fatal(e)) => return Err(e),
            }
        };

        let effects = processor.process(op, prepared, &mut self.states)?;
        for fee in effects.fees {
            let total = self.fees.entry(fee.currency().clone()).or_insert_with(Big::zero);
            let sum = &*total + fee.big();
            *total = sum;
        }
        if let (Some(design), Some(pool)) = (effects.design, self.currencies.as_mut()) {
            pool.set(design);
        }

        tracing::debug!(
            kind = %kind,
            operation = %op.hash(),
            fact = %op.fact_hash(),
            "operation applied"
        );
        Ok(ProcessOutcome::Applied)
    }

    fn reject<F: Fact>(&self, op: &SignedOperation<F>, reason: ReasonError) -> ProcessOutcome {
        tracing::info!(
            kind = %F::KIND,
            operation = %op.hash(),
            fact = %op.fact_hash(),
            reason = %reason,
            "operation rejected"
        );
        ProcessOutcome::Rejected(Rejection {
            operation: op.hash(),
            fact: op.fact_hash(),
            reason,
        })
    }

    /// Fees charged so far in this pass, per currency.
    pub fn pending_fees(&self) -> &BTreeMap<CurrencyId, Big> {
        &self.fees
    }

    /// Settle the pass's fees into the block's fee operation and process it.
    /// Returns `None` when nothing was charged.
    pub fn close(&mut self, height: u64) -> Result<Option<FeeOperation>, ProcessError> {
        let amounts: Vec<Amount> = std::mem::take(&mut self.fees)
            .into_iter()
            .filter(|(_, total)| total.is_positive())
            .map(|(cid, total)| Amount::new(total, cid))
            .collect();
        if amounts.is_empty() {
            return Ok(None);
        }

        let op = FeeOperation::new(FeeFact::for_height(height, amounts), "");
        match self.run(Some(&FeeProcessor), &op)? {
            ProcessOutcome::Applied => Ok(Some(op)),
            ProcessOutcome::Rejected(r) => Err(ProcessError::Inconsistent(format!(
                "fee settlement for height {height} rejected: {}",
                r.reason
            ))),
        }
    }

    pub fn updates(&self) -> impl Iterator<Item = &UpdatedState> {
        self.states.updates()
    }

    pub fn into_updates(self) -> Vec<UpdatedState> {
        self.states.into_updates()
    }
}

/// Everything a successful block pass produced.
#[derive(Clone, Debug)]
pub struct BlockReport {
    pub height: u64,
    pub applied: Vec<OperationHash>,
    pub rejected: Vec<Rejection>,
    pub fee: Option<FeeOperation>,
    /// States to commit, in key order.
    pub updates: Vec<UpdatedState>,
}

/// Process `ops` in order as block `height` and settle its fees.
///
/// On error nothing should be committed; the partial write-set is dropped.
pub fn process_block(
    registry: &ProcessorRegistry,
    base: &dyn StateReader,
    ops: &[Operation],
    height: u64,
) -> Result<BlockReport, ProcessError> {
    let mut processor = OperationProcessor::new(registry, base);
    let mut applied = Vec::new();
    let mut rejected = Vec::new();

    for op in ops {
        match processor.process(op) {
            Ok(ProcessOutcome::Applied) => applied.push(op.hash()),
            Ok(ProcessOutcome::Rejected(r)) => rejected.push(r),
            Err(e) => {
                tracing::warn!(
                    height,
                    operation = %op.hash(),
                    error = %e,
                    "block pass aborted"
                );
                return Err(e);
            }
        }
    }

    let fee = processor.close(height).map_err(|e| {
        tracing::error!(height, error = %e, "fee settlement failed");
        e
    })?;

    tracing::info!(
        height,
        applied = applied.len(),
        rejected = rejected.len(),
        "block processed"
    );
    Ok(BlockReport {
        height,
        applied,
        rejected,
        fee,
        updates: processor.into_updates(),
    })
}
