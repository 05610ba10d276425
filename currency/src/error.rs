use tally_store::StoreError;
use tally_types::{Address, Big, CurrencyId, FactHash, OperationHash};
use thiserror::Error;

/// A structural fault in a fact, operation or one of their values. Detected without
/// reading any state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidError {
    #[error("invalid token: {0}")]
    Token(String),

    #[error("memo too long: {len} bytes, max {max}")]
    MemoTooLong { len: usize, max: usize },

    #[error("invalid items: {0}")]
    Items(String),

    #[error("invalid amount: {0}")]
    Amount(String),

    #[error("invalid address: {0}")]
    Address(String),

    #[error("invalid currency id: {0}")]
    Currency(String),

    #[error("invalid keys: {0}")]
    Keys(String),

    #[error("invalid currency policy: {0}")]
    Policy(String),

    #[error("invalid signs: {0}")]
    Signs(String),

    #[error("fact hash does not match its contents")]
    FactHashMismatch,

    #[error("operation hash does not match its contents")]
    OperationHashMismatch,
}

impl InvalidError {
    pub fn is_hash_mismatch(&self) -> bool {
        matches!(self, Self::FactHashMismatch | Self::OperationHashMismatch)
    }
}

/// Why an operation was rejected during pre-processing. A rejected operation commits
/// nothing and the block pass continues with the next one.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReasonError {
    #[error("unknown currency {0}")]
    UnknownCurrency(CurrencyId),

    #[error("currency {0} already registered")]
    DuplicateCurrency(CurrencyId),

    #[error("account {0} does not exist")]
    AccountNotFound(Address),

    #[error("account {0} already exists")]
    AccountAlreadyExists(Address),

    #[error("insufficient {currency} balance in {address}: have {balance}, need {required}")]
    InsufficientFunds {
        address: Address,
        currency: CurrencyId,
        balance: Big,
        required: Big,
    },

    #[error("{currency} amount {amount} for new account {address} is below minimum {minimum}")]
    BelowMinimumBalance {
        address: Address,
        currency: CurrencyId,
        amount: Big,
        minimum: Big,
    },

    #[error("empty public keys")]
    EmptyPubkeys,

    #[error("not enough signs: weight {weight}, threshold {threshold}")]
    NotEnoughSigns { weight: u64, threshold: u64 },

    #[error("invalid fact: {0}")]
    InvalidFact(#[from] InvalidError),
}

/// A rejected operation, as reported in a block's results.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("operation {operation} (fact {fact}) rejected: {reason}")]
pub struct Rejection {
    pub operation: OperationHash,
    pub fact: FactHash,
    pub reason: ReasonError,
}

/// Failures that abort the whole block pass. Nothing from the pass may be committed.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("state store: {0}")]
    Store(#[from] StoreError),

    #[error("no processor registered for {0}")]
    UnsupportedOperation(String),

    #[error("operation {operation}: {source}")]
    HashMismatch {
        operation: OperationHash,
        source: InvalidError,
    },

    #[error("failed to encode {kind} state value: {reason}")]
    Encode { kind: &'static str, reason: String },

    #[error("failed to decode state {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("inconsistent state: {0}")]
    Inconsistent(String),
}

/// Outcome of the pre-process phase: either a business rejection or a fatal error.
#[derive(Debug)]
pub(crate) enum PreProcessError {
    Reason(ReasonError),
    Fatal(ProcessError),
}

impl From<ReasonError> for PreProcessError {
    fn from(e: ReasonError) -> Self {
        Self::Reason(e)
    }
}

impl From<InvalidError> for PreProcessError {
    fn from(e: InvalidError) -> Self {
        Self::Reason(ReasonError::InvalidFact(e))
    }
}

impl From<ProcessError> for PreProcessError {
    fn from(e: ProcessError) -> Self {
        Self::Fatal(e)
    }
}

impl From<StoreError> for PreProcessError {
    fn from(e: StoreError) -> Self {
        Self::Fatal(ProcessError::Store(e))
    }
}
