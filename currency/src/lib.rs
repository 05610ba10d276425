//! The Tally currency engine.
//!
//! Validates signed monetary operations against a versioned state store and
//! produces the exact state writes each one causes:
//!
//! - **CreateAccounts**: open accounts addressed by their key sets and fund them
//! - **Transfers**: move amounts between existing accounts
//! - **KeyUpdater**: rotate an account's keys
//! - **CurrencyRegister**: introduce a currency and mint its genesis amount
//! - **CurrencyPolicyUpdater**: change a currency's minimum balance and feeer
//! - **Fee**: settle a block's collected fees to each currency's receiver
//!
//! Start a pass with [`process_block`] or drive an [`OperationProcessor`] directly.

pub mod amount;
mod canonical;
pub mod error;
pub mod fee;
pub mod keys;
pub mod limits;
pub mod operation;
pub mod pool;
pub mod processor;
pub mod sign;
pub mod state;

pub use amount::Amount;
pub use error::{InvalidError, ProcessError, ReasonError, Rejection};
pub use fee::{CurrencyDesign, CurrencyPolicy, FeeRatio, Feeer};
pub use keys::{Account, Key, Keys};
pub use operation::{
    CreateAccounts, CreateAccountsFact, CreateAccountsItem, CurrencyPolicyUpdater,
    CurrencyPolicyUpdaterFact, CurrencyRegister, CurrencyRegisterFact, Fact, FactSign, FeeFact,
    FeeOperation, Hint, KeyUpdater, KeyUpdaterFact, Operation, OperationKind, SignedOperation,
    Transfers, TransfersFact, TransfersItem,
};
pub use pool::CurrencyPool;
pub use processor::{process_block, BlockReport, OperationProcessor, ProcessOutcome, ProcessorRegistry};
pub use sign::{check_fact_signs, Suffrage};
pub use state::StateValue;
