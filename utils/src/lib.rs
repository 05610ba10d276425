//! Shared utilities for the Tally ledger.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
