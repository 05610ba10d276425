//! Library side of the `tally` command line.

pub mod commands;
pub mod config;
pub mod snapshot;

pub use config::{ConfigError, EngineConfig};
