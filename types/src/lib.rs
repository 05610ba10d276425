//! Fundamental types for the Tally currency ledger.
//!
//! This crate defines the value types shared across every other crate in the workspace:
//! arbitrary-precision amounts, currency ids, addresses, hashes, keys, timestamps and
//! the network identifier that binds signatures to one network.

pub mod address;
pub mod big;
pub mod currency;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod time;

mod hexbytes;

pub use address::Address;
pub use big::Big;
pub use currency::CurrencyId;
pub use error::TypesError;
pub use hash::{FactHash, OperationHash};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::Timestamp;
