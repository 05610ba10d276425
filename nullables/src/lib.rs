//! Nullable infrastructure for deterministic testing.
//!
//! The engine reaches the outside world only through the state-store contract and
//! the wall clock. This crate provides stand-ins for both that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::MemoryStateStore;
