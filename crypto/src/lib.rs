//! Cryptographic primitives for the Tally ledger.
//!
//! - **Ed25519** for fact signing and signature verification
//! - **Blake2b-256** for fact, operation and key-set hashing
//! - Address derivation with `tly_` prefix and base32 encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, derive_address, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi, hash_fact, hash_operation};
pub use keys::{generate_keypair, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
