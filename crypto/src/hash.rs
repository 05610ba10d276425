//! Blake2b hashing for facts and operations.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use tally_types::{FactHash, OperationHash};

type Blake2b256 = Blake2b<U32>;

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Digest of `parts` fed in order, same as hashing their concatenation.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    parts
        .iter()
        .fold(Blake2b256::new(), |hasher, part| hasher.chain_update(part))
        .finalize()
        .into()
}

/// Hash a fact's canonical bytes to produce its `FactHash`.
pub fn hash_fact(fact_bytes: &[u8]) -> FactHash {
    FactHash::new(blake2b_256(fact_bytes))
}

/// Hash an operation: `fact_hash || signs || memo`.
pub fn hash_operation(fact_hash: &FactHash, signs_bytes: &[u8], memo: &str) -> OperationHash {
    OperationHash::new(blake2b_256_multi(&[
        fact_hash.as_bytes(),
        signs_bytes,
        memo.as_bytes(),
    ]))
}
