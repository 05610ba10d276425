//! Engine-wide structural limits.

/// Maximum length of a fact token in bytes.
pub const MAX_TOKEN_SIZE: usize = 100;

/// Maximum length of an operation memo in bytes.
pub const MAX_MEMO_SIZE: usize = 1024;

/// Maximum items in a `CreateAccounts` or `Transfers` fact.
pub const MAX_ITEMS: usize = 10;

/// Maximum amounts carried by a single item.
pub const MAX_AMOUNTS_PER_ITEM: usize = 10;

/// Maximum keys in an account key set.
pub const MAX_KEYS: usize = 10;

pub const MIN_KEY_WEIGHT: u32 = 1;
pub const MAX_KEY_WEIGHT: u32 = 100;

pub const MIN_THRESHOLD: u32 = 1;
pub const MAX_THRESHOLD: u32 = 100;

/// Fixed-point denominator for fee ratios (parts per billion).
pub const RATIO_PRECISION: u64 = 1_000_000_000;
