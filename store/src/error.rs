use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("state {key} written twice by one cause")]
    Duplicate { key: String },

    #[error("version conflict on {key}: expected {expected}, got {actual}")]
    Conflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
