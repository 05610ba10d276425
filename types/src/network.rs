//! Network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque byte string naming the network an operation is meant for.
///
/// Supplied by the consensus layer. Every fact signature covers
/// `fact_hash || network_id`, so a signature made for one network never verifies on
/// another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(Vec<u8>);

impl NetworkId {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for NetworkId {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
