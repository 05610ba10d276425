//! Canonical byte encoding used for fact, key-set and policy hashing.
//!
//! Every variable-length field is written as a big-endian `u32` length followed by
//! the raw bytes, so adjacent fields can never be confused for one another.

pub(crate) struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    pub(crate) fn new() -> Self {
        Self(Vec::with_capacity(128))
    }

    pub(crate) fn put(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.0.extend_from_slice(bytes);
        self
    }

    pub(crate) fn put_u32(&mut self, v: u32) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub(crate) fn put_u64(&mut self, v: u64) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// A list: element count, then each element's own canonical bytes.
    pub(crate) fn put_list<T>(&mut self, items: &[T], encode: impl Fn(&T) -> Vec<u8>) -> &mut Self {
        self.put_u32(items.len() as u32);
        for item in items {
            self.put(&encode(item));
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.0)
    }
}

/// Hex encoding for opaque byte strings (fact tokens) in human-readable formats.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(bytes))
        } else {
            serializer.serialize_bytes(bytes)
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(s).map_err(serde::de::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_separates_fields() {
        let a = CanonicalBytes::new().put(b"ab").put(b"c").finish();
        let b = CanonicalBytes::new().put(b"a").put(b"bc").finish();
        assert_ne!(a, b);
        assert_eq!(a.len(), 4 + 2 + 4 + 1);
    }
}
