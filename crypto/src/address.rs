//! Account address derivation from key-set hashes.
//!
//! An address is `tly_`, then the key-set hash in base32 (52 chars), then the first
//! five bytes of its Blake2b-256 digest in base32 (8 chars).

use tally_types::Address;

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Characters spent on the 32-byte key-set hash.
const HASH_CHARS: usize = 52;
const CHECKSUM_LEN: usize = 5;

fn symbol_value(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// MSB-first 5-bit packing; a trailing partial group is zero-padded.
fn to_base32(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut acc: u16 = 0;
    let mut bits = 0u32;
    for &b in bytes {
        acc = (acc << 8) | u16::from(b);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(char::from(ALPHABET[usize::from((acc >> bits) & 0x1f)]));
        }
        acc &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(char::from(ALPHABET[usize::from((acc << (5 - bits)) & 0x1f)]));
    }
    out
}

/// Inverse of [`to_base32`]; padding bits are dropped.
fn from_base32(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut acc: u16 = 0;
    let mut bits = 0u32;
    for c in s.bytes() {
        acc = (acc << 5) | u16::from(symbol_value(c)?);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }
    Some(out)
}

fn checksum(keys_hash: &[u8; 32]) -> [u8; CHECKSUM_LEN] {
    let digest = crate::blake2b_256(keys_hash);
    let mut sum = [0u8; CHECKSUM_LEN];
    sum.copy_from_slice(&digest[..CHECKSUM_LEN]);
    sum
}

/// Derive a `tly_`-prefixed address from the hash of an account's key set.
pub fn derive_address(keys_hash: &[u8; 32]) -> Address {
    let mut raw = String::with_capacity(Address::PREFIX.len() + Address::ENCODED_LEN);
    raw.push_str(Address::PREFIX);
    raw.push_str(&to_base32(keys_hash));
    raw.push_str(&to_base32(&checksum(keys_hash)));
    Address::new(raw)
}

/// The key-set hash behind `address`, or `None` when the prefix, length or
/// checksum is wrong. Only the canonical spelling decodes.
pub fn decode_address(address: &str) -> Option<[u8; 32]> {
    let body = address.strip_prefix(Address::PREFIX)?;
    if body.len() != Address::ENCODED_LEN || !body.is_ascii() {
        return None;
    }
    let keys_hash: [u8; 32] = from_base32(&body[..HASH_CHARS])?.try_into().ok()?;
    (derive_address(&keys_hash).as_str() == address).then_some(keys_hash)
}

pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_and_validate() {
        let addr = derive_address(&[9u8; 32]);
        assert!(addr.as_str().starts_with("tly_"));
        assert_eq!(addr.as_str().len(), 64);
        assert!(addr.is_well_formed());
        assert!(validate_address(addr.as_str()));
    }

    #[test]
    fn decode_roundtrip() {
        let hash = crate::blake2b_256(b"keys");
        let addr = derive_address(&hash);
        assert_eq!(decode_address(addr.as_str()), Some(hash));
    }

    #[test]
    fn invalid_checksum_rejected() {
        let addr = derive_address(&[1u8; 32]);
        let mut bad = addr.as_str().to_string();
        let last = bad.pop().unwrap();
        bad.push(if last == '1' { '3' } else { '1' });
        assert!(!validate_address(&bad));
    }

    #[test]
    fn wrong_prefix_or_length_rejected() {
        let addr = derive_address(&[1u8; 32]);
        let swapped = addr.as_str().replacen("tly_", "brn_", 1);
        assert!(!validate_address(&swapped));
        assert!(!validate_address("tly_tooshort"));
        assert!(!validate_address("tly_"));
    }

    #[test]
    fn padding_bits_must_be_zero() {
        let addr = derive_address(&[0u8; 32]);
        // The last hash char holds one data bit and four padding bits.
        let mut chars: Vec<char> = addr.as_str().chars().collect();
        let i = Address::PREFIX.len() + HASH_CHARS - 1;
        assert_eq!(chars[i], '1');
        chars[i] = '3';
        let noncanonical: String = chars.into_iter().collect();
        assert!(!validate_address(&noncanonical));
    }

    #[test]
    fn different_hashes_different_addresses() {
        assert_ne!(derive_address(&[1u8; 32]), derive_address(&[2u8; 32]));
    }
}
