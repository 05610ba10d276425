//! Ed25519 key pairs. A private key is the 32-byte Ed25519 seed.

use ed25519_dalek::SigningKey;
use tally_types::{KeyPair, PrivateKey, PublicKey};

/// A fresh key pair seeded from the operating system.
pub fn generate_keypair() -> Result<KeyPair, getrandom::Error> {
    let mut seed = [0u8; 32];
    getrandom::getrandom(&mut seed)?;
    Ok(keypair_from_seed(&seed))
}

pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let verifying = SigningKey::from_bytes(seed).verifying_key();
    KeyPair {
        public: PublicKey(verifying.to_bytes()),
        private: PrivateKey(*seed),
    }
}

pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    keypair_from_seed(&private.0).public
}
