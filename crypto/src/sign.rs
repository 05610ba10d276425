//! Ed25519 signatures over raw messages.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use tally_types::{PrivateKey, PublicKey, Signature};

pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    Signature(SigningKey::from_bytes(&private_key.0).sign(message).to_bytes())
}

/// `false` for a bad signature and for a public key that is not a curve point.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    VerifyingKey::from_bytes(&public_key.0)
        .map(|key| {
            key.verify(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    const MSG: &[u8] = b"fact hash || network id";

    #[test]
    fn signature_verifies_only_for_its_message_and_key() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let other = keypair_from_seed(&[2u8; 32]);
        let sig = sign_message(MSG, &kp.private);

        assert!(verify_signature(MSG, &sig, &kp.public));
        assert!(!verify_signature(b"another network", &sig, &kp.public));
        assert!(!verify_signature(MSG, &sig, &other.public));
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = keypair_from_seed(&[3u8; 32]);
        assert_eq!(sign_message(MSG, &kp.private), sign_message(MSG, &kp.private));
    }

    #[test]
    fn off_curve_public_key_fails() {
        let kp = keypair_from_seed(&[5u8; 32]);
        let sig = sign_message(MSG, &kp.private);
        assert!(!verify_signature(MSG, &sig, &PublicKey([0xFF; 32])));
    }
}
