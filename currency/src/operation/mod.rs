//! Facts, fact signatures and operations.
//!
//! A [`Fact`] is the immutable payload of an operation; its hash is fixed when it is
//! built and covers every field, starting with the token. Signers sign
//! `fact_hash || network_id`. A [`SignedOperation`] bundles a fact with its
//! signatures and memo and carries its own hash over all three.

pub mod create_accounts;
pub mod currency_policy_updater;
pub mod currency_register;
pub mod fee;
pub mod key_updater;
pub mod transfers;

pub use create_accounts::{CreateAccounts, CreateAccountsFact, CreateAccountsItem};
pub use currency_policy_updater::{CurrencyPolicyUpdater, CurrencyPolicyUpdaterFact};
pub use currency_register::{CurrencyRegister, CurrencyRegisterFact};
pub use fee::{FeeFact, FeeOperation};
pub use key_updater::{KeyUpdater, KeyUpdaterFact};
pub use transfers::{Transfers, TransfersFact, TransfersItem};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tally_types::{FactHash, NetworkId, OperationHash, PrivateKey, PublicKey, Signature, Timestamp};

use crate::amount::Amount;
use crate::canonical::CanonicalBytes;
use crate::error::InvalidError;
use crate::limits::{MAX_AMOUNTS_PER_ITEM, MAX_ITEMS, MAX_MEMO_SIZE, MAX_TOKEN_SIZE};

/// Stable wire identity of a fact or operation type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hint {
    pub kind: &'static str,
    pub version: &'static str,
}

impl Hint {
    pub const fn new(kind: &'static str, version: &'static str) -> Self {
        Self { kind, version }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-v{}", self.kind, self.version)
    }
}

pub const HINT_VERSION: &str = "0.0.1";

/// The closed set of operation kinds the engine knows how to process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    CreateAccounts,
    Transfers,
    KeyUpdater,
    CurrencyRegister,
    CurrencyPolicyUpdater,
    Fee,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        Self::CreateAccounts,
        Self::Transfers,
        Self::KeyUpdater,
        Self::CurrencyRegister,
        Self::CurrencyPolicyUpdater,
        Self::Fee,
    ];

    pub fn hint(self) -> Hint {
        let kind = match self {
            Self::CreateAccounts => "tally-currency-create-accounts-operation",
            Self::Transfers => "tally-currency-transfers-operation",
            Self::KeyUpdater => "tally-currency-key-updater-operation",
            Self::CurrencyRegister => "tally-currency-currency-register-operation",
            Self::CurrencyPolicyUpdater => "tally-currency-currency-policy-updater-operation",
            Self::Fee => "tally-currency-fee-operation",
        };
        Hint::new(kind, HINT_VERSION)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint().kind)
    }
}

/// An operation payload.
pub trait Fact: Clone + fmt::Debug + PartialEq + Eq + Serialize + DeserializeOwned {
    const HINT: Hint;
    const KIND: OperationKind;

    fn token(&self) -> &[u8];

    /// The hash stored in the fact when it was built.
    fn hash(&self) -> FactHash;

    /// Canonical bytes; always begin with the token.
    fn to_bytes(&self) -> Vec<u8>;

    /// Kind-specific structural checks.
    fn validate_fields(&self) -> Result<(), InvalidError>;

    fn generate_hash(&self) -> FactHash {
        tally_crypto::hash_fact(&self.to_bytes())
    }

    fn validate(&self) -> Result<(), InvalidError> {
        validate_token(self.token())?;
        self.validate_fields()?;
        if self.generate_hash() != self.hash() {
            return Err(InvalidError::FactHashMismatch);
        }
        Ok(())
    }
}

pub(crate) fn validate_token(token: &[u8]) -> Result<(), InvalidError> {
    if token.is_empty() || token.len() > MAX_TOKEN_SIZE {
        return Err(InvalidError::Token(format!(
            "{} bytes, expected 1..={}",
            token.len(),
            MAX_TOKEN_SIZE
        )));
    }
    Ok(())
}

pub(crate) fn validate_item_count(count: usize) -> Result<(), InvalidError> {
    if count == 0 || count > MAX_ITEMS {
        return Err(InvalidError::Items(format!(
            "{count} items, expected 1..={MAX_ITEMS}"
        )));
    }
    Ok(())
}

/// Amounts carried by one item: 1..=10, positive, one per currency.
pub(crate) fn validate_item_amounts(amounts: &[Amount]) -> Result<(), InvalidError> {
    if amounts.is_empty() || amounts.len() > MAX_AMOUNTS_PER_ITEM {
        return Err(InvalidError::Items(format!(
            "{} amounts, expected 1..={}",
            amounts.len(),
            MAX_AMOUNTS_PER_ITEM
        )));
    }
    let mut seen = HashSet::with_capacity(amounts.len());
    for am in amounts {
        am.validate_positive()?;
        if !seen.insert(am.currency()) {
            return Err(InvalidError::Items(format!(
                "duplicate currency {} in item",
                am.currency()
            )));
        }
    }
    Ok(())
}

/// Canonical prefix shared by every fact: token, then the fact hint.
pub(crate) fn fact_header(token: &[u8], hint: Hint) -> CanonicalBytes {
    let mut out = CanonicalBytes::new();
    out.put(token).put(hint.to_string().as_bytes());
    out
}

/// One signature over a fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSign {
    signer: PublicKey,
    signature: Signature,
    signed_at: Timestamp,
}

impl FactSign {
    pub fn new(signer: PublicKey, signature: Signature, signed_at: Timestamp) -> Self {
        Self {
            signer,
            signature,
            signed_at,
        }
    }

    /// Sign `fact_hash` for `network_id` with `private`.
    pub fn sign(
        private: &PrivateKey,
        fact_hash: &FactHash,
        network_id: &NetworkId,
        signed_at: Timestamp,
    ) -> Self {
        let signature = tally_crypto::sign_message(&Self::message(fact_hash, network_id), private);
        Self::new(tally_crypto::public_from_private(private), signature, signed_at)
    }

    pub fn message(fact_hash: &FactHash, network_id: &NetworkId) -> Vec<u8> {
        let mut msg = Vec::with_capacity(32 + network_id.as_bytes().len());
        msg.extend_from_slice(fact_hash.as_bytes());
        msg.extend_from_slice(network_id.as_bytes());
        msg
    }

    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signed_at(&self) -> Timestamp {
        self.signed_at
    }

    pub fn verify(&self, fact_hash: &FactHash, network_id: &NetworkId) -> bool {
        tally_crypto::verify_signature(
            &Self::message(fact_hash, network_id),
            &self.signature,
            &self.signer,
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 64 + 8);
        out.extend_from_slice(self.signer.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.signed_at.to_bytes());
        out
    }
}

/// A fact together with its signatures and memo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation<F> {
    fact: F,
    signs: Vec<FactSign>,
    #[serde(default)]
    memo: String,
    hash: OperationHash,
}

impl<F: Fact> SignedOperation<F> {
    /// An operation with no signatures yet.
    pub fn new(fact: F, memo: impl Into<String>) -> Self {
        Self::with_parts(fact, Vec::new(), memo.into())
    }

    fn with_parts(fact: F, signs: Vec<FactSign>, memo: String) -> Self {
        let hash = Self::generate_hash(&fact.hash(), &signs, &memo);
        Self {
            fact,
            signs,
            memo,
            hash,
        }
    }

    pub fn generate_hash(fact_hash: &FactHash, signs: &[FactSign], memo: &str) -> OperationHash {
        let signs_bytes: Vec<u8> = signs.iter().flat_map(|s| s.to_bytes()).collect();
        tally_crypto::hash_operation(fact_hash, &signs_bytes, memo)
    }

    pub fn fact(&self) -> &F {
        &self.fact
    }

    pub fn fact_hash(&self) -> FactHash {
        self.fact.hash()
    }

    pub fn signs(&self) -> &[FactSign] {
        &self.signs
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn hash(&self) -> OperationHash {
        self.hash
    }

    /// A new operation with `signs` merged in: a sign from a signer already present
    /// replaces the old one in place, others are appended in order.
    pub fn with_signs(&self, signs: Vec<FactSign>) -> Self {
        let mut merged = self.signs.clone();
        for sign in signs {
            match merged.iter_mut().find(|s| s.signer == sign.signer) {
                Some(existing) => *existing = sign,
                None => merged.push(sign),
            }
        }
        Self::with_parts(self.fact.clone(), merged, self.memo.clone())
    }

    /// Sign the fact with `private` and return the re-hashed operation.
    pub fn sign(&self, private: &PrivateKey, network_id: &NetworkId, signed_at: Timestamp) -> Self {
        let sign = FactSign::sign(private, &self.fact.hash(), network_id, signed_at);
        self.with_signs(vec![sign])
    }

    /// Structural validity: fact, memo size, distinct signers, operation hash.
    pub fn validate(&self) -> Result<(), InvalidError> {
        self.fact.validate()?;
        if self.memo.len() > MAX_MEMO_SIZE {
            return Err(InvalidError::MemoTooLong {
                len: self.memo.len(),
                max: MAX_MEMO_SIZE,
            });
        }
        let mut signers = HashSet::with_capacity(self.signs.len());
        for s in &self.signs {
            if !signers.insert(&s.signer) {
                return Err(InvalidError::Signs(format!("duplicate signer {}", s.signer)));
            }
        }
        if Self::generate_hash(&self.fact.hash(), &self.signs, &self.memo) != self.hash {
            return Err(InvalidError::OperationHashMismatch);
        }
        Ok(())
    }
}

/// Every operation the engine accepts, tagged on the wire by its hint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "tally-currency-create-accounts-operation-v0.0.1")]
    CreateAccounts(CreateAccounts),
    #[serde(rename = "tally-currency-transfers-operation-v0.0.1")]
    Transfers(Transfers),
    #[serde(rename = "tally-currency-key-updater-operation-v0.0.1")]
    KeyUpdater(KeyUpdater),
    #[serde(rename = "tally-currency-currency-register-operation-v0.0.1")]
    CurrencyRegister(CurrencyRegister),
    #[serde(rename = "tally-currency-currency-policy-updater-operation-v0.0.1")]
    CurrencyPolicyUpdater(CurrencyPolicyUpdater),
    #[serde(rename = "tally-currency-fee-operation-v0.0.1")]
    Fee(FeeOperation),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateAccounts(_) => OperationKind::CreateAccounts,
            Self::Transfers(_) => OperationKind::Transfers,
            Self::KeyUpdater(_) => OperationKind::KeyUpdater,
            Self::CurrencyRegister(_) => OperationKind::CurrencyRegister,
            Self::CurrencyPolicyUpdater(_) => OperationKind::CurrencyPolicyUpdater,
            Self::Fee(_) => OperationKind::Fee,
        }
    }

    pub fn hint(&self) -> Hint {
        self.kind().hint()
    }

    pub fn hash(&self) -> OperationHash {
        match self {
            Self::CreateAccounts(op) => op.hash(),
            Self::Transfers(op) => op.hash(),
            Self::KeyUpdater(op) => op.hash(),
            Self::CurrencyRegister(op) => op.hash(),
            Self::CurrencyPolicyUpdater(op) => op.hash(),
            Self::Fee(op) => op.hash(),
        }
    }

    pub fn fact_hash(&self) -> FactHash {
        match self {
            Self::CreateAccounts(op) => op.fact_hash(),
            Self::Transfers(op) => op.fact_hash(),
            Self::KeyUpdater(op) => op.fact_hash(),
            Self::CurrencyRegister(op) => op.fact_hash(),
            Self::CurrencyPolicyUpdater(op) => op.fact_hash(),
            Self::Fee(op) => op.fact_hash(),
        }
    }

    pub fn signs(&self) -> &[FactSign] {
        match self {
            Self::CreateAccounts(op) => op.signs(),
            Self::Transfers(op) => op.signs(),
            Self::KeyUpdater(op) => op.signs(),
            Self::CurrencyRegister(op) => op.signs(),
            Self::CurrencyPolicyUpdater(op) => op.signs(),
            Self::Fee(op) => op.signs(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidError> {
        match self {
            Self::CreateAccounts(op) => op.validate(),
            Self::Transfers(op) => op.validate(),
            Self::KeyUpdater(op) => op.validate(),
            Self::CurrencyRegister(op) => op.validate(),
            Self::CurrencyPolicyUpdater(op) => op.validate(),
            Self::Fee(op) => op.validate(),
        }
    }

    /// Add signatures; see [`SignedOperation::with_signs`].
    pub fn with_signs(&self, signs: Vec<FactSign>) -> Self {
        match self {
            Self::CreateAccounts(op) => Self::CreateAccounts(op.with_signs(signs)),
            Self::Transfers(op) => Self::Transfers(op.with_signs(signs)),
            Self::KeyUpdater(op) => Self::KeyUpdater(op.with_signs(signs)),
            Self::CurrencyRegister(op) => Self::CurrencyRegister(op.with_signs(signs)),
            Self::CurrencyPolicyUpdater(op) => Self::CurrencyPolicyUpdater(op.with_signs(signs)),
            Self::Fee(op) => Self::Fee(op.with_signs(signs)),
        }
    }

    /// Sign the carried fact; see [`SignedOperation::sign`].
    pub fn sign(&self, private: &PrivateKey, network_id: &NetworkId, signed_at: Timestamp) -> Self {
        let sign = FactSign::sign(private, &self.fact_hash(), network_id, signed_at);
        self.with_signs(vec![sign])
    }
}

impl From<CreateAccounts> for Operation {
    fn from(op: CreateAccounts) -> Self {
        Self::CreateAccounts(op)
    }
}

impl From<Transfers> for Operation {
    fn from(op: Transfers) -> Self {
        Self::Transfers(op)
    }
}

impl From<KeyUpdater> for Operation {
    fn from(op: KeyUpdater) -> Self {
        Self::KeyUpdater(op)
    }
}

impl From<CurrencyRegister> for Operation {
    fn from(op: CurrencyRegister) -> Self {
        Self::CurrencyRegister(op)
    }
}

impl From<CurrencyPolicyUpdater> for Operation {
    fn from(op: CurrencyPolicyUpdater) -> Self {
        Self::CurrencyPolicyUpdater(op)
    }
}

impl From<FeeOperation> for Operation {
    fn from(op: FeeOperation) -> Self {
        Self::Fee(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, Keys};
    use tally_types::{Address, CurrencyId};

    fn addr(b: u8) -> Address {
        Keys::new(vec![Key::new(PublicKey([b; 32]), 100)], 100)
            .unwrap()
            .address()
    }

    fn transfers() -> Transfers {
        let kp = tally_crypto::keypair_from_seed(&[1; 32]);
        let fact = TransfersFact::new(
            b"token-1".to_vec(),
            addr(1),
            vec![TransfersItem::new(
                addr(2),
                vec![Amount::new(10u64, CurrencyId::new("MCC"))],
            )],
        );
        SignedOperation::new(fact, "memo").sign(&kp.private, &NetworkId::from("net"), Timestamp::new(5))
    }

    #[test]
    fn wire_tag_matches_kind_hint() {
        let op = Operation::from(transfers());
        let json = serde_json::to_value(&op).unwrap();
        let tag = json.as_object().unwrap().keys().next().unwrap().clone();
        assert_eq!(tag, op.hint().to_string());
        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn with_signs_replaces_same_signer_and_rehashes() {
        let op = transfers();
        let kp = tally_crypto::keypair_from_seed(&[1; 32]);
        let other = tally_crypto::keypair_from_seed(&[2; 32]);
        let net = NetworkId::from("net");

        let resigned = op.sign(&kp.private, &net, Timestamp::new(9));
        assert_eq!(resigned.signs().len(), 1);
        assert_eq!(resigned.signs()[0].signed_at(), Timestamp::new(9));
        assert_ne!(resigned.hash(), op.hash());
        assert_eq!(resigned.fact_hash(), op.fact_hash());

        let two = resigned.sign(&other.private, &net, Timestamp::new(9));
        assert_eq!(two.signs().len(), 2);
        assert_eq!(two.signs()[1].signer(), &other.public);
        // original untouched
        assert_eq!(op.signs()[0].signed_at(), Timestamp::new(5));
    }

    #[test]
    fn sign_verifies_only_on_its_network() {
        let op = transfers();
        let s = &op.signs()[0];
        assert!(s.verify(&op.fact_hash(), &NetworkId::from("net")));
        assert!(!s.verify(&op.fact_hash(), &NetworkId::from("other")));
    }

    #[test]
    fn built_operation_is_valid() {
        assert_eq!(transfers().validate(), Ok(()));
    }

    #[test]
    fn tampered_memo_breaks_operation_hash() {
        let op = transfers();
        let mut json = serde_json::to_value(&op).unwrap();
        json["memo"] = serde_json::Value::from("changed");
        let tampered: Transfers = serde_json::from_value(json).unwrap();
        assert_eq!(tampered.validate(), Err(InvalidError::OperationHashMismatch));
    }

    #[test]
    fn memo_limit() {
        let fact = transfers().fact().clone();
        let op = SignedOperation::new(fact, "x".repeat(MAX_MEMO_SIZE + 1));
        assert!(matches!(op.validate(), Err(InvalidError::MemoTooLong { .. })));
    }

    #[test]
    fn token_limits() {
        assert!(validate_token(b"").is_err());
        assert!(validate_token(&[0u8; MAX_TOKEN_SIZE]).is_ok());
        assert!(validate_token(&[0u8; MAX_TOKEN_SIZE + 1]).is_err());
    }
}
