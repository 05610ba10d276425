//! Subcommand implementations. Each returns the text printed on stdout.

use anyhow::Context;
use base64::Engine as _;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;
use tally_currency::{
    process_block, Account, Amount, CurrencyDesign, CurrencyPolicy, CurrencyRegister,
    CurrencyRegisterFact, FeeOperation, FeeRatio, Feeer, Key, Keys, Operation, ProcessorRegistry,
    SignedOperation, StateValue,
};
use tally_store::State;
use tally_types::{Address, Big, CurrencyId, NetworkId, OperationHash, PrivateKey, PublicKey, Timestamp};

use crate::snapshot::{SnapshotState, StateEntry};

#[derive(Serialize)]
struct KeyPairOutput {
    public: String,
    private: String,
}

/// `key new`: a fresh key pair, or the one derived from `seed`.
pub fn key_new(seed: Option<&str>) -> anyhow::Result<String> {
    let kp = match seed {
        Some(s) => {
            let bytes: [u8; 32] = hex::decode(s)
                .context("seed is not hex")?
                .try_into()
                .map_err(|v: Vec<u8>| anyhow::anyhow!("seed must be 32 bytes, got {}", v.len()))?;
            tally_crypto::keypair_from_seed(&bytes)
        }
        None => tally_crypto::generate_keypair().map_err(|e| anyhow::anyhow!("key generation failed: {e}"))?,
    };
    let out = KeyPairOutput {
        public: kp.public.to_string(),
        private: hex::encode(kp.private.0),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// `key sign`: sign a base64 message, print the hex signature.
pub fn key_sign(private_key: &str, message_b64: &str) -> anyhow::Result<String> {
    let private = parse_private(private_key)?;
    let message = base64::engine::general_purpose::STANDARD
        .decode(message_b64.trim())
        .context("message is not base64")?;
    Ok(tally_crypto::sign_message(&message, &private).to_string())
}

#[derive(Serialize)]
struct AddressOutput {
    address: Address,
    /// Account state entry, ready to be placed in a state file.
    state: StateEntry,
}

/// `key address`: derive the address of a key set given as `pubkey:weight` pairs.
pub fn key_address(keys: &[String], threshold: u32) -> anyhow::Result<String> {
    let keys = parse_keys(keys, threshold)?;
    keys.validate()?;
    let account = Account::from_keys(keys);
    let state = StateValue::Account(account.clone())
        .into_state(&State::empty(tally_currency::state::account_key(account.address())))?;
    let out = AddressOutput {
        address: account.address().clone(),
        state: StateEntry::from_state(&state)?,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

fn parse_keys(specs: &[String], threshold: u32) -> anyhow::Result<Keys> {
    let keys = specs
        .iter()
        .map(|spec| {
            let (key, weight) = spec
                .split_once(':')
                .with_context(|| format!("key {spec:?} is not <pubkey>:<weight>"))?;
            let key = PublicKey::from_str(key).with_context(|| format!("bad public key in {spec:?}"))?;
            let weight: u32 = weight.parse().with_context(|| format!("bad weight in {spec:?}"))?;
            Ok(Key::new(key, weight))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Keys::new(keys, threshold)?)
}

fn parse_private(s: &str) -> anyhow::Result<PrivateKey> {
    PrivateKey::from_str(s.trim()).context("private key must be 32 bytes of hex")
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeerKind {
    Nil,
    Fixed,
    Ratio,
}

#[derive(clap::Args, Clone, Debug)]
pub struct CurrencyRegisterArgs {
    /// Private key (hex) of the signing operator node.
    #[arg(long, env = "TALLY_PRIVATE_KEY")]
    pub private_key: String,

    #[arg(long)]
    pub currency: CurrencyId,

    #[arg(long)]
    pub genesis_amount: Big,

    #[arg(long)]
    pub genesis_account: Address,

    #[arg(long, default_value = "0")]
    pub new_account_min_balance: Big,

    #[arg(long, value_enum, default_value_t = FeeerKind::Nil)]
    pub feeer: FeeerKind,

    #[arg(long)]
    pub fee_receiver: Option<Address>,

    /// Flat fee, for `--feeer fixed`.
    #[arg(long)]
    pub fee_amount: Option<Big>,

    /// Decimal ratio such as 0.005, for `--feeer ratio`.
    #[arg(long)]
    pub fee_ratio: Option<f64>,

    #[arg(long, default_value = "0")]
    pub fee_min: Big,

    #[arg(long)]
    pub fee_max: Option<Big>,

    /// Fact token; defaults to the signing time.
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, default_value = "")]
    pub memo: String,
}

impl CurrencyRegisterArgs {
    /// Without `--fee-receiver` a fixed or ratio feeer collects nothing.
    fn feeer(&self) -> anyhow::Result<Feeer> {
        Ok(match self.feeer {
            FeeerKind::Nil => Feeer::Nil,
            FeeerKind::Fixed => Feeer::Fixed {
                receiver: self.fee_receiver.clone(),
                amount: self.fee_amount.clone().context("--fee-amount is required for a fixed feeer")?,
            },
            FeeerKind::Ratio => Feeer::Ratio {
                receiver: self.fee_receiver.clone(),
                ratio: FeeRatio::from_f64(self.fee_ratio.context("--fee-ratio is required for a ratio feeer")?)?,
                min: self.fee_min.clone(),
                max: self.fee_max.clone().context("--fee-max is required for a ratio feeer")?,
            },
        })
    }
}

/// `currency-register`: build and sign a currency registration.
pub fn currency_register(
    args: &CurrencyRegisterArgs,
    network_id: &NetworkId,
    signed_at: Timestamp,
) -> anyhow::Result<Operation> {
    let private = parse_private(&args.private_key)?;
    let design = CurrencyDesign::new(
        Amount::new(args.genesis_amount.clone(), args.currency.clone()),
        args.genesis_account.clone(),
        CurrencyPolicy::new(args.new_account_min_balance.clone(), args.feeer()?),
    );
    let token = match &args.token {
        Some(t) => t.as_bytes().to_vec(),
        None => signed_at.to_bytes().to_vec(),
    };
    let op: CurrencyRegister = SignedOperation::new(CurrencyRegisterFact::new(token, design), args.memo.clone())
        .sign(&private, network_id, signed_at);
    op.validate()?;
    Ok(op.into())
}

/// `sign-operation`: add a signature to the operation stored in `path`.
pub fn sign_operation(
    private_key: &str,
    path: &Path,
    network_id: &NetworkId,
    signed_at: Timestamp,
) -> anyhow::Result<Operation> {
    let private = parse_private(private_key)?;
    let op: Operation = read_json(path)?;
    Ok(op.sign(&private, network_id, signed_at))
}

#[derive(Serialize)]
pub struct RejectedOutput {
    pub operation: OperationHash,
    pub fact: tally_types::FactHash,
    pub reason: String,
}

#[derive(Serialize)]
pub struct ProcessOutput {
    pub height: u64,
    pub applied: Vec<OperationHash>,
    pub rejected: Vec<RejectedOutput>,
    pub fee: Option<FeeOperation>,
    pub state: Vec<StateEntry>,
}

/// `process`: replay `ops` as block `height` over the state in `state_path`,
/// commit, and return the report with the post-state.
pub fn process(
    registry: &ProcessorRegistry,
    state_path: &Path,
    ops_path: &Path,
    height: u64,
) -> anyhow::Result<ProcessOutput> {
    let mut store = SnapshotState::from_entries(read_json(state_path)?)?;
    let ops: Vec<Operation> = read_json(ops_path)?;
    tracing::info!(height, operations = ops.len(), states = store.len(), "replaying block");

    let report = process_block(registry, &store, &ops, height)?;
    store.apply(report.updates);

    Ok(ProcessOutput {
        height: report.height,
        applied: report.applied,
        rejected: report
            .rejected
            .into_iter()
            .map(|r| RejectedOutput {
                operation: r.operation,
                fact: r.fact,
                reason: r.reason.to_string(),
            })
            .collect(),
        fee: report.fee,
        state: store.to_entries()?,
    })
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
