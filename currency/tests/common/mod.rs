#![allow(dead_code)]

use tally_currency::state::{account_key, balance_key, currency_design_key, read_balance};
use tally_currency::{
    process_block, Account, Amount, BlockReport, CurrencyDesign, CurrencyPolicy, Key, Keys,
    Operation, ProcessError, ProcessorRegistry, StateValue, Suffrage,
};
use tally_nullables::{MemoryStateStore, NullClock};
use tally_store::State;
use tally_types::{Address, Big, CurrencyId, KeyPair, NetworkId};

pub fn kp(seed: u8) -> KeyPair {
    tally_crypto::keypair_from_seed(&[seed; 32])
}

pub fn single_keys(kp: &KeyPair) -> Keys {
    Keys::new(vec![Key::new(kp.public.clone(), 100)], 100).unwrap()
}

pub fn cid(s: &str) -> CurrencyId {
    CurrencyId::new(s)
}

pub struct Ledger {
    pub store: MemoryStateStore,
    pub net: NetworkId,
    pub clock: NullClock,
    pub nodes: Vec<KeyPair>,
    pub registry: ProcessorRegistry,
}

impl Ledger {
    /// A ledger with three operator nodes, all of which must sign.
    pub fn new() -> Self {
        let nodes: Vec<KeyPair> = (200..203).map(kp).collect();
        let net = NetworkId::from("tally-test");
        let suffrage = Suffrage::new(nodes.iter().map(|k| k.public.clone()).collect(), 100).unwrap();
        Self {
            store: MemoryStateStore::new(),
            registry: ProcessorRegistry::standard(net.clone(), suffrage),
            net,
            clock: NullClock::default(),
            nodes,
        }
    }

    pub fn seed_account(&self, keys: &Keys) -> Address {
        let acc = Account::from_keys(keys.clone());
        let st = StateValue::Account(acc.clone())
            .into_state(&State::empty(account_key(acc.address())))
            .unwrap();
        self.store.insert(st).unwrap();
        acc.address().clone()
    }

    pub fn seed_balance(&self, address: &Address, currency: &CurrencyId, v: u64) {
        let st = StateValue::Balance(Amount::new(v, currency.clone()))
            .into_state(&State::empty(balance_key(address, currency)))
            .unwrap();
        self.store.insert(st).unwrap();
    }

    pub fn seed_currency(&self, design: &CurrencyDesign) {
        let st = StateValue::CurrencyDesign(design.clone())
            .into_state(&State::empty(currency_design_key(design.currency())))
            .unwrap();
        self.store.insert(st).unwrap();
    }

    /// Register `currency` directly in state with `policy`, crediting `genesis`.
    pub fn seed_registered(&self, currency: &CurrencyId, genesis: &Address, supply: u64, policy: CurrencyPolicy) {
        self.seed_currency(&CurrencyDesign::new(
            Amount::new(supply, currency.clone()),
            genesis.clone(),
            policy,
        ));
        self.seed_balance(genesis, currency, supply);
    }

    pub fn balance(&self, address: &Address, currency: &CurrencyId) -> Big {
        let (_, amount) = read_balance(&self.store, address, currency).unwrap();
        amount.big().clone()
    }

    pub fn sign(&self, op: impl Into<Operation>, signers: &[&KeyPair]) -> Operation {
        signers
            .iter()
            .fold(op.into(), |op, k| op.sign(&k.private, &self.net, self.clock.tick()))
    }

    pub fn sign_by_nodes(&self, op: impl Into<Operation>, count: usize) -> Operation {
        let signers: Vec<&KeyPair> = self.nodes.iter().take(count).collect();
        self.sign(op, &signers)
    }

    pub fn try_block(&self, ops: &[Operation], height: u64) -> Result<BlockReport, ProcessError> {
        let report = process_block(&self.registry, &self.store, ops, height)?;
        self.store.commit(&report.updates).unwrap();
        Ok(report)
    }

    pub fn block(&self, ops: &[Operation], height: u64) -> BlockReport {
        self.try_block(ops, height).unwrap()
    }
}
