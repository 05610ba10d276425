//! Multi-signature threshold checks.

use std::collections::HashSet;

use tally_types::{FactHash, NetworkId, PublicKey};

use crate::error::{InvalidError, ReasonError};
use crate::operation::FactSign;

/// Check that `signs` carry enough weight over `fact_hash`.
///
/// Each required key contributes its weight once, if some sign from that key
/// verifies against `fact_hash || network_id`. Signs from keys outside `required`
/// and signs that fail verification add nothing.
pub fn check_fact_signs(
    required: &[(PublicKey, u32)],
    threshold: u64,
    signs: &[FactSign],
    fact_hash: &FactHash,
    network_id: &NetworkId,
) -> Result<(), ReasonError> {
    if required.is_empty() {
        return Err(ReasonError::EmptyPubkeys);
    }

    let weight: u64 = required
        .iter()
        .filter(|(key, _)| {
            signs
                .iter()
                .any(|s| s.signer() == key && s.verify(fact_hash, network_id))
        })
        .map(|(_, w)| u64::from(*w))
        .sum();

    if weight < threshold {
        return Err(ReasonError::NotEnoughSigns { weight, threshold });
    }
    Ok(())
}

/// The operator set allowed to register currencies and update their policies.
///
/// Every node counts once; `threshold_percent` of the nodes, rounded up, must sign.
/// Nodes are distinct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suffrage {
    nodes: Vec<PublicKey>,
    threshold_percent: u32,
}

impl Suffrage {
    pub fn new(nodes: Vec<PublicKey>, threshold_percent: u32) -> Result<Self, InvalidError> {
        if !(1..=100).contains(&threshold_percent) {
            return Err(InvalidError::Signs(format!(
                "suffrage threshold {threshold_percent}% out of range 1..=100"
            )));
        }
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node) {
                return Err(InvalidError::Signs(format!("duplicate node {node}")));
            }
        }
        Ok(Self {
            nodes,
            threshold_percent,
        })
    }

    pub fn nodes(&self) -> &[PublicKey] {
        &self.nodes
    }

    pub fn threshold_percent(&self) -> u32 {
        self.threshold_percent
    }

    /// Number of node signatures needed: `ceil(n * percent / 100)`.
    pub fn threshold(&self) -> u64 {
        (self.nodes.len() as u64 * u64::from(self.threshold_percent)).div_ceil(100)
    }

    pub fn check(
        &self,
        signs: &[FactSign],
        fact_hash: &FactHash,
        network_id: &NetworkId,
    ) -> Result<(), ReasonError> {
        let required: Vec<(PublicKey, u32)> = self.nodes.iter().map(|k| (k.clone(), 1)).collect();
        check_fact_signs(&required, self.threshold(), signs, fact_hash, network_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_crypto::keypair_from_seed;
    use tally_types::{KeyPair, Timestamp};

    fn net() -> NetworkId {
        NetworkId::from("test-net")
    }

    fn fact_hash() -> FactHash {
        FactHash::new([42; 32])
    }

    fn sign(kp: &KeyPair) -> FactSign {
        FactSign::sign(&kp.private, &fact_hash(), &net(), Timestamp::new(1))
    }

    #[test]
    fn empty_required_is_empty_pubkeys() {
        let kp = keypair_from_seed(&[1; 32]);
        assert_eq!(
            check_fact_signs(&[], 1, &[sign(&kp)], &fact_hash(), &net()),
            Err(ReasonError::EmptyPubkeys)
        );
    }

    #[test]
    fn weights_accumulate_to_threshold() {
        let a = keypair_from_seed(&[1; 32]);
        let b = keypair_from_seed(&[2; 32]);
        let required = vec![(a.public.clone(), 60), (b.public.clone(), 40)];

        assert!(check_fact_signs(&required, 100, &[sign(&a), sign(&b)], &fact_hash(), &net()).is_ok());
        assert_eq!(
            check_fact_signs(&required, 100, &[sign(&a)], &fact_hash(), &net()),
            Err(ReasonError::NotEnoughSigns {
                weight: 60,
                threshold: 100
            })
        );
        assert!(check_fact_signs(&required, 60, &[sign(&a)], &fact_hash(), &net()).is_ok());
    }

    #[test]
    fn outsiders_and_bad_signatures_add_nothing() {
        let a = keypair_from_seed(&[1; 32]);
        let outsider = keypair_from_seed(&[9; 32]);
        let required = vec![(a.public.clone(), 100)];

        assert!(check_fact_signs(&required, 100, &[sign(&outsider)], &fact_hash(), &net()).is_err());

        let wrong_net = FactSign::sign(&a.private, &fact_hash(), &NetworkId::from("x"), Timestamp::new(1));
        assert!(check_fact_signs(&required, 100, &[wrong_net], &fact_hash(), &net()).is_err());
    }

    #[test]
    fn suffrage_threshold_rounds_up() {
        let nodes: Vec<_> = (1..=3u8).map(|b| keypair_from_seed(&[b; 32]).public).collect();
        assert_eq!(Suffrage::new(nodes.clone(), 100).unwrap().threshold(), 3);
        assert_eq!(Suffrage::new(nodes.clone(), 67).unwrap().threshold(), 3);
        assert_eq!(Suffrage::new(nodes.clone(), 66).unwrap().threshold(), 2);
        assert_eq!(Suffrage::new(nodes, 1).unwrap().threshold(), 1);
        assert!(Suffrage::new(vec![], 0).is_err());
    }

    #[test]
    fn suffrage_rejects_repeated_node() {
        let a = keypair_from_seed(&[1; 32]);
        let b = keypair_from_seed(&[2; 32]);
        let nodes = vec![a.public.clone(), a.public.clone(), b.public.clone()];
        assert!(matches!(
            Suffrage::new(nodes, 66),
            Err(InvalidError::Signs(msg)) if msg.starts_with("duplicate node")
        ));

        // Listed once, a single operator cannot meet 66% of two nodes.
        let suffrage = Suffrage::new(vec![a.public.clone(), b.public.clone()], 66).unwrap();
        assert!(suffrage.check(&[sign(&a)], &fact_hash(), &net()).is_err());
    }

    #[test]
    fn suffrage_check_needs_all_at_full_threshold() {
        let kps: Vec<_> = (1..=3u8).map(|b| keypair_from_seed(&[b; 32])).collect();
        let suffrage = Suffrage::new(kps.iter().map(|k| k.public.clone()).collect(), 100).unwrap();
        let all: Vec<_> = kps.iter().map(sign).collect();
        assert!(suffrage.check(&all, &fact_hash(), &net()).is_ok());
        assert!(matches!(
            suffrage.check(&all[..2], &fact_hash(), &net()),
            Err(ReasonError::NotEnoughSigns { .. })
        ));
    }
}
