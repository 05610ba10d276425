mod common;

use common::{cid, kp, single_keys, Ledger};
use proptest::prelude::*;
use tally_currency::{
    check_fact_signs, Amount, CurrencyPolicy, Fact, FactSign, FeeRatio, Feeer, Operation,
    ReasonError, Suffrage, Transfers, TransfersFact, TransfersItem,
};
use tally_types::{Big, FactHash, NetworkId, Timestamp};

fn ratio_feeer(ppb: u64, min: u64, max: u64) -> Feeer {
    Feeer::Ratio {
        receiver: Some(single_keys(&kp(1)).address()),
        ratio: FeeRatio::from_ppb(ppb).unwrap(),
        min: min.into(),
        max: max.into(),
    }
}

proptest! {
    #[test]
    fn ratio_fee_stays_within_bounds(
        amount in 0u64..u64::MAX,
        ppb in 0u64..=1_000_000_000,
        min in 0u64..1_000,
        extra in 0u64..1_000,
    ) {
        let max = min + extra;
        let fee = ratio_feeer(ppb, min, max).fee(&Big::from(amount));
        prop_assert!(fee >= min);
        prop_assert!(fee <= max);
    }

    #[test]
    fn ratio_fee_never_exceeds_amount_times_ratio(amount in 0u64..1_000_000_000_000, ppb in 0u64..=1_000_000_000) {
        let fee = ratio_feeer(ppb, 0, u64::MAX).fee(&Big::from(amount));
        let exact = u128::from(amount) * u128::from(ppb) / 1_000_000_000;
        prop_assert_eq!(fee, Big::from(exact));
    }

    #[test]
    fn suffrage_threshold_is_monotonic(n in 0usize..50, p in 1u32..100) {
        let nodes: Vec<_> = (0..n).map(|i| kp(i as u8).public).collect();
        let lower = Suffrage::new(nodes.clone(), p).unwrap().threshold();
        let higher = Suffrage::new(nodes, p + 1).unwrap().threshold();
        prop_assert!(lower <= higher);
        prop_assert!(higher <= n as u64);
    }

    #[test]
    fn signs_reach_threshold_exactly_when_enough_keys_sign(signed in 0usize..=4, threshold in 1u64..=4) {
        let net = NetworkId::from("prop-net");
        let fact_hash = FactHash::new([7; 32]);
        let keys: Vec<_> = (10..14).map(kp).collect();
        let required: Vec<_> = keys.iter().map(|k| (k.public.clone(), 1)).collect();
        let signs: Vec<_> = keys
            .iter()
            .take(signed)
            .map(|k| FactSign::sign(&k.private, &fact_hash, &net, Timestamp::new(1)))
            .collect();

        let result = check_fact_signs(&required, threshold, &signs, &fact_hash, &net);
        if signed as u64 >= threshold {
            prop_assert_eq!(result, Ok(()));
        } else {
            prop_assert_eq!(
                result,
                Err(ReasonError::NotEnoughSigns { weight: signed as u64, threshold })
            );
        }
    }

    #[test]
    fn fact_hash_is_stable_across_signing(token in proptest::collection::vec(any::<u8>(), 1..=100), v in 1u64..u64::MAX) {
        let ledger = Ledger::new();
        let fact = TransfersFact::new(
            token,
            single_keys(&kp(1)).address(),
            vec![TransfersItem::new(single_keys(&kp(2)).address(), vec![Amount::new(v, cid("MCC"))])],
        );
        prop_assert_eq!(fact.generate_hash(), fact.hash());

        let op = ledger.sign(Transfers::new(fact.clone(), "memo"), &[&kp(1), &kp(3)]);
        prop_assert_eq!(op.fact_hash(), fact.hash());
        prop_assert!(op.validate().is_ok());

        let json = serde_json::to_string(&op).unwrap();
        let back: Operation = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.hash(), op.hash());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn transfers_conserve_supply(amounts in proptest::collection::vec(1u64..2_000, 1..8), ppb in 0u64..=100_000_000) {
        let ledger = Ledger::new();
        let alice_kp = kp(1);
        let alice = ledger.seed_account(&single_keys(&alice_kp));
        let bob = ledger.seed_account(&single_keys(&kp(2)));
        let collector = ledger.seed_account(&single_keys(&kp(3)));
        let feeer = Feeer::Ratio {
            receiver: Some(collector.clone()),
            ratio: FeeRatio::from_ppb(ppb).unwrap(),
            min: 0u64.into(),
            max: 50u64.into(),
        };
        ledger.seed_registered(&cid("MCC"), &alice, 5_000, CurrencyPolicy::new(0u64, feeer));

        let ops: Vec<Operation> = amounts
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let fact = TransfersFact::new(
                    format!("t{i}"),
                    alice.clone(),
                    vec![TransfersItem::new(bob.clone(), vec![Amount::new(*v, cid("MCC"))])],
                );
                ledger.sign(Transfers::new(fact, ""), &[&alice_kp])
            })
            .collect();

        let report = ledger.block(&ops, 1);
        prop_assert_eq!(report.applied.len() + report.rejected.len(), ops.len());

        let total = ledger.balance(&alice, &cid("MCC"))
            + ledger.balance(&bob, &cid("MCC"))
            + ledger.balance(&collector, &cid("MCC"));
        prop_assert_eq!(total, Big::from(5_000u64));
        prop_assert!(!ledger.balance(&alice, &cid("MCC")).is_negative());
    }
}
