//! # Primitive Properties
//!
//! Signing round-trips under arbitrary keys and messages, tree roots are a
//! function of the entry set alone, and every proof a tree produces
//! verifies against its root.

use proptest::prelude::*;
use zkid_core::{FieldElement, Hash256};
use zkid_crypto::{poseidon, MemoryTree, PrivateKey, SparseMerkleTree};

fn tree_of(entries: &[u64], levels: usize) -> MemoryTree {
    let mut tree = MemoryTree::new(levels).unwrap();
    for k in entries {
        tree.add(FieldElement::from_u64(*k), FieldElement::from_u64(k * 3)).unwrap();
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_signatures_verify(key in proptest::array::uniform32(any::<u8>()), msg in any::<u64>()) {
        let sk = PrivateKey::from_bytes(key);
        let pk = sk.public().unwrap();
        let m = FieldElement::from_u64(msg);
        let sig = sk.sign_poseidon(m).unwrap();
        prop_assert!(pk.verify_poseidon(m, &sig).is_ok());
        prop_assert!(pk.verify_poseidon(FieldElement::from_u64(msg ^ 1), &sig).is_err());
    }

    #[test]
    fn prop_root_ignores_insertion_order(keys in prop::collection::hash_set(0u64..1 << 20, 1..16)) {
        let forward: Vec<u64> = keys.iter().copied().collect();
        let mut backward = forward.clone();
        backward.reverse();
        prop_assert_eq!(tree_of(&forward, 32).root(), tree_of(&backward, 32).root());
    }

    #[test]
    fn prop_every_proof_verifies(keys in prop::collection::hash_set(0u64..1 << 20, 0..16), lookup in 0u64..1 << 20) {
        let entries: Vec<u64> = keys.iter().copied().collect();
        let tree = tree_of(&entries, 32);
        let proof = tree.generate_proof(FieldElement::from_u64(lookup)).unwrap();
        prop_assert_eq!(proof.existence, keys.contains(&lookup));
        prop_assert!(proof
            .verify(tree.root(), FieldElement::from_u64(lookup), FieldElement::from_u64(lookup * 3))
            .unwrap());
        if let Some(aux) = proof.node_aux {
            prop_assert_ne!(aux.key, Hash256::from(FieldElement::from_u64(lookup)));
        }
    }

    #[test]
    fn prop_sponge_is_deterministic(values in prop::collection::vec(any::<u64>(), 1..40)) {
        let fields: Vec<FieldElement> = values.into_iter().map(FieldElement::from_u64).collect();
        prop_assert_eq!(
            poseidon::sponge_hash(&fields, 6).unwrap(),
            poseidon::sponge_hash(&fields, 6).unwrap()
        );
    }
}

#[test]
fn test_empty_tree_proof_is_empty() {
    let tree = MemoryTree::new(8).unwrap();
    let proof = tree.generate_proof(FieldElement::from_u64(5)).unwrap();
    assert!(!proof.existence);
    assert!(proof.siblings.is_empty());
    assert!(proof.node_aux.is_none());
    assert!(tree.root().is_zero());
}
