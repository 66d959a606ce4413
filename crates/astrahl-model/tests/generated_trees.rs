//! Properties of randomly generated trees as they pass through the codec.

use std::collections::BTreeMap;

use astrahl_model::{random_tree, FaultTree, GateKind, WireOrder, WireTable};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn generated(size: usize, seed: u64) -> FaultTree {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_tree(size, &mut rng).unwrap()
}

fn gate_count(tree: &FaultTree) -> usize {
    match tree {
        FaultTree::Wire(_) => 0,
        FaultTree::Gate { kind, children, .. } => {
            assert_ne!(*kind, GateKind::Pand);
            assert_eq!(children.len(), 2);
            1 + children.iter().map(gate_count).sum::<usize>()
        }
    }
}

proptest! {
    #[test]
    fn generated_trees_are_binary_over_fresh_wires(size in 1usize..40, seed in any::<u64>()) {
        let tree = generated(size, seed);
        prop_assert_eq!(tree.wires().len(), size);
        prop_assert_eq!(gate_count(&tree), size - 1);
    }

    #[test]
    fn encoded_indices_follow_wire_order(size in 1usize..20, seed in any::<u64>()) {
        let tree = generated(size, seed);
        let order = WireOrder::of(&tree);
        let decoded = FaultTree::from_json(&tree.to_json(Some(&order))).unwrap();
        prop_assert_eq!(&decoded, &tree);
        prop_assert_eq!(WireOrder::of(&decoded), order);
    }

    #[test]
    fn dot_has_one_value_node_per_leaf(size in 1usize..12, seed in any::<u64>()) {
        let tree = generated(size, seed);
        let dot = tree.to_dot(&BTreeMap::new());
        prop_assert!(dot.starts_with("digraph G {"), "unexpected header: {}", dot);
        prop_assert_eq!(dot.matches("shape=circle").count(), size);
    }
}

#[test]
fn same_seed_same_tree() {
    assert_eq!(generated(9, 5), generated(9, 5));
}

#[test]
fn shared_table_interns_across_documents() {
    let mut table = WireTable::new();
    let tree = generated(4, 2);
    let encoded = tree.to_json(None);
    let first = FaultTree::from_json_with(&encoded, &mut table).unwrap();
    let second = FaultTree::from_json_with(&encoded, &mut table).unwrap();
    assert_eq!(table.len(), 4);
    for (a, b) in first.wires().iter().zip(second.wires().iter()) {
        assert!(a.same_handle(b));
    }
}

#[test]
fn zero_size_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert!(random_tree(0, &mut rng).is_err());
}
