use rand::Rng;

use crate::errors::ModelError;
use crate::tree::FaultTree;

/// Build a random binary And/Or tree over `size` fresh wires.
///
/// Wires are named `Wire 0`, `Wire 1`, ... in left-to-right order. The left
/// subtree receives a uniformly chosen share in `1..size` of the wires.
pub fn random_tree<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<FaultTree, ModelError> {
    if size == 0 {
        return Err(ModelError::EmptyTree);
    }
    let mut next_wire = 0usize;
    Ok(build(size, rng, &mut next_wire))
}

fn build<R: Rng + ?Sized>(size: usize, rng: &mut R, next_wire: &mut usize) -> FaultTree {
    if size == 1 {
        let wire = FaultTree::wire(format!("Wire {next_wire}"));
        *next_wire += 1;
        return wire;
    }
    let or_gate = rng.gen_bool(0.5);
    let left_size = rng.gen_range(1..size);
    let lhs = build(left_size, rng, next_wire);
    let rhs = build(size - left_size, rng, next_wire);
    if or_gate {
        FaultTree::or(lhs, rhs)
    } else {
        FaultTree::and(lhs, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_tree_has_requested_wire_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for size in 1..=12 {
            let tree = random_tree(size, &mut rng).unwrap();
            assert_eq!(tree.wires().len(), size);
        }
    }

    #[test]
    fn random_tree_is_deterministic_per_seed() {
        let a = random_tree(6, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let b = random_tree(6, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_tree_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(random_tree(0, &mut rng), Err(ModelError::EmptyTree));
    }
}
