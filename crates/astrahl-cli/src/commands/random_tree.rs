// Command handler for: RandomTree

use astrahl_model::{random_tree, WireOrder};
use miette::IntoDiagnostic;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

pub(crate) fn run_random_tree_command(size: usize, seed: u64) -> miette::Result<Value> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let tree = random_tree(size, &mut rng).into_diagnostic()?;
    Ok(tree.to_json(Some(&WireOrder::of(&tree))))
}
