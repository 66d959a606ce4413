// Command handler for: Dot

use std::collections::BTreeMap;
use std::path::Path;

use astrahl_model::WireOrder;

use super::helpers::{load_tree, load_wire_map};

pub(crate) fn run_dot_command(tree: &Path, values: Option<&Path>) -> miette::Result<String> {
    let tree = load_tree(tree)?;
    let values = match values {
        Some(path) => load_wire_map(&WireOrder::of(&tree), path, "values")?,
        None => BTreeMap::new(),
    };
    Ok(tree.to_dot(&values))
}
