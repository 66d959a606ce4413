// Command handler for: FaultCounts

use std::path::Path;

use astrahl_model::Expression;
use astrahl_sim::geometric_fault_counts;
use miette::IntoDiagnostic;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

use super::helpers::{load_named_point, wire_object};

pub(crate) fn run_fault_counts_command(
    point: &Path,
    rows: usize,
    confidence_base: f64,
    seed: u64,
) -> miette::Result<Value> {
    let point = load_named_point(point)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let table = geometric_fault_counts(
        &point,
        &Expression::geometric_confidence(confidence_base),
        rows,
        &mut rng,
    )
    .into_diagnostic()?;
    Ok(Value::Array(
        table.row_maps().map(|row| wire_object(&row)).collect(),
    ))
}
