// Command handler for: Baseline

use std::path::Path;

use astrahl_sim::AllocationStrategy;
use astrahl_solver::Point;
use miette::IntoDiagnostic;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

use super::helpers::{load_tree, load_wire_map, sa_params, solver_for, wire_object};
use crate::cli::{ConfidenceArgs, SaArgs, SolverArgs};

#[allow(clippy::too_many_arguments)]
pub(crate) fn run_baseline_command(
    tree: &Path,
    point: &Path,
    budget: f64,
    strategy: AllocationStrategy,
    seed: u64,
    confidence: &ConfidenceArgs,
    sa: &SaArgs,
    solver_args: &SolverArgs,
) -> miette::Result<Value> {
    let solver = solver_for(load_tree(tree)?, Some(confidence), solver_args)?;
    let point: Point = load_wire_map(solver.problem().order(), point, "point")?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let allocation = strategy
        .allocate(&solver, &sa_params(sa), &point, budget, &mut rng)
        .into_diagnostic()?;
    Ok(json!({
        "strategy": strategy.name(),
        "allocation": wire_object(&allocation),
    }))
}
