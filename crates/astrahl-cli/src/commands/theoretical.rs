// Command handler for: Theoretical

use std::path::Path;

use astrahl_model::Expression;
use astrahl_sim::{end_point_probabilities, AllocationStrategy};
use astrahl_solver::{PointTable, Problem, Solver};
use miette::IntoDiagnostic;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

use super::helpers::{build_backend, load_tree, load_wire_rows, sa_params};
use crate::cli::{SaArgs, SolverArgs};

#[allow(clippy::too_many_arguments)]
pub(crate) fn run_theoretical_command(
    tree: &Path,
    start: &Path,
    budget: f64,
    strategy: AllocationStrategy,
    confidence_base: f64,
    seed: u64,
    sa: &SaArgs,
    solver_args: &SolverArgs,
) -> miette::Result<Value> {
    let conf_fn = Expression::geometric_confidence(confidence_base);
    let problem = Problem::uniform(load_tree(tree)?, conf_fn.clone()).into_diagnostic()?;
    let solver = Solver::new(problem, build_backend(solver_args));
    let order = solver.problem().order();
    let mut start_points = PointTable::new(order.clone());
    for row in load_wire_rows::<f64>(order, start, "start points")? {
        start_points.push_map(&row).into_diagnostic()?;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let probabilities = end_point_probabilities(
        &solver,
        &conf_fn,
        &start_points,
        budget,
        strategy,
        &sa_params(sa),
        &mut rng,
    )
    .into_diagnostic()?;
    Ok(json!({
        "strategy": strategy.name(),
        "probabilities": probabilities,
    }))
}
