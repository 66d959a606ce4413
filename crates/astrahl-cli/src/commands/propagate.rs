// Command handler for: Propagate

use std::path::Path;

use astrahl_solver::Point;
use miette::IntoDiagnostic;
use serde_json::{json, Value};

use super::helpers::{load_tree, load_wire_map, solver_for};
use crate::cli::SolverArgs;

pub(crate) fn run_propagate_command(
    tree: &Path,
    point: &Path,
    solver_args: &SolverArgs,
) -> miette::Result<Value> {
    let solver = solver_for(load_tree(tree)?, None, solver_args)?;
    let point: Point = load_wire_map(solver.problem().order(), point, "point")?;
    let probability = solver.calculate_probability(&point).into_diagnostic()?;
    Ok(json!({ "probability": probability }))
}
