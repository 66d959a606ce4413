// Command handler for: Splits

use std::path::Path;

use astrahl_solver::Point;
use miette::IntoDiagnostic;
use serde_json::Value;
use tracing::info;

use super::helpers::{load_tree, load_wire_map, sa_params, solver_for, wire_object};
use crate::cli::{ConfidenceArgs, SaArgs, SolverArgs};

pub(crate) fn run_splits_command(
    tree: &Path,
    point: &Path,
    budget: f64,
    confidence: &ConfidenceArgs,
    sa: &SaArgs,
    solver_args: &SolverArgs,
) -> miette::Result<Value> {
    let solver = solver_for(load_tree(tree)?, Some(confidence), solver_args)?;
    let point: Point = load_wire_map(solver.problem().order(), point, "point")?;
    let allocation = solver
        .calculate_allowances(&point, budget, &sa_params(sa))
        .into_diagnostic()?;
    info!(budget, wires = allocation.len(), "received split");
    Ok(wire_object(&allocation))
}
