// Command handler for: Empirical

use std::path::Path;

use astrahl_sim::MonteCarlo;
use astrahl_solver::{Allocation, FaultCountTable};
use miette::IntoDiagnostic;
use serde_json::{json, Value};

use super::helpers::{load_tree, load_wire_map, load_wire_rows, solver_for};
use crate::cli::SolverArgs;

pub(crate) fn run_empirical_command(
    tree: &Path,
    allocation: &Path,
    counts: &Path,
    monte_carlo: &MonteCarlo,
    solver_args: &SolverArgs,
) -> miette::Result<Value> {
    let solver = solver_for(load_tree(tree)?, None, solver_args)?;
    let order = solver.problem().order();
    let allocation: Allocation = load_wire_map(order, allocation, "allocation")?;
    let mut table = FaultCountTable::new(order.clone());
    for row in load_wire_rows::<u32>(order, counts, "fault counts")? {
        table.push_map(&row).into_diagnostic()?;
    }
    let probabilities = monte_carlo
        .mean_fix_and_prob(&solver, &allocation, &table)
        .into_diagnostic()?;
    Ok(json!({
        "samples": monte_carlo.samples,
        "probabilities": probabilities,
    }))
}
