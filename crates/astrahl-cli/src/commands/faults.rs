// Command handler for: Faults
//
// Scatters faults according to current wire confidences, reports the
// resulting system failure probability, and optionally the probability
// after testing with a given allocation.

use std::collections::BTreeMap;
use std::path::Path;

use astrahl_sim::{
    create_fault_distribution, fix_faults, system_fault_probability, FaultDistribution,
};
use astrahl_solver::{Allocation, Point};
use miette::{miette, IntoDiagnostic};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::helpers::{load_tree, load_wire_map, solver_for};
use crate::cli::{ConfidenceArgs, SolverArgs};

#[derive(Debug, Serialize)]
pub(crate) struct FaultSummary {
    pub(crate) faults: BTreeMap<String, usize>,
    pub(crate) probability: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct FaultReport {
    pub(crate) scattered: usize,
    pub(crate) initial: FaultSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) after_testing: Option<FaultSummary>,
}

fn fault_counts(distribution: &FaultDistribution) -> BTreeMap<String, usize> {
    distribution
        .iter()
        .map(|(wire, faults)| (wire.name().to_string(), faults.len()))
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn run_faults_command(
    tree: &Path,
    point: &Path,
    faults: usize,
    drop_limit: u32,
    allocation: Option<&Path>,
    test_cost: f64,
    seed: u64,
    confidence: &ConfidenceArgs,
    solver_args: &SolverArgs,
) -> miette::Result<Value> {
    let solver = solver_for(load_tree(tree)?, Some(confidence), solver_args)?;
    let problem = solver.problem();
    let point: Point = load_wire_map(problem.order(), point, "point")?;

    let mut current = BTreeMap::new();
    for wire in problem.order() {
        let function = problem
            .confidence(wire)
            .ok_or_else(|| miette!("no confidence function for `{wire}`"))?;
        let position = point
            .get(wire)
            .ok_or_else(|| miette!("point has no value for `{wire}`"))?;
        current.insert(wire.clone(), function.eval(*position));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let distribution =
        create_fault_distribution(&current, faults, drop_limit, &mut rng).into_diagnostic()?;
    let initial = FaultSummary {
        faults: fault_counts(&distribution),
        probability: system_fault_probability(&solver, &distribution).into_diagnostic()?,
    };

    let after_testing = match allocation {
        Some(path) => {
            let allocation: Allocation = load_wire_map(problem.order(), path, "allocation")?;
            let fixed =
                fix_faults(&allocation, &distribution, test_cost, &mut rng).into_diagnostic()?;
            let summary = FaultSummary {
                faults: fault_counts(&fixed),
                probability: system_fault_probability(&solver, &fixed).into_diagnostic()?,
            };
            info!(
                before = initial.probability,
                after = summary.probability,
                "tested faults"
            );
            Some(summary)
        }
        None => None,
    };

    serde_json::to_value(FaultReport {
        scattered: faults,
        initial,
        after_testing,
    })
    .into_diagnostic()
}
