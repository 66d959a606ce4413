use astrahl_model::Expression;
use astrahl_solver::{
    check_allocation, AllocationTable, PointTable, SaHyperParams, Solver, SolverBackend,
    TABLE_TOLERANCE,
};
use rand::Rng;
use tracing::info;

use crate::baseline::AllocationStrategy;
use crate::errors::SimError;

/// Probability at the end point of each start row: the row's split under
/// `strategy` is added to the start point, mapped through `conf_fn`, and
/// propagated in one batch.
pub fn end_point_probabilities<B: SolverBackend, R: Rng + ?Sized>(
    solver: &Solver<B>,
    conf_fn: &Expression,
    start_points: &PointTable,
    budget: f64,
    strategy: AllocationStrategy,
    params: &SaHyperParams,
    rng: &mut R,
) -> Result<Vec<f64>, SimError> {
    let splits = match strategy {
        AllocationStrategy::Solver => solver.batch_calculate_splits(start_points, budget, params)?,
        baseline => {
            let mut splits = AllocationTable::new(start_points.columns().clone());
            for start in start_points.row_maps() {
                let current = start
                    .into_iter()
                    .map(|(wire, value)| (wire, conf_fn.eval(value)))
                    .collect();
                let allocation = baseline.baseline(&current, budget, rng)?;
                check_allocation(&allocation, budget, TABLE_TOLERANCE)?;
                splits.push_map(&allocation)?;
            }
            splits
        }
    };
    info!(%strategy, rows = splits.len(), budget, "computed end-point splits");
    let end_points =
        start_points.zip_with(&splits, |start, split| conf_fn.eval(start + split))?;
    Ok(solver.batch_calculate_probability(&end_points)?)
}
