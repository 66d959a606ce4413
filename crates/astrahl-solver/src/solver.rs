use tracing::{debug, info};

use crate::allocation::{check_allocation, Allocation, Point, TABLE_TOLERANCE};
use crate::backend::SolverBackend;
use crate::errors::{ContractViolation, SolverError};
use crate::problem::Problem;
use crate::request::SaHyperParams;
use crate::response::{parse_allocation, parse_allocation_line, parse_probability};
use crate::table::{AllocationTable, PointTable};

/// A [`Problem`] bound to a backend that answers its requests.
#[derive(Debug, Clone)]
pub struct Solver<B> {
    problem: Problem,
    backend: B,
}

impl<B: SolverBackend> Solver<B> {
    pub fn new(problem: Problem, backend: B) -> Self {
        Self { problem, backend }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Split `budget` across the wires starting from `point`.
    pub fn calculate_allowances(
        &self,
        point: &Point,
        budget: f64,
        params: &SaHyperParams,
    ) -> Result<Allocation, SolverError> {
        let (request, algorithm) = self.problem.splits_request(point, budget, params)?;
        let output = self.backend.splits(&request, &algorithm)?;
        parse_allocation(&output, self.problem.order(), budget)
    }

    /// Probability of the top event given per-wire fault probabilities.
    pub fn calculate_probability(&self, point: &Point) -> Result<f64, SolverError> {
        let request = self.problem.propagate_request(point)?;
        let output = self.backend.propagate(&request)?;
        parse_probability(&output)
    }

    /// One allocation row per row of `points`, all under the same budget.
    pub fn batch_calculate_splits(
        &self,
        points: &PointTable,
        budget: f64,
        params: &SaHyperParams,
    ) -> Result<AllocationTable, SolverError> {
        self.check_columns(points)?;
        let requests = points
            .row_maps()
            .map(|point| self.problem.splits_request(&point, budget, params))
            .collect::<Result<Vec<_>, _>>()?;
        info!(records = requests.len(), budget, "running batch splits");
        let lines = self.backend.splits_bulk(&requests)?;
        expect_count(requests.len(), lines.len())?;

        let mut table = AllocationTable::new(self.problem.order().clone());
        for line in &lines {
            let allocation = parse_allocation_line(line, self.problem.order())?;
            check_allocation(&allocation, budget, TABLE_TOLERANCE)?;
            table.push_map(&allocation)?;
        }
        debug!(rows = table.len(), "batch splits validated");
        Ok(table)
    }

    /// One top-event probability per row of `points`.
    pub fn batch_calculate_probability(&self, points: &PointTable) -> Result<Vec<f64>, SolverError> {
        self.check_columns(points)?;
        let requests = points
            .row_maps()
            .map(|point| self.problem.propagate_request(&point))
            .collect::<Result<Vec<_>, _>>()?;
        info!(records = requests.len(), "running batch propagate");
        let lines = self.backend.propagate_bulk(&requests)?;
        expect_count(requests.len(), lines.len())?;
        lines.iter().map(String::as_str).map(parse_probability).collect()
    }

    fn check_columns(&self, points: &PointTable) -> Result<(), SolverError> {
        if points.columns() != self.problem.order() {
            return Err(SolverError::ShapeMismatch(
                "point table columns differ from the tree's wires".to_string(),
            ));
        }
        Ok(())
    }
}

fn expect_count(expected: usize, found: usize) -> Result<(), SolverError> {
    if expected != found {
        return Err(ContractViolation::BatchOutputCount { expected, found }.into());
    }
    Ok(())
}
