use astrahl_solver::{Allocation, FaultCountTable, PointTable, Solver, SolverBackend};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::errors::SimError;
use crate::fixing::{confidence_from_fault_count, fix_fault_count};

/// Repeated fix-then-propagate estimation of system failure probability.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarlo {
    pub samples: usize,
    pub test_cost: f64,
    pub fault_observability: f64,
    pub seed: u64,
}

impl Default for MonteCarlo {
    fn default() -> Self {
        Self {
            samples: 100,
            test_cost: 10.0,
            fault_observability: 0.1,
            seed: 0,
        }
    }
}

impl MonteCarlo {
    /// Mean failure probability per row of `fault_counts` after every cell
    /// is tested with the allowance `allocation` gives its wire.
    ///
    /// Repetitions run in parallel, each on its own ChaCha stream of `seed`,
    /// so results do not depend on scheduling.
    pub fn mean_fix_and_prob<B: SolverBackend + Sync>(
        &self,
        solver: &Solver<B>,
        allocation: &Allocation,
        fault_counts: &FaultCountTable,
    ) -> Result<Vec<f64>, SimError> {
        if self.samples == 0 {
            return Err(SimError::NoSamples);
        }
        let columns = fault_counts.columns();
        if allocation.len() != columns.len() || !columns.iter().all(|w| allocation.contains_key(w))
        {
            return Err(SimError::ShapeMismatch(format!(
                "allocation covers {} wires, fault counts cover {}",
                allocation.len(),
                columns.len()
            )));
        }
        let allowances: Vec<f64> = allocation.values().copied().collect();

        info!(
            samples = self.samples,
            rows = fault_counts.len(),
            "running Monte Carlo fault fixing"
        );
        let runs = (0..self.samples)
            .into_par_iter()
            .map(|repetition| self.repetition(solver, &allowances, fault_counts, repetition))
            .collect::<Result<Vec<_>, _>>()?;

        let mut means = vec![0.0; fault_counts.len()];
        for run in &runs {
            for (mean, p) in means.iter_mut().zip(run) {
                *mean += p;
            }
        }
        for mean in &mut means {
            *mean /= self.samples as f64;
        }
        Ok(means)
    }

    fn repetition<B: SolverBackend>(
        &self,
        solver: &Solver<B>,
        allowances: &[f64],
        fault_counts: &FaultCountTable,
        repetition: usize,
    ) -> Result<Vec<f64>, SimError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(repetition as u64);

        let mut fixed = FaultCountTable::new(fault_counts.columns().clone());
        for row in fault_counts.rows() {
            let remaining = row
                .iter()
                .zip(allowances)
                .map(|(&count, &allowance)| {
                    fix_fault_count(
                        allowance,
                        count,
                        self.fault_observability,
                        self.test_cost,
                        &mut rng,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            fixed.push_row(remaining)?;
        }
        let chances: PointTable =
            fixed.map(|&count| confidence_from_fault_count(count, self.fault_observability));
        let probabilities = solver.batch_calculate_probability(&chances)?;
        debug!(repetition, "Monte Carlo repetition done");
        Ok(probabilities)
    }
}
