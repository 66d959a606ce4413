//! Spending allowances on testing to remove faults.
//!
//! An allowance buys `allowance / test_cost` test rounds. Every full round
//! finds each remaining fault with probability equal to its observability;
//! the fractional last round with `1 - (1 - observability)^fraction`.

use std::collections::BTreeMap;

use astrahl_model::Wire;
use astrahl_solver::{Allocation, PointTable, Solver, SolverBackend};
use rand::Rng;
use tracing::info;

use crate::errors::SimError;
use crate::fault::{Fault, FaultDistribution};

fn check_test_cost(test_cost: f64) -> Result<(), SimError> {
    if !(test_cost.is_finite() && test_cost > 0.0) {
        return Err(SimError::InvalidTestCost(test_cost));
    }
    Ok(())
}

fn test_rounds(allowance: f64, test_cost: f64) -> Result<f64, SimError> {
    check_test_cost(test_cost)?;
    if allowance.is_infinite() {
        return Err(SimError::InvalidAllowance(allowance));
    }
    Ok(allowance / test_cost)
}

fn detection_chance(observability: f64, factor: f64) -> f64 {
    1.0 - (1.0 - observability).powf(factor)
}

/// Faults of one wire that survive testing with `allowance`.
pub fn fix_faults_on_wire<R: Rng + ?Sized>(
    allowance: f64,
    faults: &[Fault],
    test_cost: f64,
    rng: &mut R,
) -> Result<Vec<Fault>, SimError> {
    let mut rounds = test_rounds(allowance, test_cost)?;
    let mut remaining = faults.to_vec();
    while rounds > 0.0 && !remaining.is_empty() {
        let factor = rounds.min(1.0);
        rounds -= 1.0;
        remaining.retain(|fault| {
            let draw: f64 = rng.gen();
            draw >= detection_chance(fault.observability(), factor)
        });
    }
    Ok(remaining)
}

/// Count-based variant of [`fix_faults_on_wire`] where all faults share
/// `observability`.
pub fn fix_fault_count<R: Rng + ?Sized>(
    allowance: f64,
    count: u32,
    observability: f64,
    test_cost: f64,
    rng: &mut R,
) -> Result<u32, SimError> {
    let mut rounds = test_rounds(allowance, test_cost)?;
    let mut remaining = count;
    while rounds > 0.0 && remaining > 0 {
        let factor = rounds.min(1.0);
        rounds -= 1.0;
        let chance = detection_chance(observability, factor);
        let found = (0..remaining).filter(|_| rng.gen::<f64>() < chance).count() as u32;
        remaining -= found;
    }
    Ok(remaining)
}

/// Copy of `distribution` after testing each wire with its allowance.
pub fn fix_faults<R: Rng + ?Sized>(
    allocation: &Allocation,
    distribution: &FaultDistribution,
    test_cost: f64,
    rng: &mut R,
) -> Result<FaultDistribution, SimError> {
    check_test_cost(test_cost)?;
    let mut fixed = distribution.clone();
    for (wire, allowance) in allocation {
        let faults = fixed
            .get_mut(wire)
            .ok_or_else(|| SimError::UnknownWire(wire.clone()))?;
        let before = faults.len();
        *faults = fix_faults_on_wire(*allowance, faults, test_cost, rng)?;
        info!(%wire, allowance, before, after = faults.len(), "testing effect");
    }
    Ok(fixed)
}

/// Per-wire chance that at least one remaining fault manifests.
pub fn wire_fault_chances(distribution: &FaultDistribution) -> BTreeMap<Wire, f64> {
    distribution
        .iter()
        .map(|(wire, faults)| {
            let clean: f64 = faults.iter().map(|f| 1.0 - f.observability()).product();
            (wire.clone(), 1.0 - clean)
        })
        .collect()
}

/// Failure probability of the system given the faults left on its wires.
pub fn system_fault_probability<B: SolverBackend>(
    solver: &Solver<B>,
    distribution: &FaultDistribution,
) -> Result<f64, SimError> {
    let chances = wire_fault_chances(distribution);
    let probability = solver.calculate_probability(&chances)?;
    info!(probability, "system fault chance");
    Ok(probability)
}

pub fn batch_system_fault_probability<B: SolverBackend>(
    solver: &Solver<B>,
    distributions: &[FaultDistribution],
) -> Result<Vec<f64>, SimError> {
    let mut chances = PointTable::new(solver.problem().order().clone());
    for distribution in distributions {
        chances.push_map(&wire_fault_chances(distribution))?;
    }
    Ok(solver.batch_calculate_probability(&chances)?)
}

/// Chance that a wire with `count` faults fails, all faults sharing
/// `fault_observability`.
pub fn confidence_from_fault_count(count: u32, fault_observability: f64) -> f64 {
    1.0 - (1.0 - fault_observability).powf(f64::from(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrahl_model::FaultTree;
    use astrahl_solver::{Problem, ReferencePropagator};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn faults(observabilities: &[f64]) -> Vec<Fault> {
        observabilities
            .iter()
            .map(|o| Fault::new(*o).unwrap())
            .collect()
    }

    #[test]
    fn zero_allowance_changes_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let before = faults(&[0.5, 0.9, 0.1]);
        let after = fix_faults_on_wire(0.0, &before, 10.0, &mut rng).unwrap();
        assert_eq!(after, before);
        assert_eq!(fix_fault_count(0.0, 7, 0.5, 10.0, &mut rng).unwrap(), 7);
    }

    #[test]
    fn huge_allowance_removes_everything() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let before = faults(&[0.5, 0.9, 0.1, 0.05]);
        assert!(fix_faults_on_wire(1e5, &before, 10.0, &mut rng)
            .unwrap()
            .is_empty());
        assert_eq!(fix_fault_count(1e5, 50, 0.1, 10.0, &mut rng).unwrap(), 0);
    }

    #[test]
    fn unobservable_faults_survive() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let before = faults(&[0.0, 0.0]);
        assert_eq!(
            fix_faults_on_wire(500.0, &before, 1.0, &mut rng).unwrap().len(),
            2
        );
    }

    #[test]
    fn more_allowance_fixes_more_on_average() {
        let mean_remaining = |allowance: f64| {
            let mut rng = ChaCha8Rng::seed_from_u64(17);
            let total: u32 = (0..400)
                .map(|_| fix_fault_count(allowance, 20, 0.1, 10.0, &mut rng).unwrap())
                .sum();
            f64::from(total) / 400.0
        };
        let low = mean_remaining(10.0);
        let mid = mean_remaining(50.0);
        let high = mean_remaining(200.0);
        assert!(low > mid && mid > high, "{low} {mid} {high}");
        // one full round at observability 0.1 leaves 90% of 20 faults
        assert!((low - 18.0).abs() < 0.5, "{low}");
    }

    #[test]
    fn invalid_test_cost_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(matches!(
            fix_fault_count(1.0, 1, 0.5, 0.0, &mut rng),
            Err(SimError::InvalidTestCost(_))
        ));
        assert!(matches!(
            fix_fault_count(f64::INFINITY, 1, 0.5, 1.0, &mut rng),
            Err(SimError::InvalidAllowance(_))
        ));
    }

    #[test]
    fn fix_faults_leaves_input_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let distribution = FaultDistribution::from([
            (Wire::new("a"), faults(&[0.9, 0.9, 0.9])),
            (Wire::new("b"), faults(&[0.9])),
        ]);
        let allocation = Allocation::from([(Wire::new("a"), 1000.0), (Wire::new("b"), 0.0)]);
        let fixed = fix_faults(&allocation, &distribution, 10.0, &mut rng).unwrap();
        assert!(fixed[&Wire::new("a")].is_empty());
        assert_eq!(fixed[&Wire::new("b")].len(), 1);
        assert_eq!(distribution[&Wire::new("a")].len(), 3);

        let stray = Allocation::from([(Wire::new("z"), 1.0)]);
        assert!(matches!(
            fix_faults(&stray, &distribution, 10.0, &mut rng),
            Err(SimError::UnknownWire(_))
        ));
    }

    #[test]
    fn fault_chances_combine_independently() {
        let distribution = FaultDistribution::from([
            (Wire::new("a"), faults(&[0.5, 0.5])),
            (Wire::new("b"), Vec::new()),
        ]);
        let chances = wire_fault_chances(&distribution);
        assert!((chances[&Wire::new("a")] - 0.75).abs() < 1e-15);
        assert_eq!(chances[&Wire::new("b")], 0.0);
    }

    #[test]
    fn system_probability_uses_wire_chances() {
        let tree = FaultTree::or(FaultTree::wire("a"), FaultTree::wire("b"));
        let solver = Solver::new(Problem::without_confidence(tree).unwrap(), ReferencePropagator);
        let distribution = FaultDistribution::from([
            (Wire::new("a"), faults(&[0.5])),
            (Wire::new("b"), Vec::new()),
        ]);
        let p = system_fault_probability(&solver, &distribution).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
        let batch =
            batch_system_fault_probability(&solver, &[distribution.clone(), distribution]).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|q| (q - 0.5).abs() < 1e-12));
    }

    #[test]
    fn confidence_from_counts() {
        assert_eq!(confidence_from_fault_count(0, 0.1), 0.0);
        assert!((confidence_from_fault_count(1, 0.1) - 0.1).abs() < 1e-15);
        assert!((confidence_from_fault_count(2, 0.1) - 0.19).abs() < 1e-15);
    }
}
