use std::collections::BTreeMap;

use astrahl_model::{FaultTree, Wire};
use astrahl_sim::baseline::{proportional, random, uniform};
use astrahl_sim::{create_fault_distribution, fix_faults, wire_fault_chances, MonteCarlo};
use astrahl_solver::{
    check_allocation, Allocation, FaultCountTable, Problem, ReferencePropagator, Solver,
    SINGLE_CALL_TOLERANCE,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn confidences() -> impl Strategy<Value = BTreeMap<Wire, f64>> {
    proptest::collection::btree_map("[a-h]", 0.0f64..=1.0, 1..6).prop_map(|m| {
        m.into_iter()
            .map(|(name, conf)| (Wire::new(name), conf))
            .collect()
    })
}

proptest! {
    #[test]
    fn baselines_spend_exactly_the_budget(
        current in confidences(),
        budget in 0.0f64..1000.0,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for allocation in [
            uniform(&current, budget).unwrap(),
            proportional(&current, budget).unwrap(),
            random(&current, budget, &mut rng).unwrap(),
        ] {
            prop_assert_eq!(allocation.len(), current.len());
            prop_assert!(check_allocation(&allocation, budget, SINGLE_CALL_TOLERANCE).is_ok());
        }
    }

    #[test]
    fn fixing_never_adds_faults(
        current in confidences(),
        allowance in 0.0f64..500.0,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let distribution = create_fault_distribution(&current, 20, 2, &mut rng).unwrap();
        let allocation: Allocation = current.keys().map(|w| (w.clone(), allowance)).collect();
        let fixed = fix_faults(&allocation, &distribution, 10.0, &mut rng).unwrap();
        for (wire, faults) in &fixed {
            prop_assert!(faults.len() <= distribution[wire].len());
        }
        let before = wire_fault_chances(&distribution);
        for (wire, chance) in wire_fault_chances(&fixed) {
            prop_assert!(chance <= before[&wire] + 1e-12);
        }
    }
}

fn and_of_or() -> Solver<ReferencePropagator> {
    let tree = FaultTree::and(
        FaultTree::wire("a"),
        FaultTree::or(FaultTree::wire("b"), FaultTree::wire("c")),
    );
    Solver::new(Problem::without_confidence(tree).unwrap(), ReferencePropagator)
}

fn even(total: f64) -> Allocation {
    ["a", "b", "c"]
        .into_iter()
        .map(|name| (Wire::new(name), total / 3.0))
        .collect()
}

#[test]
fn monte_carlo_is_stable_across_seeds() {
    let solver = and_of_or();
    let counts =
        FaultCountTable::repeat(solver.problem().order().clone(), vec![4, 2, 3], 3).unwrap();
    let estimate = |seed| {
        MonteCarlo {
            samples: 500,
            seed,
            ..MonteCarlo::default()
        }
        .mean_fix_and_prob(&solver, &even(60.0), &counts)
        .unwrap()
    };
    let first = estimate(1);
    let second = estimate(2);
    for (p, q) in first.iter().zip(&second) {
        assert!((p - q).abs() < 0.02, "{p} vs {q}");
    }
}

#[test]
fn more_budget_lowers_empirical_failure() {
    let solver = and_of_or();
    let counts =
        FaultCountTable::repeat(solver.problem().order().clone(), vec![5, 5, 5], 1).unwrap();
    let mc = MonteCarlo {
        samples: 300,
        seed: 42,
        ..MonteCarlo::default()
    };
    let none = mc.mean_fix_and_prob(&solver, &even(0.0), &counts).unwrap()[0];
    let some = mc.mean_fix_and_prob(&solver, &even(90.0), &counts).unwrap()[0];
    let lots = mc.mean_fix_and_prob(&solver, &even(900.0), &counts).unwrap()[0];
    assert!(none > some && some > lots, "{none} {some} {lots}");
}
