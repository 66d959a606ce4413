use std::collections::BTreeMap;

use astrahl_model::{FaultTree, Wire};
use astrahl_sim::{create_fault_distribution, fix_fault_count, fix_faults, MonteCarlo};
use astrahl_solver::{Allocation, FaultCountTable, Problem, ReferencePropagator, Solver};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn wires(n: usize) -> Vec<Wire> {
    (0..n).map(|i| Wire::new(format!("Wire {i}"))).collect()
}

fn bench_fix_fault_count(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    c.bench_function("fix_fault_count_20_faults_100_rounds", |b| {
        b.iter(|| fix_fault_count(black_box(1000.0), 20, 0.1, 10.0, &mut rng))
    });
}

fn bench_fix_faults(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let confidences: BTreeMap<Wire, f64> = wires(8).into_iter().map(|w| (w, 0.1)).collect();
    let distribution = create_fault_distribution(&confidences, 200, 3, &mut rng).unwrap();
    let allocation: Allocation = confidences.keys().map(|w| (w.clone(), 50.0)).collect();
    c.bench_function("fix_faults_8_wires_200_faults", |b| {
        b.iter(|| fix_faults(black_box(&allocation), black_box(&distribution), 10.0, &mut rng))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let tree = FaultTree::and(
        FaultTree::or(FaultTree::wire("Wire 0"), FaultTree::wire("Wire 1")),
        FaultTree::or(FaultTree::wire("Wire 2"), FaultTree::wire("Wire 3")),
    );
    let solver = Solver::new(Problem::without_confidence(tree).unwrap(), ReferencePropagator);
    let counts =
        FaultCountTable::repeat(solver.problem().order().clone(), vec![3, 4, 5, 6], 20).unwrap();
    let allocation: Allocation = wires(4).into_iter().map(|w| (w, 25.0)).collect();
    let mc = MonteCarlo {
        samples: 50,
        ..MonteCarlo::default()
    };
    c.bench_function("monte_carlo_50_samples_20_rows", |b| {
        b.iter(|| mc.mean_fix_and_prob(&solver, black_box(&allocation), &counts))
    });
}

criterion_group!(
    benches,
    bench_fix_fault_count,
    bench_fix_faults,
    bench_monte_carlo
);
criterion_main!(benches);
