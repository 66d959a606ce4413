//! Reference allocation strategies to compare solver splits against.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use astrahl_model::Wire;
use astrahl_solver::{
    check_allocation, Allocation, Point, SaHyperParams, Solver, SolverBackend, SolverError,
    SINGLE_CALL_TOLERANCE,
};
use rand::Rng;

use crate::errors::SimError;

/// Equal share for every wire.
pub fn uniform(current: &BTreeMap<Wire, f64>, allowance: f64) -> Result<Allocation, SimError> {
    if current.is_empty() {
        return Err(SimError::NoWires);
    }
    let share = allowance / current.len() as f64;
    let allocation = current.keys().map(|w| (w.clone(), share)).collect();
    check_allocation(&allocation, allowance, SINGLE_CALL_TOLERANCE)?;
    Ok(allocation)
}

/// Shares proportional to each wire's lack of confidence. Falls back to
/// [`uniform`] when every wire is fully confident. Confidences above 1 are
/// rejected.
pub fn proportional(current: &BTreeMap<Wire, f64>, allowance: f64) -> Result<Allocation, SimError> {
    let weights: BTreeMap<Wire, f64> = current
        .iter()
        .map(|(w, confidence)| (w.clone(), 1.0 - confidence))
        .collect();
    normalized(weights, allowance)
}

/// Shares proportional to independent uniform draws.
pub fn random<R: Rng + ?Sized>(
    current: &BTreeMap<Wire, f64>,
    allowance: f64,
    rng: &mut R,
) -> Result<Allocation, SimError> {
    let weights = current
        .keys()
        .map(|w| (w.clone(), rng.gen::<f64>()))
        .collect();
    normalized(weights, allowance)
}

fn normalized(weights: BTreeMap<Wire, f64>, allowance: f64) -> Result<Allocation, SimError> {
    if let Some((wire, weight)) = weights.iter().find(|(_, weight)| !(**weight >= 0.0)) {
        return Err(SimError::InvalidWeight {
            wire: wire.clone(),
            weight: *weight,
        });
    }
    let total: f64 = weights.values().sum();
    if total == 0.0 {
        return uniform(&weights, allowance);
    }
    if !total.is_finite() {
        return Err(SimError::InvalidWeightTotal(total));
    }
    let allocation = weights
        .into_iter()
        .map(|(w, weight)| (w, weight / total * allowance))
        .collect();
    check_allocation(&allocation, allowance, SINGLE_CALL_TOLERANCE)?;
    Ok(allocation)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    Uniform,
    Proportional,
    Random,
    Solver,
}

impl AllocationStrategy {
    pub const ALL: [AllocationStrategy; 4] = [
        AllocationStrategy::Uniform,
        AllocationStrategy::Proportional,
        AllocationStrategy::Random,
        AllocationStrategy::Solver,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AllocationStrategy::Uniform => "uniform",
            AllocationStrategy::Proportional => "proportional",
            AllocationStrategy::Random => "random",
            AllocationStrategy::Solver => "solver",
        }
    }

    /// Split `allowance` given current per-wire confidences. Only the
    /// baseline strategies apply here.
    pub fn baseline<R: Rng + ?Sized>(
        self,
        current: &BTreeMap<Wire, f64>,
        allowance: f64,
        rng: &mut R,
    ) -> Result<Allocation, SimError> {
        match self {
            AllocationStrategy::Uniform => uniform(current, allowance),
            AllocationStrategy::Proportional => proportional(current, allowance),
            AllocationStrategy::Random => random(current, allowance, rng),
            AllocationStrategy::Solver => Err(SimError::NotABaseline(self.name())),
        }
    }

    /// Split `allowance` for `point`. Baselines read current confidences
    /// from the solver's per-wire confidence functions.
    pub fn allocate<B: SolverBackend, R: Rng + ?Sized>(
        self,
        solver: &Solver<B>,
        params: &SaHyperParams,
        point: &Point,
        allowance: f64,
        rng: &mut R,
    ) -> Result<Allocation, SimError> {
        if self == AllocationStrategy::Solver {
            return Ok(solver.calculate_allowances(point, allowance, params)?);
        }
        let problem = solver.problem();
        let mut current = BTreeMap::new();
        for wire in problem.order() {
            let function = problem
                .confidence(wire)
                .ok_or_else(|| SolverError::MissingConfidenceFunction(wire.clone()))?;
            let value = point
                .get(wire)
                .ok_or_else(|| SolverError::MissingPointValue(wire.clone()))?;
            current.insert(wire.clone(), function.eval(*value));
        }
        self.baseline(&current, allowance, rng)
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AllocationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                format!("unknown strategy `{s}` (expected uniform, proportional, random or solver)")
            })
    }
}
