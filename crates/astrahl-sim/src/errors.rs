use astrahl_model::Wire;
use astrahl_solver::{ContractViolation, SolverError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("fault observability {0} is outside [0, 1]")]
    InvalidObservability(f64),
    #[error("test cost must be positive and finite, got {0}")]
    InvalidTestCost(f64),
    #[error("allowance {0} is not finite")]
    InvalidAllowance(f64),
    #[error("geometric success probability {probability} for wire `{wire}` is outside (0, 1]")]
    InvalidProbability { wire: Wire, probability: f64 },
    #[error("fault distribution has no entry for wire `{0}`")]
    UnknownWire(Wire),
    #[error("allocation weight {weight} for wire `{wire}` is negative or not a number")]
    InvalidWeight { wire: Wire, weight: f64 },
    #[error("allocation weights sum to {0}")]
    InvalidWeightTotal(f64),
    #[error("no wires to allocate to")]
    NoWires,
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Monte Carlo needs at least one sample")]
    NoSamples,
    #[error("`{0}` is not a baseline strategy")]
    NotABaseline(&'static str),
    #[error("failed to build sampling distribution: {0}")]
    Distribution(String),
}

impl From<ContractViolation> for SimError {
    fn from(violation: ContractViolation) -> Self {
        SimError::Solver(SolverError::ContractViolation(violation))
    }
}
