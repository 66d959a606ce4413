use astrahl_model::{ModelError, Wire};
use thiserror::Error;

use crate::allocation::Allocation;

/// A solver answer that parsed cleanly but breaks the allocation contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error(
        "allocation sums to {sum} but the budget is {budget} (deviation {deviation:e}): {allocation:?}"
    )]
    BudgetMismatch {
        allocation: Allocation,
        budget: f64,
        sum: f64,
        deviation: f64,
    },
    #[error("wire `{wire}` was allocated a negative amount {value}: {allocation:?}")]
    NegativeAllocation {
        wire: Wire,
        value: f64,
        allocation: Allocation,
    },
    #[error("batch record `{split}` cannot be paired with `{algorithm}`")]
    BatchPairingMismatch { split: String, algorithm: String },
    #[error("batch produced {found} answers for {expected} records")]
    BatchOutputCount { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("fault tree has no wires")]
    EmptyTree,
    #[error("no confidence function for wire `{0}`")]
    MissingConfidenceFunction(Wire),
    #[error("point has no value for wire `{0}`")]
    MissingPointValue(Wire),
    #[error("wire `{0}` is not part of the fault tree")]
    UnknownWire(String),
    #[error("table shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no request file specified")]
    MissingRequestFile,
    #[error("solver executable `{executable}` could not be started: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    #[error("solver `{executable}` exited with {status}: {stderr}")]
    SolverFailed {
        executable: String,
        status: String,
        stderr: String,
    },
    #[error("malformed solver response: {0}")]
    MalformedResponse(String),
    #[error("solver contract violated: {0}")]
    ContractViolation(#[from] ContractViolation),
    #[error("backend does not support `{0}`")]
    Unsupported(&'static str),
    #[error("batch of {0} records exceeds the record naming scheme")]
    BatchTooLarge(usize),
    #[error("solver I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("solver JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
