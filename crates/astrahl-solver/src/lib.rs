#![doc = include_str!("../README.md")]

pub mod allocation;
pub mod backend;
pub mod batch;
pub mod errors;
pub mod problem;
pub mod process;
pub mod reference;
pub mod request;
pub mod response;
pub mod solver;
pub mod table;

pub use allocation::{check_allocation, Allocation, Point, SINGLE_CALL_TOLERANCE, TABLE_TOLERANCE};
pub use backend::SolverBackend;
pub use errors::{ContractViolation, SolverError};
pub use problem::Problem;
pub use process::{ProcessSolver, ProcessSolverConfig};
pub use reference::{propagate, ReferencePropagator};
pub use request::{AlgorithmConfig, PropagateRequest, SaHyperParams, SplitsRequest};
pub use solver::Solver;
pub use table::{AllocationTable, FaultCountTable, PointTable, Table};
