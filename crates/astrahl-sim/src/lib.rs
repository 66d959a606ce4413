#![doc = include_str!("../README.md")]

pub mod baseline;
pub mod counts;
pub mod errors;
pub mod fault;
pub mod fixing;
pub mod montecarlo;
pub mod theoretical;

pub use baseline::AllocationStrategy;
pub use counts::geometric_fault_counts;
pub use errors::SimError;
pub use fault::{create_fault_distribution, Fault, FaultDistribution};
pub use fixing::{
    batch_system_fault_probability, confidence_from_fault_count, fix_fault_count, fix_faults,
    fix_faults_on_wire, system_fault_probability, wire_fault_chances,
};
pub use montecarlo::MonteCarlo;
pub use theoretical::end_point_probabilities;
