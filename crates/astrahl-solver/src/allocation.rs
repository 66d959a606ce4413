//! Allocation values and the contract every solver answer must satisfy.

use std::collections::BTreeMap;

use astrahl_model::Wire;

use crate::errors::ContractViolation;

/// Resources assigned per wire.
pub type Allocation = BTreeMap<Wire, f64>;

/// Per-wire operating point fed to the solver.
pub type Point = BTreeMap<Wire, f64>;

/// Tolerance for a single `splits` answer.
pub const SINGLE_CALL_TOLERANCE: f64 = 1e-7;

/// Tolerance for rows of a batch allocation table.
pub const TABLE_TOLERANCE: f64 = 1e-10;

/// Checks that `allocation` spends exactly `budget` (within `tolerance`) and
/// never assigns a negative amount.
pub fn check_allocation(
    allocation: &Allocation,
    budget: f64,
    tolerance: f64,
) -> Result<(), ContractViolation> {
    let sum: f64 = allocation.values().sum();
    let deviation = (sum - budget).abs();
    if deviation.is_nan() || deviation > tolerance {
        return Err(ContractViolation::BudgetMismatch {
            allocation: allocation.clone(),
            budget,
            sum,
            deviation,
        });
    }
    if let Some((wire, value)) = allocation.iter().find(|(_, value)| **value < 0.0) {
        return Err(ContractViolation::NegativeAllocation {
            wire: wire.clone(),
            value: *value,
            allocation: allocation.clone(),
        });
    }
    Ok(())
}
