//! Parsing of the solver's textual answers.

use std::collections::BTreeMap;

use astrahl_model::WireOrder;

use crate::allocation::{check_allocation, Allocation, SINGLE_CALL_TOLERANCE};
use crate::errors::SolverError;

/// Last non-empty line of solver output.
pub fn last_line(output: &str) -> Option<&str> {
    output.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// First line of solver output.
pub fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|l| !l.is_empty())
}

/// Parses one `index=value` line into an allocation over `order`.
///
/// Every wire must receive exactly one value. No contract check is made.
pub fn parse_allocation_line(line: &str, order: &WireOrder) -> Result<Allocation, SolverError> {
    let mut by_index = BTreeMap::new();
    for token in line.split_whitespace() {
        let (index, value) = token.split_once('=').ok_or_else(|| {
            SolverError::MalformedResponse(format!("token `{token}` is not `index=value`"))
        })?;
        let index: usize = index.parse().map_err(|_| {
            SolverError::MalformedResponse(format!("`{index}` is not a wire index"))
        })?;
        let value: f64 = value.parse().map_err(|_| {
            SolverError::MalformedResponse(format!("`{value}` is not a number"))
        })?;
        let wire = order.get(index).ok_or_else(|| {
            SolverError::MalformedResponse(format!(
                "index {index} is outside the {} wires of the tree",
                order.len()
            ))
        })?;
        if by_index.insert(wire.clone(), value).is_some() {
            return Err(SolverError::MalformedResponse(format!(
                "wire index {index} appears twice"
            )));
        }
    }
    if let Some(missing) = order.iter().find(|w| !by_index.contains_key(*w)) {
        return Err(SolverError::MalformedResponse(format!(
            "no value for wire `{missing}`"
        )));
    }
    Ok(by_index)
}

/// Parses a full `splits` answer and enforces the allocation contract
/// against `budget`.
pub fn parse_allocation(
    output: &str,
    order: &WireOrder,
    budget: f64,
) -> Result<Allocation, SolverError> {
    let line = last_line(output)
        .ok_or_else(|| SolverError::MalformedResponse("empty splits output".to_string()))?;
    let allocation = parse_allocation_line(line, order)?;
    check_allocation(&allocation, budget, SINGLE_CALL_TOLERANCE)?;
    Ok(allocation)
}

/// Parses a `propagate` answer: the first line is the probability.
pub fn parse_probability(output: &str) -> Result<f64, SolverError> {
    let line = first_line(output)
        .ok_or_else(|| SolverError::MalformedResponse("empty propagate output".to_string()))?;
    line.parse().map_err(|_| {
        SolverError::MalformedResponse(format!("`{line}` is not a probability"))
    })
}
