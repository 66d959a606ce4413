//! In-process `propagate` backend.

use std::collections::BTreeMap;

use astrahl_model::{FaultTree, GateKind, Wire, WireOrder};

use crate::backend::SolverBackend;
use crate::errors::SolverError;
use crate::request::{AlgorithmConfig, PropagateRequest, SplitsRequest};

/// Answers `propagate` requests without an external process, assuming
/// independent wire faults. `splits` is not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferencePropagator;

impl ReferencePropagator {
    /// Top-event probability for a decoded request.
    ///
    /// Point indices address the tree's canonical wire order.
    pub fn evaluate(request: &PropagateRequest) -> Result<f64, SolverError> {
        let tree = FaultTree::from_json(&request.ft)?;
        let order = WireOrder::of(&tree);
        let mut point = BTreeMap::new();
        for entry in &request.point {
            let wire = order.get(entry.index).ok_or_else(|| {
                SolverError::InvalidRequest(format!(
                    "point index {} is outside the {} wires of the tree",
                    entry.index,
                    order.len()
                ))
            })?;
            point.insert(wire.clone(), entry.value);
        }
        propagate(&tree, &point)
    }
}

/// Probability that `tree` fails when wire `w` fails with `point[w]`.
///
/// AND and PAND multiply child probabilities, OR combines them as
/// `p + q - p*q`.
pub fn propagate(tree: &FaultTree, point: &BTreeMap<Wire, f64>) -> Result<f64, SolverError> {
    match tree {
        FaultTree::Wire(wire) => point
            .get(wire)
            .copied()
            .ok_or_else(|| SolverError::MissingPointValue(wire.clone())),
        FaultTree::Gate { kind, children, .. } => {
            let mut probabilities = children.iter().map(|child| propagate(child, point));
            let first = probabilities
                .next()
                .ok_or_else(|| SolverError::InvalidRequest(format!("{kind} gate has no inputs")))??;
            probabilities.try_fold(first, |acc, p| {
                let p = p?;
                Ok(match kind {
                    GateKind::And | GateKind::Pand => acc * p,
                    GateKind::Or => acc + p - acc * p,
                })
            })
        }
    }
}

impl SolverBackend for ReferencePropagator {
    fn splits(&self, _: &SplitsRequest, _: &AlgorithmConfig) -> Result<String, SolverError> {
        Err(SolverError::Unsupported("splits"))
    }

    fn propagate(&self, request: &PropagateRequest) -> Result<String, SolverError> {
        Ok(format!("{:.15}\n", Self::evaluate(request)?))
    }
}
