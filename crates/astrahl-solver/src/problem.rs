use std::collections::BTreeMap;

use astrahl_model::{Expression, FaultTree, Wire, WireOrder};
use tracing::debug;

use crate::allocation::Point;
use crate::errors::SolverError;
use crate::request::{
    AlgorithmConfig, ConfidenceEntry, NamedPointEntry, PointEntry, PropagateRequest,
    SaHyperParams, SplitsRequest,
};

/// A fault tree together with the confidence functions of its wires.
///
/// Each wire has a positive function (probability the wire is fault-free
/// given the resources spent on it) and a negative one. Only the positive
/// side is user-supplied; the negative side is the constant 0.
#[derive(Debug, Clone)]
pub struct Problem {
    tree: FaultTree,
    order: WireOrder,
    confidence: BTreeMap<Wire, (Expression, Expression)>,
}

impl Problem {
    pub fn new(
        tree: FaultTree,
        confidence: BTreeMap<Wire, Expression>,
    ) -> Result<Self, SolverError> {
        let order = WireOrder::of(&tree);
        if order.is_empty() {
            return Err(SolverError::EmptyTree);
        }
        if let Some(extra) = confidence.keys().find(|w| order.index_of(w).is_none()) {
            return Err(SolverError::UnknownWire(extra.name().to_string()));
        }
        if let Some(missing) = order.iter().find(|w| !confidence.contains_key(*w)) {
            return Err(SolverError::MissingConfidenceFunction(missing.clone()));
        }
        if let Some((wire, _)) = confidence.iter().find(|(_, f)| !f.is_encodable()) {
            return Err(SolverError::InvalidRequest(format!(
                "confidence function for `{wire}` has a non-finite constant"
            )));
        }
        Ok(Self::assemble(tree, order, confidence))
    }

    /// A problem usable for `propagate` requests only.
    pub fn without_confidence(tree: FaultTree) -> Result<Self, SolverError> {
        let order = WireOrder::of(&tree);
        if order.is_empty() {
            return Err(SolverError::EmptyTree);
        }
        Ok(Self::assemble(tree, order, BTreeMap::new()))
    }

    fn assemble(
        tree: FaultTree,
        order: WireOrder,
        confidence: BTreeMap<Wire, Expression>,
    ) -> Self {
        let confidence = confidence
            .into_iter()
            .map(|(wire, positive)| (wire, (positive, Expression::constant(0.0))))
            .collect();
        Self {
            tree,
            order,
            confidence,
        }
    }

    /// Every wire gets a copy of `function`.
    pub fn uniform(tree: FaultTree, function: Expression) -> Result<Self, SolverError> {
        let confidence = tree
            .wires()
            .into_iter()
            .map(|wire| (wire, function.clone()))
            .collect();
        Self::new(tree, confidence)
    }

    pub fn tree(&self) -> &FaultTree {
        &self.tree
    }

    pub fn order(&self) -> &WireOrder {
        &self.order
    }

    pub fn confidence(&self, wire: &Wire) -> Option<&Expression> {
        self.confidence.get(wire).map(|(positive, _)| positive)
    }

    pub fn has_confidence(&self) -> bool {
        !self.confidence.is_empty()
    }

    pub fn splits_request(
        &self,
        point: &Point,
        budget: f64,
        params: &SaHyperParams,
    ) -> Result<(SplitsRequest, AlgorithmConfig), SolverError> {
        let mut conf_funcs = Vec::with_capacity(self.order.len() * 2);
        for (index, wire) in self.order.iter().enumerate() {
            let (positive, negative) = self
                .confidence
                .get(wire)
                .ok_or_else(|| SolverError::MissingConfidenceFunction(wire.clone()))?;
            let wire_index = index as i64;
            conf_funcs.push(ConfidenceEntry {
                index: 2 * index,
                name: format!("{wire} pos"),
                expression: positive.to_json(2 * wire_index, wire_index),
            });
            conf_funcs.push(ConfidenceEntry {
                index: 2 * index + 1,
                name: format!("{wire} neg"),
                expression: negative.to_json(2 * wire_index + 1, wire_index),
            });
        }

        let named_point = self
            .point_values(point)?
            .into_iter()
            .map(|(index, wire, value)| NamedPointEntry {
                index,
                name: wire.name().to_string(),
                value,
            })
            .collect::<Vec<_>>();

        debug!(wires = self.order.len(), budget, "built splits request");
        let request = SplitsRequest {
            ft: self.tree.to_json(Some(&self.order)),
            conf_funcs,
            point: named_point.clone(),
            resources: budget,
        };
        let algorithm = AlgorithmConfig::simulated_annealing(params.clone(), named_point);
        Ok((request, algorithm))
    }

    pub fn propagate_request(&self, point: &Point) -> Result<PropagateRequest, SolverError> {
        let point = self
            .point_values(point)?
            .into_iter()
            .map(|(index, _, value)| PointEntry { index, value })
            .collect();
        Ok(PropagateRequest {
            ft: self.tree.to_json(Some(&self.order)),
            point,
        })
    }

    fn point_values<'a>(
        &'a self,
        point: &Point,
    ) -> Result<Vec<(usize, &'a Wire, f64)>, SolverError> {
        if let Some(extra) = point.keys().find(|w| self.order.index_of(w).is_none()) {
            return Err(SolverError::UnknownWire(extra.name().to_string()));
        }
        self.order
            .iter()
            .enumerate()
            .map(|(index, wire)| {
                point
                    .get(wire)
                    .map(|value| (index, wire, *value))
                    .ok_or_else(|| SolverError::MissingPointValue(wire.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> FaultTree {
        FaultTree::and(
            FaultTree::wire("a"),
            FaultTree::or(FaultTree::wire("b"), FaultTree::wire("c")),
        )
    }

    fn point(values: &[(&str, f64)]) -> Point {
        values
            .iter()
            .map(|(name, value)| (Wire::new(*name), *value))
            .collect()
    }

    #[test]
    fn splits_request_lays_out_confidence_slots() {
        let problem =
            Problem::uniform(sample_tree(), Expression::geometric_confidence(0.99)).unwrap();
        let (request, algorithm) = problem
            .splits_request(
                &point(&[("a", 0.1), ("b", 0.2), ("c", 0.3)]),
                30.0,
                &SaHyperParams::default(),
            )
            .unwrap();

        let indices: Vec<_> = request.conf_funcs.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(request.conf_funcs[2].name, "b pos");
        assert_eq!(request.conf_funcs[3].name, "b neg");
        assert_eq!(request.conf_funcs[3].expression["type"], json!("const"));
        assert_eq!(request.conf_funcs[3].expression["constant"], json!(0.0));
        let c_positive = request.conf_funcs[4].expression.to_string();
        assert!(c_positive.contains(r#""index":4"#));
        assert!(c_positive.contains(r#""wire_index":2"#));
        assert_eq!(request.resources, 30.0);

        let names: Vec<_> = request.point.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(algorithm.kind, "sa");
        assert_eq!(algorithm.sa.point, request.point);
    }

    #[test]
    fn missing_point_value_names_the_wire() {
        let problem =
            Problem::uniform(sample_tree(), Expression::geometric_confidence(0.99)).unwrap();
        let err = problem
            .propagate_request(&point(&[("a", 0.1), ("c", 0.3)]))
            .unwrap_err();
        assert!(matches!(err, SolverError::MissingPointValue(w) if w.name() == "b"));
    }

    #[test]
    fn splits_without_confidence_fails() {
        let problem = Problem::without_confidence(sample_tree()).unwrap();
        let err = problem
            .splits_request(
                &point(&[("a", 0.1), ("b", 0.2), ("c", 0.3)]),
                1.0,
                &SaHyperParams::default(),
            )
            .unwrap_err();
        assert!(matches!(err, SolverError::MissingConfidenceFunction(w) if w.name() == "a"));
    }

    #[test]
    fn propagate_request_uses_canonical_indices() {
        let problem = Problem::without_confidence(sample_tree()).unwrap();
        let request = problem
            .propagate_request(&point(&[("c", 0.3), ("a", 0.1), ("b", 0.2)]))
            .unwrap();
        let entries: Vec<_> = request.point.iter().map(|p| (p.index, p.value)).collect();
        assert_eq!(entries, vec![(0, 0.1), (1, 0.2), (2, 0.3)]);
        assert_eq!(request.ft["type"], json!("and"));
    }

    #[test]
    fn incomplete_confidence_is_rejected() {
        let confidence = BTreeMap::from([
            (Wire::new("a"), Expression::constant(1.0)),
            (Wire::new("c"), Expression::constant(1.0)),
        ]);
        assert!(matches!(
            Problem::new(sample_tree(), confidence),
            Err(SolverError::MissingConfidenceFunction(w)) if w.name() == "b"
        ));
    }

    #[test]
    fn unknown_wires_are_rejected() {
        let confidence = BTreeMap::from([(Wire::new("zz"), Expression::constant(1.0))]);
        assert!(matches!(
            Problem::new(sample_tree(), confidence),
            Err(SolverError::UnknownWire(name)) if name == "zz"
        ));
    }

    #[test]
    fn non_finite_constants_are_rejected() {
        let mut confidence: BTreeMap<Wire, Expression> = ["a", "b", "c"]
            .into_iter()
            .map(|name| (Wire::new(name), Expression::geometric_confidence(0.99)))
            .collect();
        confidence.insert(
            Wire::new("b"),
            Expression::constant(1.0).sub(Expression::constant(f64::INFINITY)),
        );
        match Problem::new(sample_tree(), confidence) {
            Err(SolverError::InvalidRequest(message)) => assert!(message.contains("`b`")),
            other => panic!("expected invalid request, got {other:?}"),
        }
    }
}
