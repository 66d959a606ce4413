//! Proptest strategies for fault trees and confidence expressions.

use proptest::prelude::*;

use crate::expression::Expression;
use crate::tree::{FaultTree, GateKind};

pub fn arb_gate_kind() -> impl Strategy<Value = GateKind> {
    prop_oneof![
        Just(GateKind::And),
        Just(GateKind::Or),
        Just(GateKind::Pand)
    ]
}

/// Binary fault trees over a small name pool.
///
/// Names are drawn from `w0`..`w5`, so larger trees repeat wires across
/// subtrees, which exercises shared-handle decoding.
pub fn arb_fault_tree() -> impl Strategy<Value = FaultTree> {
    let leaf = (0..6usize).prop_map(|i| FaultTree::wire(format!("w{i}")));
    leaf.prop_recursive(4, 32, 2, |inner| {
        (arb_gate_kind(), inner.clone(), inner, "[a-z]{0,4}").prop_map(
            |(kind, lhs, rhs, name)| FaultTree::gate(kind, vec![lhs, rhs]).with_name(name),
        )
    })
}

/// Expressions built from every operator, with finite constants.
pub fn arb_expression() -> impl Strategy<Value = Expression> {
    let leaf = prop_oneof![
        (-10.0f64..10.0).prop_map(Expression::constant),
        Just(Expression::var()),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Expression::neg),
            inner.clone().prop_map(Expression::log),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.add(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.sub(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.mul(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.div(r)),
            (inner.clone(), inner).prop_map(|(l, r)| l.pow(r)),
        ]
    })
}
