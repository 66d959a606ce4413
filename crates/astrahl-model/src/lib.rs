#![doc = include_str!("../README.md")]

//! Domain model for fault-tree resource allocation.
//!
//! This crate defines wires and their canonical ordering, the fault-tree
//! sum type, confidence-function expressions, and the JSON codec shared
//! with the external allocation solver.

pub mod dot;
pub mod errors;
pub mod expression;
pub mod generate;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod tree;
pub mod wire;

pub use errors::ModelError;
pub use expression::{Expression, EULER};
pub use generate::random_tree;
pub use tree::{FaultTree, GateKind};
pub use wire::{Wire, WireOrder, WireTable};
