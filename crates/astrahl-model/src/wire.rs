use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::tree::FaultTree;

/// A named leaf component of a fault tree and the unit of resource allocation.
///
/// Equality, hashing and ordering are by name. Clones share the same
/// underlying name allocation, which is what [`Wire::same_handle`] checks.
#[derive(Clone)]
pub struct Wire {
    name: Arc<str>,
}

impl Wire {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when both values were produced from the same interned handle.
    pub fn same_handle(&self, other: &Wire) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl PartialEq for Wire {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Wire {}

impl Hash for Wire {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Wire {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wire {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Debug for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wire({:?})", &*self.name)
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Name-to-handle memo threaded through a whole decode.
///
/// Every occurrence of a wire name that passes through the same table
/// resolves to one shared [`Wire`] handle.
#[derive(Debug, Clone, Default)]
pub struct WireTable {
    wires: IndexMap<String, Wire>,
}

impl WireTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `name`, creating it on first sight.
    pub fn intern(&mut self, name: &str) -> Wire {
        if let Some(wire) = self.wires.get(name) {
            return wire.clone();
        }
        let wire = Wire::new(name);
        self.wires.insert(name.to_string(), wire.clone());
        wire
    }

    pub fn get(&self, name: &str) -> Option<&Wire> {
        self.wires.get(name)
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// Wires in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }
}

/// Canonical ordering of a tree's wires: lexicographic by name.
///
/// Positions in this ordering are the indices used on the solver wire
/// format, for points, confidence functions and allocation responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireOrder {
    wires: Vec<Wire>,
}

impl WireOrder {
    pub fn of(tree: &FaultTree) -> Self {
        Self {
            wires: tree.wires().into_iter().collect(),
        }
    }

    pub fn from_wires(wires: impl IntoIterator<Item = Wire>) -> Self {
        let unique: BTreeSet<Wire> = wires.into_iter().collect();
        Self {
            wires: unique.into_iter().collect(),
        }
    }

    pub fn index_of(&self, wire: &Wire) -> Option<usize> {
        self.wires.binary_search(wire).ok()
    }

    pub fn get(&self, index: usize) -> Option<&Wire> {
        self.wires.get(index)
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Wire> {
        self.wires.iter()
    }

    pub fn as_slice(&self) -> &[Wire] {
        &self.wires
    }

    /// Look a wire up by its name rather than by handle.
    pub fn find(&self, name: &str) -> Option<&Wire> {
        self.wires.iter().find(|w| w.name() == name)
    }
}

impl<'a> IntoIterator for &'a WireOrder {
    type Item = &'a Wire;
    type IntoIter = std::slice::Iter<'a, Wire>;

    fn into_iter(self) -> Self::IntoIter {
        self.wires.iter()
    }
}
