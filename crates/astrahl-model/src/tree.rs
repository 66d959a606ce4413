use std::collections::BTreeSet;
use std::fmt;

use serde_json::{json, Map, Value};

use crate::errors::ModelError;
use crate::wire::{Wire, WireOrder, WireTable};

pub(crate) const WIRE_TAG: &str = "wire";
const SUBTREE_PREFIX: &str = "subtree";

/// Boolean gate kinds of a fault tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    /// Priority-AND; propagated like `And`.
    Pand,
}

impl GateKind {
    pub fn tag(self) -> &'static str {
        match self {
            GateKind::And => "and",
            GateKind::Or => "or",
            GateKind::Pand => "pand",
        }
    }

    pub(crate) fn dot_shape(self) -> &'static str {
        match self {
            GateKind::And => "triangle",
            GateKind::Or => "invtriangle",
            GateKind::Pand => "house",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag().to_uppercase())
    }
}

/// A fault tree: gates over wires.
///
/// Trees are immutable values once built or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultTree {
    Gate {
        kind: GateKind,
        name: String,
        children: Vec<FaultTree>,
    },
    Wire(Wire),
}

type NodeDecoder = fn(&Map<String, Value>, &mut WireTable) -> Result<FaultTree, ModelError>;

/// Decoders keyed by the `type` tag of a tree node.
const TREE_DECODERS: [(&str, NodeDecoder); 4] = [
    ("and", decode_and),
    ("or", decode_or),
    ("pand", decode_pand),
    (WIRE_TAG, decode_wire),
];

impl FaultTree {
    pub fn wire(name: impl Into<String>) -> Self {
        FaultTree::Wire(Wire::new(name))
    }

    pub fn from_wire(wire: Wire) -> Self {
        FaultTree::Wire(wire)
    }

    pub fn gate(kind: GateKind, children: Vec<FaultTree>) -> Self {
        FaultTree::Gate {
            kind,
            name: String::new(),
            children,
        }
    }

    pub fn and(lhs: FaultTree, rhs: FaultTree) -> Self {
        Self::gate(GateKind::And, vec![lhs, rhs])
    }

    pub fn or(lhs: FaultTree, rhs: FaultTree) -> Self {
        Self::gate(GateKind::Or, vec![lhs, rhs])
    }

    pub fn pand(lhs: FaultTree, rhs: FaultTree) -> Self {
        Self::gate(GateKind::Pand, vec![lhs, rhs])
    }

    /// Set the display name of a gate. Wires keep their own name.
    pub fn with_name(self, display: impl Into<String>) -> Self {
        match self {
            FaultTree::Gate { kind, children, .. } => FaultTree::Gate {
                kind,
                name: display.into(),
                children,
            },
            wire @ FaultTree::Wire(_) => wire,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FaultTree::Gate { name, .. } => name,
            FaultTree::Wire(wire) => wire.name(),
        }
    }

    /// All wires reachable from this node, deduplicated by name.
    pub fn wires(&self) -> BTreeSet<Wire> {
        let mut out = BTreeSet::new();
        self.collect_wires(&mut out);
        out
    }

    fn collect_wires(&self, out: &mut BTreeSet<Wire>) {
        match self {
            FaultTree::Gate { children, .. } => {
                for child in children {
                    child.collect_wires(out);
                }
            }
            FaultTree::Wire(wire) => {
                out.insert(wire.clone());
            }
        }
    }

    /// Encode in the solver's tree schema.
    ///
    /// Wire `index` is the position in `order` when one is given, else `null`.
    pub fn to_json(&self, order: Option<&WireOrder>) -> Value {
        match self {
            FaultTree::Gate {
                kind,
                name,
                children,
            } => {
                let mut node = Map::new();
                node.insert("type".to_string(), Value::from(kind.tag()));
                node.insert("name".to_string(), Value::from(name.as_str()));
                for (idx, child) in children.iter().enumerate() {
                    node.insert(
                        format!("{SUBTREE_PREFIX}{}", idx + 1),
                        child.to_json(order),
                    );
                }
                Value::Object(node)
            }
            FaultTree::Wire(wire) => {
                let index = order.and_then(|o| o.index_of(wire));
                json!({
                    "type": WIRE_TAG,
                    "index": index,
                    "name": wire.name(),
                })
            }
        }
    }

    /// Decode a tree with a fresh wire table.
    pub fn from_json(encoded: &Value) -> Result<Self, ModelError> {
        let mut table = WireTable::new();
        Self::from_json_with(encoded, &mut table)
    }

    /// Decode a tree, resolving wire names through `table`.
    pub fn from_json_with(encoded: &Value, table: &mut WireTable) -> Result<Self, ModelError> {
        let node = encoded
            .as_object()
            .ok_or(ModelError::NotAnObject("fault tree"))?;
        let tag = node
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ModelError::MissingField {
                node: "fault tree",
                field: "type",
            })?;
        let decoder = TREE_DECODERS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, decoder)| *decoder)
            .ok_or_else(|| ModelError::UnknownNodeType(tag.to_string()))?;
        decoder(node, table)
    }
}

fn decode_and(node: &Map<String, Value>, table: &mut WireTable) -> Result<FaultTree, ModelError> {
    decode_gate(GateKind::And, node, table)
}

fn decode_or(node: &Map<String, Value>, table: &mut WireTable) -> Result<FaultTree, ModelError> {
    decode_gate(GateKind::Or, node, table)
}

fn decode_pand(node: &Map<String, Value>, table: &mut WireTable) -> Result<FaultTree, ModelError> {
    decode_gate(GateKind::Pand, node, table)
}

fn decode_gate(
    kind: GateKind,
    node: &Map<String, Value>,
    table: &mut WireTable,
) -> Result<FaultTree, ModelError> {
    let name = node
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut numbered = Vec::new();
    for (key, value) in node {
        let Some(suffix) = key.strip_prefix(SUBTREE_PREFIX) else {
            continue;
        };
        let position: usize = suffix.parse().map_err(|_| ModelError::InvalidField {
            node: "gate",
            field: key.clone(),
            reason: "subtree keys must end in a number".into(),
        })?;
        numbered.push((position, value));
    }
    numbered.sort_by_key(|(position, _)| *position);

    let children = numbered
        .into_iter()
        .map(|(_, child)| FaultTree::from_json_with(child, table))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FaultTree::Gate {
        kind,
        name,
        children,
    })
}

fn decode_wire(node: &Map<String, Value>, table: &mut WireTable) -> Result<FaultTree, ModelError> {
    let name = match node.get("name") {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(ModelError::InvalidField {
                node: "wire",
                field: "name".into(),
                reason: format!("expected a string, found {other}"),
            })
        }
        None => {
            return Err(ModelError::MissingField {
                node: "wire",
                field: "name",
            })
        }
    };
    Ok(FaultTree::Wire(table.intern(name)))
}

impl fmt::Display for FaultTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultTree::Wire(wire) => write!(f, "{wire}"),
            FaultTree::Gate { kind, children, .. } => {
                write!(f, "{kind}(")?;
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}
