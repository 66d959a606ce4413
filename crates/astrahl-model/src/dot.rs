//! Graphviz rendering of fault trees.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::tree::FaultTree;
use crate::wire::Wire;

impl FaultTree {
    /// Render as a Graphviz `digraph`, annotating wires with `values` when present.
    pub fn to_dot(&self, values: &BTreeMap<Wire, f64>) -> String {
        let mut out = String::from("digraph G {\n ranksep=0;\n");
        let mut next_id = 0usize;
        write_node(self, values, &mut next_id, &mut out);
        out.push('}');
        out
    }
}

fn write_node(
    node: &FaultTree,
    values: &BTreeMap<Wire, f64>,
    next_id: &mut usize,
    out: &mut String,
) -> usize {
    let id = *next_id;
    *next_id += 1;
    // Writing into a String cannot fail.
    match node {
        FaultTree::Wire(wire) => {
            let value = values
                .get(wire)
                .map(|v| format!("{v:.4}"))
                .unwrap_or_default();
            let _ = writeln!(out, "subgraph n{id} {{\ncolor=invis;");
            let _ = writeln!(
                out,
                "label{id} [label=\"{}\", style=filled, fillcolor=\"#f2f2f2\", shape=box];",
                escape(wire.name())
            );
            let _ = writeln!(
                out,
                "gate{id} [label=\"{value}\", width=.5, fixedsize=true, fontsize=10, style=filled, fillcolor=\"#D3D3D3\", shape=circle];"
            );
            let _ = writeln!(out, "label{id} -> gate{id};\n}}");
        }
        FaultTree::Gate {
            kind,
            name,
            children,
        } => {
            let _ = writeln!(out, "subgraph n{id} {{\ncolor=invis;ranksep=0;");
            let _ = writeln!(
                out,
                "label{id} [label=\"{}\" style=filled fillcolor=\"#f2f2f2\" shape=box];",
                escape(name)
            );
            let _ = writeln!(
                out,
                "gate{id} [label=\"{kind}\" style=filled fillcolor=\"#D3D3D3\" shape={}];",
                kind.dot_shape()
            );
            let _ = writeln!(out, "label{id} -> gate{id};\n}}");
            for child in children {
                let child_id = write_node(child, values, next_id, out);
                let _ = writeln!(out, "gate{id} -> label{child_id} [minlen=1]");
            }
        }
    }
    id
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
