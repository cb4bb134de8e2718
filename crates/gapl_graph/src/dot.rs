//! Graphviz export.

use crate::graph::{GraphNode, WeightedGraph};
use std::fmt::Write;

impl<N, E> WeightedGraph<N, E> {
    /// Renders the graph in Graphviz DOT syntax.
    ///
    /// Nodes are labelled `"<label> [<weight>]"`, edges carry their weight as a
    /// label and grow thicker with it (pen width capped at 6).
    pub fn to_dot(&self, graph_name: &str, label: impl Fn(&GraphNode<N>) -> String) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph \"{}\" {{", escape(graph_name));
        out.push_str("  rankdir=LR;\n");
        for node in self.nodes() {
            let _ = writeln!(
                out,
                "  n{} [label=\"{} [{}]\"];",
                node.id.as_raw(),
                escape(&label(node)),
                node.weight
            );
        }
        for edge in self.edges() {
            let _ = writeln!(
                out,
                "  n{} -> n{} [label=\"{}\", penwidth={}];",
                edge.source.as_raw(),
                edge.sink.as_raw(),
                edge.weight,
                1 + edge.weight.clamp(0, 5)
            );
        }
        out.push_str("}\n");
        out
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
