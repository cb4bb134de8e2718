//! Synchronous circuits as weighted graphs.
//!
//! A [`CircuitGraph`] node weight is the propagation delay of a combinational
//! element, and an edge weight is the number of registers on the connection
//! between two elements. The combinational delay of a node is the longest
//! register-free path ending at it; the clock period is the largest such delay.

use crate::error::GraphError;
use crate::graph::{GraphEdge, WeightedGraph};
use crate::ids::GraphNodeId;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// A validated circuit graph.
///
/// Construction guarantees non-negative delays and register counts and the
/// absence of register-free cycles.
#[derive(Debug, Clone)]
pub struct CircuitGraph<N, E> {
    graph: WeightedGraph<N, E>,
}

impl<N, E> CircuitGraph<N, E> {
    /// Validates `graph` as a circuit.
    pub fn new(graph: WeightedGraph<N, E>) -> Result<Self, GraphError> {
        if let Some(node) = graph.nodes().iter().find(|n| n.weight < 0) {
            return Err(GraphError::NegativeNodeWeight {
                node: node.id.as_raw(),
                weight: node.weight,
            });
        }
        if let Some(edge) = graph.edges().iter().find(|e| e.weight < 0) {
            return Err(GraphError::NegativeEdgeWeight {
                edge: edge.id.as_raw(),
                weight: edge.weight,
            });
        }
        if let Err(GraphError::Cycle { remaining, .. }) = graph.topological_sort_by(|e| e.weight == 0) {
            return Err(GraphError::CombinationalLoop { nodes: remaining });
        }
        Ok(Self { graph })
    }

    /// Returns the underlying graph.
    pub fn graph(&self) -> &WeightedGraph<N, E> {
        &self.graph
    }

    /// Consumes the circuit, returning the underlying graph.
    pub fn into_graph(self) -> WeightedGraph<N, E> {
        self.graph
    }

    /// Combinational delay of every node, indexed by raw node ID.
    pub fn combinational_delays(&self) -> Result<Vec<i64>, GraphError> {
        self.delays_with(|e| e.weight)
    }

    /// Combinational delays under alternative register counts.
    ///
    /// Only edges whose count is exactly zero propagate delay.
    pub(crate) fn delays_with(
        &self,
        registers: impl Fn(&GraphEdge<E>) -> i64,
    ) -> Result<Vec<i64>, GraphError> {
        let order = self.graph.topological_sort_by(|e| registers(e) == 0)?;
        let mut delays = vec![0i64; self.graph.node_count()];
        for node in order {
            let arrival = self
                .graph
                .incoming_edges(node)
                .filter(|e| registers(e) == 0)
                .map(|e| delays[e.source.as_raw() as usize])
                .max()
                .unwrap_or(0);
            delays[node.as_raw() as usize] = arrival + self.graph.node(node).weight;
        }
        Ok(delays)
    }

    /// The largest combinational delay, or zero for an empty circuit.
    pub fn clock_period(&self) -> Result<i64, GraphError> {
        Ok(self.combinational_delays()?.into_iter().max().unwrap_or(0))
    }

    /// Every clock period a retiming could possibly achieve.
    ///
    /// For each ordered pair of nodes `(u, v)` with a path between them, the
    /// candidate is the largest total delay among the paths from `u` to `v`
    /// that carry the fewest registers. The optimum is always a member.
    pub fn possible_clock_periods(&self) -> BTreeSet<i64>
    where
        N: Sync,
        E: Sync,
    {
        (0..self.graph.node_count() as u32)
            .into_par_iter()
            .flat_map_iter(|root| self.periods_from(GraphNodeId::from_raw(root)))
            .collect()
    }

    fn periods_from(&self, root: GraphNodeId) -> Vec<i64> {
        let distances = self.graph.shortest_paths_from_node(
            root,
            |e| (e.weight, -self.graph.node(e.source).weight),
            |a, b| a.cmp(b),
            |a, b| (a.0 + b.0, a.1 + b.1),
            (0i64, 0i64),
        );
        distances
            .into_iter()
            .zip(self.graph.nodes())
            .filter_map(|(distance, node)| distance.map(|(_, delay)| node.weight - delay))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `a -1-> b -0-> c -0-> d`, every node with delay 1.
    fn chain() -> WeightedGraph<&'static str, ()> {
        let mut g = WeightedGraph::new();
        let a = g.add_node(1, "a");
        let b = g.add_node(1, "b");
        let c = g.add_node(1, "c");
        let d = g.add_node(1, "d");
        g.add_edge(a, b, 1, ());
        g.add_edge(b, c, 0, ());
        g.add_edge(c, d, 0, ());
        g
    }

    #[test]
    fn delays_follow_register_free_paths() {
        let mut g = WeightedGraph::new();
        let a = g.add_node(1, "a");
        let b = g.add_node(1, "b");
        let c = g.add_node(1, "c");
        let d = g.add_node(1, "d");
        g.add_edge(a, b, 0, ());
        g.add_edge(b, c, 1, ());
        g.add_edge(c, d, 0, ());
        g.add_edge(a, d, 0, ());
        let circuit = CircuitGraph::new(g).unwrap();
        assert_eq!(circuit.combinational_delays().unwrap(), vec![1, 2, 1, 2]);
        assert_eq!(circuit.clock_period().unwrap(), 2);
    }

    #[test]
    fn chain_period() {
        let circuit = CircuitGraph::new(chain()).unwrap();
        assert_eq!(circuit.clock_period().unwrap(), 3);
    }

    #[test]
    fn empty_circuit_has_zero_period() {
        let circuit: CircuitGraph<(), ()> = CircuitGraph::new(WeightedGraph::new()).unwrap();
        assert_eq!(circuit.clock_period().unwrap(), 0);
        assert!(circuit.possible_clock_periods().is_empty());
    }

    #[test]
    fn register_free_cycle_is_rejected() {
        let mut g: WeightedGraph<(), ()> = WeightedGraph::new();
        let a = g.add_node(1, ());
        let b = g.add_node(1, ());
        g.add_edge(a, b, 0, ());
        g.add_edge(b, a, 0, ());
        let err = CircuitGraph::new(g).unwrap_err();
        assert!(matches!(err, GraphError::CombinationalLoop { nodes: 2 }));
    }

    #[test]
    fn registered_cycle_is_accepted() {
        let mut g: WeightedGraph<(), ()> = WeightedGraph::new();
        let a = g.add_node(1, ());
        let b = g.add_node(1, ());
        g.add_edge(a, b, 0, ());
        g.add_edge(b, a, 1, ());
        assert!(CircuitGraph::new(g).is_ok());
    }

    #[test]
    fn negative_weights_are_rejected() {
        let mut g: WeightedGraph<(), ()> = WeightedGraph::new();
        let a = g.add_node(1, ());
        let b = g.add_node(1, ());
        g.add_edge(a, b, -1, ());
        assert!(matches!(
            CircuitGraph::new(g).unwrap_err(),
            GraphError::NegativeEdgeWeight { weight: -1, .. }
        ));

        let mut g: WeightedGraph<(), ()> = WeightedGraph::new();
        g.add_node(-2, ());
        assert!(matches!(
            CircuitGraph::new(g).unwrap_err(),
            GraphError::NegativeNodeWeight { weight: -2, .. }
        ));
    }

    #[test]
    fn candidate_periods_of_chain() {
        let circuit = CircuitGraph::new(chain()).unwrap();
        let periods: Vec<i64> = circuit.possible_clock_periods().into_iter().collect();
        // Single nodes give 1 and the full path a..d gives 4.
        assert_eq!(periods, vec![1, 2, 3, 4]);
    }
}
