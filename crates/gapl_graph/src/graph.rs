//! A directed multigraph with integer node and edge weights.
//!
//! Nodes and edges are appended and never removed, so their IDs are stable.
//! Adjacency lists are kept per node for the traversal-heavy algorithms below.

use crate::error::GraphError;
use crate::ids::{GraphEdgeId, GraphNodeId};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// A weighted node carrying a payload.
#[derive(Debug, Clone)]
pub struct GraphNode<N> {
    /// The unique ID of this node.
    pub id: GraphNodeId,
    /// Node weight.
    pub weight: i64,
    /// Caller payload.
    pub value: N,
}

/// A weighted directed edge carrying a payload.
#[derive(Debug, Clone)]
pub struct GraphEdge<E> {
    /// The unique ID of this edge.
    pub id: GraphEdgeId,
    /// Tail of the edge.
    pub source: GraphNodeId,
    /// Head of the edge.
    pub sink: GraphNodeId,
    /// Edge weight.
    pub weight: i64,
    /// Caller payload.
    pub value: E,
}

/// A directed multigraph with weighted nodes and edges.
#[derive(Debug, Clone)]
pub struct WeightedGraph<N, E> {
    nodes: Vec<GraphNode<N>>,
    edges: Vec<GraphEdge<E>>,
    outgoing: Vec<Vec<GraphEdgeId>>,
    incoming: Vec<Vec<GraphEdgeId>>,
}

impl<N, E> Default for WeightedGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> WeightedGraph<N, E> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Adds a node and returns its ID.
    pub fn add_node(&mut self, weight: i64, value: N) -> GraphNodeId {
        let id = GraphNodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(GraphNode { id, weight, value });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Adds a directed edge and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint does not belong to this graph.
    pub fn add_edge(
        &mut self,
        source: GraphNodeId,
        sink: GraphNodeId,
        weight: i64,
        value: E,
    ) -> GraphEdgeId {
        let id = GraphEdgeId::from_raw(self.edges.len() as u32);
        self.edges.push(GraphEdge {
            id,
            source,
            sink,
            weight,
            value,
        });
        self.outgoing[source.index()].push(id);
        self.incoming[sink.index()].push(id);
        id
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: GraphNodeId) -> &GraphNode<N> {
        &self.nodes[id.index()]
    }

    /// Returns the edge with the given ID.
    pub fn edge(&self, id: GraphEdgeId) -> &GraphEdge<E> {
        &self.edges[id.index()]
    }

    /// Returns all nodes in ID order.
    pub fn nodes(&self) -> &[GraphNode<N>] {
        &self.nodes
    }

    /// Returns all edges in ID order.
    pub fn edges(&self) -> &[GraphEdge<E>] {
        &self.edges
    }

    /// Returns all edges leaving the given node.
    pub fn outgoing_edges(&self, node: GraphNodeId) -> impl Iterator<Item = &GraphEdge<E>> {
        self.outgoing[node.index()].iter().map(|e| self.edge(*e))
    }

    /// Returns all edges entering the given node.
    pub fn incoming_edges(&self, node: GraphNodeId) -> impl Iterator<Item = &GraphEdge<E>> {
        self.incoming[node.index()].iter().map(|e| self.edge(*e))
    }

    /// Returns the total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Orders every node so that each edge points forward (Kahn's algorithm).
    pub fn topological_sort(&self) -> Result<Vec<GraphNodeId>, GraphError> {
        self.topological_sort_by(|_| true)
    }

    /// Topological order over the edges accepted by `keep`; every node is included.
    pub fn topological_sort_by(
        &self,
        keep: impl Fn(&GraphEdge<E>) -> bool,
    ) -> Result<Vec<GraphNodeId>, GraphError> {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for edge in self.edges.iter().filter(|e| keep(e)) {
            in_degree[edge.sink.index()] += 1;
        }

        let mut queue: VecDeque<GraphNodeId> = self
            .nodes
            .iter()
            .filter(|n| in_degree[n.id.index()] == 0)
            .map(|n| n.id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for edge in self.outgoing_edges(node).filter(|e| keep(e)) {
                let degree = &mut in_degree[edge.sink.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(edge.sink);
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            Err(GraphError::Cycle {
                remaining: self.nodes.len() - order.len(),
                total: self.nodes.len(),
            })
        }
    }

    /// Generalized Bellman-Ford from `root`.
    ///
    /// Distances live in any caller-chosen type `W` ordered by `compare` and
    /// combined by `add`. Returns one entry per node (indexed by raw ID); `None`
    /// marks nodes unreachable from `root`. The graph must not contain a cycle
    /// of negative total weight under `compare`.
    pub fn shortest_paths_from_node<W, F, C, A>(
        &self,
        root: GraphNodeId,
        edge_weight: F,
        compare: C,
        add: A,
        zero: W,
    ) -> Vec<Option<W>>
    where
        F: Fn(&GraphEdge<E>) -> W,
        C: Fn(&W, &W) -> Ordering,
        A: Fn(&W, &W) -> W,
    {
        let mut distance: Vec<Option<W>> = (0..self.nodes.len()).map(|_| None).collect();
        distance[root.index()] = Some(zero);

        for _ in 1..self.nodes.len().max(1) {
            let mut changed = false;
            for edge in &self.edges {
                let Some(from) = &distance[edge.source.index()] else {
                    continue;
                };
                let candidate = add(from, &edge_weight(edge));
                let better = match &distance[edge.sink.index()] {
                    Some(current) => compare(&candidate, current) == Ordering::Less,
                    None => true,
                };
                if better {
                    distance[edge.sink.index()] = Some(candidate);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        distance
    }

    /// Returns a copy with edge weights replaced by `weight`.
    pub fn reweighted(&self, weight: impl Fn(&GraphEdge<E>) -> i64) -> Self
    where
        N: Clone,
        E: Clone,
    {
        let mut graph = self.clone();
        for edge in &mut graph.edges {
            edge.weight = weight(edge);
        }
        graph
    }
}

impl<N: Clone, E: Clone> WeightedGraph<N, E> {
    /// Copies the nodes accepted by `node_filter` and the edges accepted by
    /// `edge_filter` whose endpoints both survive.
    ///
    /// Surviving nodes keep their relative order, so an all-pass node filter
    /// keeps every node ID unchanged.
    pub fn subgraph(
        &self,
        node_filter: impl Fn(&GraphNode<N>) -> bool,
        edge_filter: impl Fn(&GraphEdge<E>) -> bool,
    ) -> Self {
        let mut graph = Self::new();
        let mut remap: Vec<Option<GraphNodeId>> = vec![None; self.nodes.len()];
        for node in self.nodes.iter().filter(|n| node_filter(n)) {
            remap[node.id.index()] = Some(graph.add_node(node.weight, node.value.clone()));
        }
        for edge in self.edges.iter().filter(|e| edge_filter(e)) {
            if let (Some(source), Some(sink)) = (remap[edge.source.index()], remap[edge.sink.index()]) {
                graph.add_edge(source, sink, edge.weight, edge.value.clone());
            }
        }
        graph
    }
}
