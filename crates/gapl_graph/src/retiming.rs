//! Leiserson–Saxe retiming.
//!
//! A retiming assigns an integer lag to every node. An edge `u -> v` with `w`
//! registers carries `w + lag(v) - lag(u)` registers afterwards; the retiming
//! is legal when no edge count goes negative. Register counts around any
//! cycle, and along any two paths between the same pair of nodes, change by
//! the same amount, so the circuit's behavior is preserved.

use crate::circuit::CircuitGraph;
use crate::error::GraphError;
use crate::graph::GraphEdge;
use crate::ids::{GraphEdgeId, GraphNodeId};
use gapl_common::InternalError;
use std::collections::HashMap;
use tracing::debug;

/// Lag assignment for one circuit.
#[derive(Debug, Clone)]
pub struct Retiming<'g, N, E> {
    circuit: &'g CircuitGraph<N, E>,
    lags: Vec<i64>,
}

impl<'g, N, E> Retiming<'g, N, E> {
    /// Creates the identity retiming (every lag zero).
    pub fn new(circuit: &'g CircuitGraph<N, E>) -> Self {
        Self {
            lags: vec![0; circuit.graph().node_count()],
            circuit,
        }
    }

    /// Returns the lag of a node.
    pub fn lag(&self, node: GraphNodeId) -> i64 {
        self.lags[node.as_raw() as usize]
    }

    /// Returns every lag, indexed by raw node ID.
    pub fn lags(&self) -> &[i64] {
        &self.lags
    }

    /// Moves one register from each outgoing edge of `node` to each incoming edge.
    pub fn increase_lag(&mut self, node: GraphNodeId) {
        self.lags[node.as_raw() as usize] += 1;
    }

    /// Register count of an edge under this retiming.
    pub fn edge_register_count(&self, edge: GraphEdgeId) -> i64 {
        self.count(self.circuit.graph().edge(edge))
    }

    fn count(&self, edge: &GraphEdge<E>) -> i64 {
        edge.weight + self.lags[edge.sink.as_raw() as usize] - self.lags[edge.source.as_raw() as usize]
    }

    /// Returns `true` if no edge ends up with a negative register count.
    pub fn is_legal(&self) -> bool {
        self.circuit.graph().edges().iter().all(|e| self.count(e) >= 0)
    }

    /// Combinational delays of the retimed circuit, indexed by raw node ID.
    pub fn combinational_delays(&self) -> Result<Vec<i64>, GraphError> {
        self.circuit.delays_with(|e| self.count(e))
    }

    /// Clock period of the retimed circuit.
    pub fn clock_period(&self) -> Result<i64, GraphError> {
        Ok(self.combinational_delays()?.into_iter().max().unwrap_or(0))
    }

    /// Materializes the retimed circuit.
    pub fn retimed_circuit(&self) -> Result<CircuitGraph<N, E>, GraphError>
    where
        N: Clone,
        E: Clone,
    {
        if !self.is_legal() {
            return Err(InternalError::new("retiming produces a negative register count").into());
        }
        let graph = self.circuit.graph().reweighted(|e| self.count(e));
        CircuitGraph::new(graph).map_err(|err| {
            InternalError::new(format!("retimed circuit failed validation: {err}")).into()
        })
    }

    /// Searches for a legal retiming whose clock period is at most `target`.
    ///
    /// Runs `n - 1` rounds; each round recomputes delays on the current
    /// register counts and delays every node whose delay exceeds `target`
    /// by one more register. Returns `None` if the target is unreachable.
    pub fn retime_for_clock_period(
        circuit: &'g CircuitGraph<N, E>,
        target: i64,
    ) -> Result<Option<Self>, GraphError> {
        let mut retiming = Self::new(circuit);
        for _ in 1..circuit.graph().node_count() {
            let delays = retiming.combinational_delays()?;
            let mut changed = false;
            for (index, delay) in delays.into_iter().enumerate() {
                if delay > target {
                    retiming.increase_lag(GraphNodeId::from_raw(index as u32));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        let feasible = retiming.is_legal() && retiming.clock_period()? <= target;
        Ok(feasible.then_some(retiming))
    }
}

/// The outcome of clock period minimization.
#[derive(Debug, Clone)]
pub struct RetimedCircuit<N, E> {
    /// The retimed circuit.
    pub circuit: CircuitGraph<N, E>,
    /// Lags that produced it, indexed by raw node ID.
    pub lags: Vec<i64>,
    /// Clock period before retiming.
    pub original_period: i64,
    /// Clock period after retiming.
    pub period: i64,
}

/// Finds the retiming with the smallest achievable clock period.
///
/// Binary-searches the sorted candidate periods, memoizing each feasibility
/// test. Failure to find any feasible candidate is an internal error, since
/// the current period is always a feasible candidate.
pub fn minimize_clock_period<N, E>(
    circuit: &CircuitGraph<N, E>,
) -> Result<RetimedCircuit<N, E>, GraphError>
where
    N: Clone + Sync,
    E: Clone + Sync,
{
    let original_period = circuit.clock_period()?;
    let candidates: Vec<i64> = circuit.possible_clock_periods().into_iter().collect();
    if candidates.is_empty() {
        return Ok(RetimedCircuit {
            circuit: circuit.clone(),
            lags: Vec::new(),
            original_period,
            period: original_period,
        });
    }

    let mut cache: HashMap<i64, Option<Vec<i64>>> = HashMap::new();
    let mut feasible = |period: i64| -> Result<bool, GraphError> {
        if let Some(known) = cache.get(&period) {
            return Ok(known.is_some());
        }
        let lags = Retiming::retime_for_clock_period(circuit, period)?.map(|r| r.lags);
        debug!(period, feasible = lags.is_some(), "tested clock period");
        let found = lags.is_some();
        cache.insert(period, lags);
        Ok(found)
    };

    let (mut low, mut high) = (0, candidates.len());
    while low < high {
        let mid = low + (high - low) / 2;
        if feasible(candidates[mid])? {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    if low == candidates.len() || !feasible(candidates[low])? {
        return Err(InternalError::new(format!(
            "no clock period among {} candidates is achievable",
            candidates.len()
        ))
        .into());
    }

    let lags = cache.remove(&candidates[low]).flatten().ok_or_else(|| {
        InternalError::new("feasible clock period is missing from the retiming cache")
    })?;
    let retiming = Retiming { circuit, lags };
    let retimed = retiming.retimed_circuit()?;
    let period = retimed.clock_period()?;
    Ok(RetimedCircuit {
        circuit: retimed,
        lags: retiming.lags,
        original_period,
        period,
    })
}
