//! Conversion between netlist modules and circuit graphs.
//!
//! Register nodes do not appear in the graph. Each data connection into a
//! non-register node is traced back through any chain of registers to the
//! non-register wire that feeds it; the chain length becomes the edge weight.
//! Wires sharing source node, sink node and register count are condensed into
//! one edge carrying all of them.

use std::collections::{BTreeMap, HashMap};

use gapl_common::{Interner, InternalError};
use gapl_graph::{CircuitGraph, WeightedGraph};
use gapl_ir::{
    Connection, InterfaceStructure, Module, NodeId, NodeKind, Port, PortDescription,
    PredefinedFunction, Side, WireRef, WireSlot,
};

use crate::delay::PropagationDelay;
use crate::error::RetimeError;

/// A module's circuit graph: nodes carry the module node they stand for,
/// edges carry the wire connections they condense.
pub type ModuleCircuit = CircuitGraph<NodeId, Vec<Connection>>;

/// Converts a module into its circuit graph.
///
/// Returns `Ok(None)` when a register chain has no non-register source, for
/// example when a register input is left undriven.
pub fn module_to_circuit<D>(
    module: &Module,
    delay: &D,
    name: &str,
) -> Result<Option<ModuleCircuit>, RetimeError>
where
    D: PropagationDelay + ?Sized,
{
    let mut graph = WeightedGraph::new();
    let mut graph_ids = HashMap::new();
    for (id, node) in module.nodes().iter().filter(|(_, n)| !n.is_register()) {
        graph_ids.insert(id, graph.add_node(delay.delay(node), id));
    }

    let mut bundles: BTreeMap<(NodeId, NodeId, i64), Vec<Connection>> = BTreeMap::new();
    for connection in module.connections() {
        if !matches!(connection.driven.slot, WireSlot::Data(_))
            || module.node(connection.driven.node).is_register()
        {
            continue;
        }
        let Some((source, registers)) = trace(module, connection.driver) else {
            return Ok(None);
        };
        bundles
            .entry((source.node, connection.driven.node, registers))
            .or_default()
            .push(Connection {
                driver: source,
                driven: connection.driven,
            });
    }

    let lookup = |node: NodeId| {
        graph_ids.get(&node).copied().ok_or_else(|| {
            InternalError::new(format!("node {node:?} has no circuit graph counterpart"))
        })
    };
    for ((source, sink, registers), bundle) in bundles {
        graph.add_edge(lookup(source)?, lookup(sink)?, registers, bundle);
    }
    CircuitGraph::new(graph)
        .map(Some)
        .map_err(RetimeError::graph(name))
}

/// Follows `wire` back through registers to a non-register driver.
fn trace(module: &Module, mut wire: WireRef) -> Option<(WireRef, i64)> {
    let mut registers = 0;
    while module.node(wire.node).is_register() {
        // A chain longer than the module is a register-only ring.
        if registers > module.nodes().len() as i64 {
            return None;
        }
        let WireSlot::Data(leaf) = wire.slot else {
            return None;
        };
        wire = module.driver_of(WireRef {
            node: wire.node,
            side: Side::Input,
            port: 0,
            slot: WireSlot::Data(leaf),
        })?;
        registers += 1;
    }
    Some((wire, registers))
}

fn descriptions(ports: &[Port]) -> Vec<PortDescription> {
    ports
        .iter()
        .map(|p| PortDescription {
            name: p.name,
            structure: p.structure.clone(),
            kind: p.kind,
        })
        .collect()
}

/// Rebuilds a module from a (retimed) circuit graph of `original`.
///
/// Non-register nodes are copied; each edge of weight `k` becomes a chain of
/// `k` registers as wide as the edge's wire bundle. Handshake connections are
/// copied unchanged.
pub fn circuit_to_module(
    original: &Module,
    circuit: &ModuleCircuit,
    interner: &Interner,
) -> Result<Module, RetimeError> {
    let mut module = Module::new(
        original.invocation.clone(),
        original.inputs.clone(),
        original.outputs.clone(),
    );
    let mut remap = HashMap::new();
    for node in circuit.graph().nodes() {
        let old = original.node(node.value);
        let id = module.add_node(
            old.name,
            old.kind.clone(),
            descriptions(&old.inputs),
            descriptions(&old.outputs),
        );
        remap.insert(node.value, id);
    }
    let rebase = |wire: WireRef| -> Result<WireRef, InternalError> {
        let node = remap.get(&wire.node).copied().ok_or_else(|| {
            InternalError::new(format!("connection references dropped node {:?}", wire.node))
        })?;
        Ok(WireRef { node, ..wire })
    };
    let connect = |module: &mut Module, driver, driven| {
        module
            .connect(driver, driven)
            .map_err(|err| InternalError::new(format!("rebuilding retimed module: {err}")))
    };

    let mut register_count = 0u32;
    for edge in circuit.graph().edges() {
        let mut drivers = edge
            .value
            .iter()
            .map(|c| rebase(c.driver))
            .collect::<Result<Vec<_>, _>>()?;
        for _ in 0..edge.weight {
            let function =
                PredefinedFunction::Register(InterfaceStructure::bus(drivers.len() as u32));
            let signature = function.signature(interner);
            let name = interner.get_or_intern(&format!("retimed_register_{register_count}"));
            register_count += 1;
            let register = module.add_node(
                name,
                NodeKind::Predefined(function),
                signature.inputs,
                signature.outputs,
            );
            for (leaf, driver) in drivers.iter_mut().enumerate() {
                let leaf = leaf as u32;
                let next = WireRef {
                    node: register,
                    side: Side::Input,
                    port: 0,
                    slot: WireSlot::Data(leaf),
                };
                connect(&mut module, *driver, next)?;
                *driver = WireRef {
                    side: Side::Output,
                    ..next
                };
            }
        }
        for (driver, connection) in drivers.into_iter().zip(&edge.value) {
            connect(&mut module, driver, rebase(connection.driven)?)?;
        }
    }

    for connection in original.connections() {
        if matches!(connection.driven.slot, WireSlot::Data(_)) {
            continue;
        }
        connect(
            &mut module,
            rebase(connection.driver)?,
            rebase(connection.driven)?,
        )?;
    }
    Ok(module)
}

/// Renders a module's circuit graph in Graphviz DOT, labelling nodes by name.
pub fn circuit_dot(
    name: &str,
    circuit: &ModuleCircuit,
    module: &Module,
    interner: &Interner,
) -> String {
    circuit.graph().to_dot(name, |node| {
        let original = module.node(node.value);
        match &original.kind {
            NodeKind::Predefined(function) => format!(
                "{}: {}",
                interner.resolve(original.name),
                function.op().name()
            ),
            _ => interner.resolve(original.name).to_string(),
        }
    })
}
