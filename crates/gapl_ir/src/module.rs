//! Netlist modules and their nodes.
//!
//! A [`Module`] is the hardware produced for one [`ModuleInvocation`]. It owns
//! an arena of [`Node`]s and a list of wire-level [`Connection`]s. Nested
//! modules are referenced by [`ModuleId`], never owned.

use crate::arena::Arena;
use crate::ids::{ModuleId, NodeId};
use crate::interface::PortDescription;
use crate::invocation::ModuleInvocation;
use crate::port::{Port, PortParent, Side, WireRef, WireSlot};
use crate::predefined::PredefinedFunction;
use gapl_common::Ident;
use serde::Serialize;
use std::collections::HashMap;

/// What a node does.
#[derive(Debug, Clone, Serialize)]
pub enum NodeKind {
    /// A module input. Has a single output port.
    ModuleInput,
    /// A module output. Has a single input port.
    ModuleOutput,
    /// Forwards its single input port to its single output port.
    PassThrough,
    /// An instance of another module.
    Invocation {
        /// The built module.
        module: ModuleId,
        /// The invocation it was built for.
        invocation: ModuleInvocation,
    },
    /// A primitive.
    Predefined(PredefinedFunction),
}

/// A node in a module body.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Declared or generated name, unique within the module.
    pub name: Ident,
    /// Behavior.
    pub kind: NodeKind,
    /// Input ports in order.
    pub inputs: Vec<Port>,
    /// Output ports in order.
    pub outputs: Vec<Port>,
}

impl Node {
    /// Returns the ports on one side.
    pub fn ports(&self, side: Side) -> &[Port] {
        match side {
            Side::Input => &self.inputs,
            Side::Output => &self.outputs,
        }
    }

    /// Finds a port by name on one side.
    pub fn port_named(&self, side: Side, name: Ident) -> Option<&Port> {
        self.ports(side).iter().find(|p| p.name == name)
    }

    /// Returns the predefined function if this is a primitive node.
    pub fn predefined(&self) -> Option<&PredefinedFunction> {
        match &self.kind {
            NodeKind::Predefined(f) => Some(f),
            _ => None,
        }
    }

    /// Returns `true` for register primitives.
    pub fn is_register(&self) -> bool {
        self.predefined().is_some_and(PredefinedFunction::is_register)
    }
}

/// A driver wire feeding a driven wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    /// The wire producing the value.
    pub driver: WireRef,
    /// The wire consuming it.
    pub driven: WireRef,
}

/// Errors from [`Module::connect`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The driven wire already has a driver.
    #[error("wire {driven:?} is already driven by {existing:?}")]
    AlreadyDriven {
        /// The wire being connected.
        driven: WireRef,
        /// Its current driver.
        existing: WireRef,
    },
    /// A wire does not exist or flows the wrong way.
    #[error("invalid connection from {driver:?} to {driven:?}")]
    InvalidWire {
        /// Requested driver.
        driver: WireRef,
        /// Requested driven wire.
        driven: WireRef,
    },
}

/// The netlist for one module invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    /// The invocation this module implements.
    pub invocation: ModuleInvocation,
    /// Module input ports.
    pub inputs: Vec<PortDescription>,
    /// Module output ports.
    pub outputs: Vec<PortDescription>,
    nodes: Arena<NodeId, Node>,
    connections: Vec<Connection>,
    #[serde(skip)]
    drivers: HashMap<WireRef, usize>,
}

impl Module {
    /// Creates an empty module with the given interface.
    pub fn new(
        invocation: ModuleInvocation,
        inputs: Vec<PortDescription>,
        outputs: Vec<PortDescription>,
    ) -> Self {
        Self {
            invocation,
            inputs,
            outputs,
            nodes: Arena::new(),
            connections: Vec::new(),
            drivers: HashMap::new(),
        }
    }

    /// Adds a node and creates its ports.
    pub fn add_node(
        &mut self,
        name: Ident,
        kind: NodeKind,
        inputs: Vec<PortDescription>,
        outputs: Vec<PortDescription>,
    ) -> NodeId {
        let id = self.nodes.next_id();
        let make = |side: Side, ports: Vec<PortDescription>| -> Vec<Port> {
            ports
                .into_iter()
                .enumerate()
                .map(|(index, description)| {
                    Port::new(
                        description,
                        PortParent {
                            node: id,
                            side,
                            index: index as u32,
                        },
                    )
                })
                .collect()
        };
        let node = Node {
            name,
            kind,
            inputs: make(Side::Input, inputs),
            outputs: make(Side::Output, outputs),
        };
        self.nodes.alloc(node)
    }

    /// Returns a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Returns the node arena.
    pub fn nodes(&self) -> &Arena<NodeId, Node> {
        &self.nodes
    }

    /// Returns the module input nodes in port order.
    pub fn input_nodes(&self) -> Vec<NodeId> {
        self.nodes_where(|n| matches!(n.kind, NodeKind::ModuleInput))
    }

    /// Returns the module output nodes in port order.
    pub fn output_nodes(&self) -> Vec<NodeId> {
        self.nodes_where(|n| matches!(n.kind, NodeKind::ModuleOutput))
    }

    fn nodes_where(&self, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| pred(n))
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns `true` if the module body contains a register primitive.
    pub fn has_registers(&self) -> bool {
        self.nodes.values().any(Node::is_register)
    }

    /// Returns the port a wire belongs to.
    pub fn port(&self, wire: WireRef) -> Option<&Port> {
        self.nodes
            .try_get(wire.node)?
            .ports(wire.side)
            .get(wire.port as usize)
    }

    fn wire_exists(&self, wire: WireRef) -> bool {
        self.port(wire).is_some_and(|port| match wire.slot {
            WireSlot::Data(leaf) => leaf < port.structure.width(),
            WireSlot::Valid | WireSlot::Ready => port.has_handshake(),
        })
    }

    /// Connects `driver` to `driven`.
    ///
    /// Every driven wire has at most one driver. The driver must be a wire its
    /// node produces, and the driven wire one its node consumes.
    pub fn connect(&mut self, driver: WireRef, driven: WireRef) -> Result<(), ConnectError> {
        if !self.wire_exists(driver)
            || !self.wire_exists(driven)
            || !driver.is_produced()
            || driven.is_produced()
        {
            return Err(ConnectError::InvalidWire { driver, driven });
        }
        if let Some(existing) = self.driver_of(driven) {
            return Err(ConnectError::AlreadyDriven { driven, existing });
        }
        self.drivers.insert(driven, self.connections.len());
        self.connections.push(Connection { driver, driven });
        Ok(())
    }

    /// Returns the driver of a wire, if connected.
    pub fn driver_of(&self, driven: WireRef) -> Option<WireRef> {
        self.drivers
            .get(&driven)
            .map(|&index| self.connections[index].driver)
    }

    /// Returns every connection in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{InterfaceKind, InterfaceStructure};
    use gapl_common::Interner;

    fn passthrough_module(interner: &Interner) -> (Module, NodeId, NodeId) {
        let input = PortDescription::signal(interner.get_or_intern("a"), InterfaceStructure::bus(2));
        let output = PortDescription::signal(interner.get_or_intern("b"), InterfaceStructure::bus(2));
        let mut module = Module::new(
            ModuleInvocation::plain(interner.get_or_intern("top")),
            vec![input.clone()],
            vec![output.clone()],
        );
        let a = module.add_node(input.name, NodeKind::ModuleInput, vec![], vec![input]);
        let b = module.add_node(output.name, NodeKind::ModuleOutput, vec![output], vec![]);
        (module, a, b)
    }

    fn data(node: NodeId, side: Side, leaf: u32) -> WireRef {
        WireRef {
            node,
            side,
            port: 0,
            slot: WireSlot::Data(leaf),
        }
    }

    #[test]
    fn connect_and_query_driver() {
        let interner = Interner::new();
        let (mut module, a, b) = passthrough_module(&interner);
        module
            .connect(data(a, Side::Output, 1), data(b, Side::Input, 1))
            .unwrap();
        assert_eq!(
            module.driver_of(data(b, Side::Input, 1)),
            Some(data(a, Side::Output, 1))
        );
        assert_eq!(module.driver_of(data(b, Side::Input, 0)), None);
        assert_eq!(module.connections().len(), 1);
    }

    #[test]
    fn second_driver_is_rejected() {
        let interner = Interner::new();
        let (mut module, a, b) = passthrough_module(&interner);
        module
            .connect(data(a, Side::Output, 0), data(b, Side::Input, 0))
            .unwrap();
        let err = module
            .connect(data(a, Side::Output, 1), data(b, Side::Input, 0))
            .unwrap_err();
        assert!(matches!(err, ConnectError::AlreadyDriven { .. }));
    }

    #[test]
    fn wrong_direction_is_rejected() {
        let interner = Interner::new();
        let (mut module, a, b) = passthrough_module(&interner);
        let err = module
            .connect(data(b, Side::Input, 0), data(a, Side::Output, 0))
            .unwrap_err();
        assert!(matches!(err, ConnectError::InvalidWire { .. }));
        let err = module
            .connect(data(a, Side::Output, 5), data(b, Side::Input, 0))
            .unwrap_err();
        assert!(matches!(err, ConnectError::InvalidWire { .. }));
    }

    #[test]
    fn handshake_wires_exist_only_on_streams() {
        let interner = Interner::new();
        let (mut module, a, b) = passthrough_module(&interner);
        let valid = |node, side| WireRef {
            node,
            side,
            port: 0,
            slot: WireSlot::Valid,
        };
        assert!(module
            .connect(valid(a, Side::Output), valid(b, Side::Input))
            .is_err());

        let mut stream = PortDescription::signal(interner.get_or_intern("s"), InterfaceStructure::Wire);
        stream.kind = InterfaceKind::Stream;
        let src = module.add_node(stream.name, NodeKind::ModuleInput, vec![], vec![stream.clone()]);
        let dst = module.add_node(interner.get_or_intern("t"), NodeKind::ModuleOutput, vec![stream], vec![]);
        module
            .connect(valid(src, Side::Output), valid(dst, Side::Input))
            .unwrap();
        let ready = |node, side| WireRef {
            node,
            side,
            port: 0,
            slot: WireSlot::Ready,
        };
        module
            .connect(ready(dst, Side::Input), ready(src, Side::Output))
            .unwrap();
    }

    #[test]
    fn io_nodes_are_listed() {
        let interner = Interner::new();
        let (module, a, b) = passthrough_module(&interner);
        assert_eq!(module.input_nodes(), vec![a]);
        assert_eq!(module.output_nodes(), vec![b]);
        assert!(!module.has_registers());
    }
}
