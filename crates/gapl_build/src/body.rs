//! Node construction and wiring for one function body.
//!
//! Each block of statements is built in two passes. The first creates every
//! node declared in the block's connection chains, including those in nested
//! sub-chains, so references may precede declarations. The second wires the
//! chains and descends into the taken branch of each conditional.

use std::collections::HashMap;

use gapl_ast::{Accessor, CircuitExpr, CircuitNode, NodeBody, Statement};
use gapl_common::{Ident, Interner, InternalError};
use gapl_ir::{
    ConnectError, Module, ModuleInvocation, NodeId, NodeKind, PortDescription, PortTree, Side,
    WireRef, WireSlot,
};

use crate::bindings::Bindings;
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::eval::eval_static;
use crate::expand::{Callee, Expander};

/// One side of a port, possibly narrowed by accessors.
#[derive(Debug, Clone)]
struct Endpoint {
    node: NodeId,
    port: u32,
    tree: PortTree,
    /// No accessor narrowed the port.
    whole: bool,
}

/// What a chain element offers to its neighbours.
#[derive(Debug, Default)]
struct Ends {
    /// Input-side endpoints, driven by the previous stage.
    sinks: Vec<Endpoint>,
    /// Output-side endpoints, driving the next stage.
    sources: Vec<Endpoint>,
}

pub(crate) struct BodyBuilder<'c, 'a> {
    ctx: &'c mut BuildContext<'a>,
    expander: Expander<'a>,
    interner: &'a Interner,
    bindings: Bindings,
    module: Module,
    scopes: Vec<HashMap<Ident, NodeId>>,
    anonymous: u32,
    label: String,
}

impl<'c, 'a> BodyBuilder<'c, 'a> {
    pub(crate) fn new(ctx: &'c mut BuildContext<'a>, module: Module, bindings: Bindings) -> Self {
        let interner = ctx.interner();
        let label = module.invocation.describe(interner);
        Self {
            expander: ctx.expander(),
            ctx,
            interner,
            bindings,
            module,
            scopes: Vec::new(),
            anonymous: 0,
            label,
        }
    }

    pub(crate) fn build(mut self, statements: &[Statement]) -> Result<Module, BuildError> {
        let mut io = HashMap::new();
        for port in self.module.inputs.clone() {
            let name = port.name;
            let id = self
                .module
                .add_node(name, NodeKind::ModuleInput, vec![], vec![port]);
            io.insert(name, id);
        }
        for port in self.module.outputs.clone() {
            let name = port.name;
            let id = self
                .module
                .add_node(name, NodeKind::ModuleOutput, vec![port], vec![]);
            io.insert(name, id);
        }
        self.scopes.push(io);
        self.block(statements)?;
        Ok(self.module)
    }

    fn block(&mut self, statements: &[Statement]) -> Result<(), BuildError> {
        self.scopes.push(HashMap::new());
        for statement in statements {
            if let Statement::Connection(chain) = statement {
                self.declare(chain)?;
            }
        }
        for statement in statements {
            match statement {
                Statement::Connection(chain) => {
                    self.chain(chain)?;
                }
                Statement::Conditional {
                    predicate,
                    if_body,
                    else_body,
                } => {
                    let taken = if eval_static(predicate, &self.bindings, self.interner)? != 0 {
                        if_body
                    } else {
                        else_body
                    };
                    self.block(taken)?;
                }
            }
        }
        self.scopes.pop();
        Ok(())
    }

    fn declare(&mut self, chain: &CircuitExpr) -> Result<(), BuildError> {
        for node in chain.groups.iter().flat_map(|g| &g.nodes) {
            match node {
                CircuitNode::Declared { name, body } => {
                    let id = self.create(*name, body)?;
                    if let Some(scope) = self.scopes.last_mut() {
                        scope.insert(*name, id);
                    }
                }
                CircuitNode::Nested(inner) => self.declare(inner)?,
                CircuitNode::Reference { .. } | CircuitNode::Anonymous(_) => {}
            }
        }
        Ok(())
    }

    fn lookup(&self, name: Ident) -> Result<NodeId, BuildError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
            .ok_or_else(|| self.unresolved(self.interner.resolve(name).to_string()))
    }

    fn unresolved(&self, name: String) -> BuildError {
        BuildError::UnresolvedPort {
            module: self.label.clone(),
            name,
        }
    }

    fn create(&mut self, name: Ident, body: &NodeBody) -> Result<NodeId, BuildError> {
        match body {
            NodeBody::Function(instantiation) => {
                let invocation = self.expander.instantiate(instantiation, &self.bindings)?;
                self.instance(name, invocation)
            }
            NodeBody::GenericFunction(parameter) => {
                let invocation = self.bindings.function(*parameter).cloned().ok_or_else(|| {
                    BuildError::UnboundGeneric {
                        name: self.interner.resolve(*parameter).to_string(),
                    }
                })?;
                self.instance(name, invocation)
            }
            NodeBody::Interface(expr) => {
                let structure = self.expander.interface(expr, &self.bindings)?;
                let port = PortDescription::signal(name, structure);
                Ok(self
                    .module
                    .add_node(name, NodeKind::PassThrough, vec![port.clone()], vec![port]))
            }
        }
    }

    fn instance(&mut self, name: Ident, invocation: ModuleInvocation) -> Result<NodeId, BuildError> {
        match self.expander.callee(invocation.function)? {
            Callee::Predefined(op) => {
                let function = self.expander.predefined(op, &invocation)?;
                let signature = function.signature(self.interner);
                Ok(self.module.add_node(
                    name,
                    NodeKind::Predefined(function),
                    signature.inputs,
                    signature.outputs,
                ))
            }
            Callee::Function(_) => {
                let module = self.ctx.build(&invocation)?;
                let nested = self.ctx.design().module(module);
                let (inputs, outputs) = (nested.inputs.clone(), nested.outputs.clone());
                Ok(self.module.add_node(
                    name,
                    NodeKind::Invocation { module, invocation },
                    inputs,
                    outputs,
                ))
            }
        }
    }

    fn anonymous_name(&mut self) -> Ident {
        let name = format!("anonymous_{}", self.anonymous);
        self.anonymous += 1;
        self.interner.get_or_intern(&name)
    }

    fn chain(&mut self, chain: &CircuitExpr) -> Result<Ends, BuildError> {
        let mut stages = Vec::with_capacity(chain.groups.len());
        for group in &chain.groups {
            let mut ends = Ends::default();
            for node in &group.nodes {
                let node_ends = self.circuit_node(node)?;
                ends.sinks.extend(node_ends.sinks);
                ends.sources.extend(node_ends.sources);
            }
            stages.push(ends);
        }
        for pair in stages.windows(2) {
            self.connect_stage(&pair[0].sources, &pair[1].sinks)?;
        }

        let mut stages = stages.into_iter();
        let first = stages.next().unwrap_or_default();
        Ok(match stages.last() {
            Some(last) => Ends {
                sinks: first.sinks,
                sources: last.sources,
            },
            None => first,
        })
    }

    fn circuit_node(&mut self, node: &CircuitNode) -> Result<Ends, BuildError> {
        match node {
            CircuitNode::Reference { name, accessors } => self.reference(*name, accessors),
            CircuitNode::Declared { name, .. } => {
                let id = self.lookup(*name)?;
                Ok(self.whole(id))
            }
            CircuitNode::Anonymous(body) => {
                let name = self.anonymous_name();
                let id = self.create(name, body)?;
                Ok(self.whole(id))
            }
            CircuitNode::Nested(inner) => self.chain(inner),
        }
    }

    fn endpoints(&self, id: NodeId, side: Side) -> Vec<Endpoint> {
        self.module
            .node(id)
            .ports(side)
            .iter()
            .map(|port| Endpoint {
                node: id,
                port: port.parent.index,
                tree: port.tree.clone(),
                whole: true,
            })
            .collect()
    }

    fn whole(&self, id: NodeId) -> Ends {
        Ends {
            sinks: self.endpoints(id, Side::Input),
            sources: self.endpoints(id, Side::Output),
        }
    }

    fn reference(&self, name: Ident, accessors: &[Accessor]) -> Result<Ends, BuildError> {
        let id = self.lookup(name)?;
        let node = self.module.node(id);
        let mut ends = self.whole(id);
        let mut rest = accessors;

        // On instances a leading member access picks a port by name.
        if matches!(node.kind, NodeKind::Invocation { .. } | NodeKind::Predefined(_)) {
            if let Some((Accessor::Member(port), tail)) = accessors.split_first() {
                ends.sinks.retain(|e| node.inputs[e.port as usize].name == *port);
                ends.sources.retain(|e| node.outputs[e.port as usize].name == *port);
                if ends.sinks.is_empty() && ends.sources.is_empty() {
                    return Err(self.unresolved(format!(
                        "{}.{}",
                        self.interner.resolve(name),
                        self.interner.resolve(*port)
                    )));
                }
                rest = tail;
            }
        }

        for accessor in rest {
            for endpoint in ends.sinks.iter_mut().chain(ends.sources.iter_mut()) {
                endpoint.tree = self.access(&endpoint.tree, accessor)?;
                endpoint.whole = false;
            }
        }
        Ok(ends)
    }

    fn access(&self, tree: &PortTree, accessor: &Accessor) -> Result<PortTree, BuildError> {
        match accessor {
            Accessor::Member(member) => tree
                .member(*member)
                .cloned()
                .ok_or_else(|| self.unresolved(self.interner.resolve(*member).to_string())),
            Accessor::Index(index) => {
                let len = self.vector_len(tree, "index")?;
                let index = eval_static(index, &self.bindings, self.interner)?;
                let checked = self.in_range(index, len)?;
                tree.index(checked)
                    .cloned()
                    .ok_or_else(|| self.out_of_range(index, len))
            }
            Accessor::Slice(start, end) => {
                let len = self.vector_len(tree, "slice")?;
                let start = eval_static(start, &self.bindings, self.interner)?;
                let end = eval_static(end, &self.bindings, self.interner)?;
                let first = self.in_range(start, len)?;
                let last = self.in_range(end, len)?;
                if first > last {
                    return Err(BuildError::ReversedSlice {
                        module: self.label.clone(),
                        first: start,
                        last: end,
                    });
                }
                tree.slice(first, last)
                    .ok_or_else(|| self.out_of_range(end, len))
            }
        }
    }

    fn vector_len(&self, tree: &PortTree, access: &str) -> Result<u32, BuildError> {
        tree.vector_len().ok_or_else(|| BuildError::TypeMismatch {
            context: format!("{access} access in `{}`", self.label),
            expected: "vector".to_string(),
            found: tree.structure().describe(self.interner),
        })
    }

    fn in_range(&self, index: i64, len: u32) -> Result<u32, BuildError> {
        u32::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or_else(|| self.out_of_range(index, len))
    }

    fn out_of_range(&self, index: i64, len: u32) -> BuildError {
        BuildError::IndexOutOfRange {
            module: self.label.clone(),
            index,
            len,
        }
    }

    fn connect_stage(&mut self, sources: &[Endpoint], sinks: &[Endpoint]) -> Result<(), BuildError> {
        if sources.len() != sinks.len() {
            return Err(BuildError::ConnectionShape {
                module: self.label.clone(),
                driver: format!("{} output(s)", sources.len()),
                driven: format!("{} input(s)", sinks.len()),
            });
        }
        for (source, sink) in sources.iter().zip(sinks) {
            self.connect(source, sink)?;
        }
        Ok(())
    }

    fn connect(&mut self, source: &Endpoint, sink: &Endpoint) -> Result<(), BuildError> {
        let pairs = source.tree.pair_leaves(&sink.tree).ok_or_else(|| {
            BuildError::ConnectionShape {
                module: self.label.clone(),
                driver: self.describe_endpoint(source, Side::Output),
                driven: self.describe_endpoint(sink, Side::Input),
            }
        })?;
        let wire = |endpoint: &Endpoint, side, slot| WireRef {
            node: endpoint.node,
            side,
            port: endpoint.port,
            slot,
        };
        for (from, to) in pairs {
            self.wire(
                wire(source, Side::Output, WireSlot::Data(from)),
                wire(sink, Side::Input, WireSlot::Data(to)),
            )?;
        }

        let is_stream = |endpoint: &Endpoint, side| {
            self.module.node(endpoint.node).ports(side)[endpoint.port as usize].has_handshake()
        };
        if source.whole && sink.whole && is_stream(source, Side::Output) && is_stream(sink, Side::Input)
        {
            self.wire(
                wire(source, Side::Output, WireSlot::Valid),
                wire(sink, Side::Input, WireSlot::Valid),
            )?;
            self.wire(
                wire(sink, Side::Input, WireSlot::Ready),
                wire(source, Side::Output, WireSlot::Ready),
            )?;
        }
        Ok(())
    }

    fn wire(&mut self, driver: WireRef, driven: WireRef) -> Result<(), BuildError> {
        self.module
            .connect(driver, driven)
            .map_err(|err| match err {
                ConnectError::AlreadyDriven { driven, .. } => BuildError::MultipleDrivers {
                    module: self.label.clone(),
                    wire: self.describe_wire(driven),
                },
                ConnectError::InvalidWire { .. } => InternalError::new(err.to_string()).into(),
            })
    }

    fn port_label(&self, node: NodeId, side: Side, port: u32) -> String {
        let node = self.module.node(node);
        let port = &node.ports(side)[port as usize];
        format!(
            "{}.{}",
            self.interner.resolve(node.name),
            self.interner.resolve(port.name)
        )
    }

    fn describe_endpoint(&self, endpoint: &Endpoint, side: Side) -> String {
        format!(
            "`{}` ({})",
            self.port_label(endpoint.node, side, endpoint.port),
            endpoint.tree.structure().describe(self.interner)
        )
    }

    fn describe_wire(&self, wire: WireRef) -> String {
        let port = self.port_label(wire.node, wire.side, wire.port);
        match wire.slot {
            WireSlot::Data(leaf) => format!("`{port}` bit {leaf}"),
            WireSlot::Valid => format!("`{port}` valid"),
            WireSlot::Ready => format!("`{port}` ready"),
        }
    }
}
