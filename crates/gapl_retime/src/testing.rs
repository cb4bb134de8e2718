//! Hand-built modules for retiming tests.

use gapl_common::Interner;
use gapl_ir::{
    InterfaceKind, InterfaceStructure, Module, ModuleInvocation, NodeId, NodeKind,
    PortDescription, PredefinedFunction, Side, WireRef, WireSlot,
};

pub(crate) struct Builder<'i> {
    pub(crate) interner: &'i Interner,
    pub(crate) module: Module,
}

impl<'i> Builder<'i> {
    pub(crate) fn new(interner: &'i Interner, width: u32, kind: InterfaceKind) -> Self {
        let port = |name| PortDescription {
            name: interner.get_or_intern(name),
            structure: InterfaceStructure::bus(width),
            kind,
        };
        let module = Module::new(
            ModuleInvocation::plain(interner.get_or_intern("top")),
            vec![port("a")],
            vec![port("b")],
        );
        let mut builder = Self { interner, module };
        let (a, b) = (port("a"), port("b"));
        builder.module.add_node(a.name, NodeKind::ModuleInput, vec![], vec![a]);
        builder.module.add_node(b.name, NodeKind::ModuleOutput, vec![b], vec![]);
        builder
    }

    pub(crate) fn io(&self, name: &str) -> NodeId {
        let ident = self.interner.get_or_intern(name);
        self.module
            .nodes()
            .iter()
            .find(|(_, n)| n.name == ident)
            .map(|(id, _)| id)
            .unwrap()
    }

    pub(crate) fn add(&mut self, name: &str, function: PredefinedFunction) -> NodeId {
        let signature = function.signature(self.interner);
        self.module.add_node(
            self.interner.get_or_intern(name),
            NodeKind::Predefined(function),
            signature.inputs,
            signature.outputs,
        )
    }

    pub(crate) fn link(&mut self, from: NodeId, from_port: u32, to: NodeId, to_port: u32) {
        let width = self.module.node(to).inputs[to_port as usize].structure.width();
        for leaf in 0..width {
            self.module
                .connect(
                    WireRef {
                        node: from,
                        side: Side::Output,
                        port: from_port,
                        slot: WireSlot::Data(leaf),
                    },
                    WireRef {
                        node: to,
                        side: Side::Input,
                        port: to_port,
                        slot: WireSlot::Data(leaf),
                    },
                )
                .unwrap();
        }
    }

    /// a -> not x3 -> register x2 -> b, all one wire wide.
    pub(crate) fn late_registers(interner: &'i Interner) -> Self {
        let mut builder = Self::new(interner, 1, InterfaceKind::Signal);
        let (a, b) = (builder.io("a"), builder.io("b"));
        let bit = || PredefinedFunction::BitwiseNot { size: 1 };
        let reg = || PredefinedFunction::Register(InterfaceStructure::bus(1));
        let n1 = builder.add("n1", bit());
        let n2 = builder.add("n2", bit());
        let n3 = builder.add("n3", bit());
        let r1 = builder.add("r1", reg());
        let r2 = builder.add("r2", reg());
        builder.link(a, 0, n1, 0);
        builder.link(n1, 0, n2, 0);
        builder.link(n2, 0, n3, 0);
        builder.link(n3, 0, r1, 0);
        builder.link(r1, 0, r2, 0);
        builder.link(r2, 0, b, 0);
        builder
    }
}
