//! Resolved abstract syntax tree of GAPL programs.
//!
//! Every name in this tree has been checked against its scope and every
//! expression has been classified by the role it plays: a static value, an
//! interface, or a node in a circuit. Names are interned [`Ident`]s.

#![warn(missing_docs)]

use gapl_common::Ident;
use serde::Serialize;

/// A resolved program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Interface definitions in source order.
    pub interfaces: Vec<InterfaceDefinition>,
    /// Function definitions in source order.
    pub functions: Vec<FunctionDefinition>,
}

impl Program {
    /// Finds a function definition by name.
    pub fn function(&self, name: Ident) -> Option<&FunctionDefinition> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Finds an interface definition by name.
    pub fn interface(&self, name: Ident) -> Option<&InterfaceDefinition> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// Generic parameters, split by kind but each kept in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GenericDefinitions {
    /// Interface parameters.
    pub interfaces: Vec<Ident>,
    /// Integer and function parameters.
    pub parameters: Vec<ParameterDefinition>,
}

impl GenericDefinitions {
    /// Returns `true` if there are no generic parameters at all.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.parameters.is_empty()
    }
}

/// An integer or function generic parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDefinition {
    /// Parameter name.
    pub name: Ident,
    /// Parameter kind.
    pub ty: ParameterType,
}

/// Kind of a non-interface generic parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParameterType {
    /// A static integer.
    Integer,
    /// A function with the given port interfaces.
    Function {
        /// Input interfaces.
        inputs: Vec<InterfaceExpr>,
        /// Output interfaces.
        outputs: Vec<InterfaceExpr>,
    },
}

/// A resolved `interface` definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDefinition {
    /// Declared name.
    pub name: Ident,
    /// Generic parameters.
    pub generics: GenericDefinitions,
    /// Alias target or record members.
    pub body: InterfaceBody,
}

/// The body of an interface definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InterfaceBody {
    /// Another interface expression.
    Alias(InterfaceExpr),
    /// Named members in declaration order.
    Record(Vec<(Ident, InterfaceExpr)>),
}

/// A resolved `function` definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    /// Declared name.
    pub name: Ident,
    /// Generic parameters.
    pub generics: GenericDefinitions,
    /// Inputs in order.
    pub inputs: Vec<FunctionIo>,
    /// Outputs in order.
    pub outputs: Vec<FunctionIo>,
    /// Body statements.
    pub statements: Vec<Statement>,
}

/// Whether a function port is a plain signal or a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IoKind {
    /// Plain signal.
    Signal,
    /// Valid/ready stream.
    Stream,
}

/// A function input or output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionIo {
    /// Port name.
    pub name: Ident,
    /// Signal or stream.
    pub kind: IoKind,
    /// Port interface.
    pub interface: InterfaceExpr,
}

/// An interface expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InterfaceExpr {
    /// `wire`
    Wire,
    /// `element[size]`
    Vector {
        /// Element interface.
        element: Box<InterfaceExpr>,
        /// Static size.
        size: StaticExpr,
    },
    /// A generic interface parameter.
    Generic(Ident),
    /// A defined interface with its generic values.
    Defined {
        /// Interface name.
        name: Ident,
        /// Interface values.
        interfaces: Vec<InterfaceExpr>,
        /// Parameter values.
        parameters: Vec<ParameterValueExpr>,
    },
}

/// A value bound to an integer or function generic parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParameterValueExpr {
    /// A static integer.
    Static(StaticExpr),
    /// A function instantiation.
    Instantiation(Instantiation),
    /// A function parameter of the enclosing definition, passed through.
    FunctionReference(Ident),
}

/// A function with its generic values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instantiation {
    /// Function name; user-defined or predefined.
    pub function: Ident,
    /// Interface values.
    pub interfaces: Vec<InterfaceExpr>,
    /// Parameter values.
    pub parameters: Vec<ParameterValueExpr>,
}

/// A static (compile-time) expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StaticExpr {
    /// Integer literal.
    Int(i64),
    /// `true` / `false`.
    Bool(bool),
    /// An integer generic parameter.
    Param(Ident),
    /// A binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<StaticExpr>,
        /// Right operand.
        rhs: Box<StaticExpr>,
    },
}

/// Static binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&&`
    And,
    /// `||`
    Or,
}

/// A statement in a function body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// Statements instantiated only when the predicate is non-zero.
    Conditional {
        /// Static predicate.
        predicate: StaticExpr,
        /// Taken when the predicate is non-zero.
        if_body: Vec<Statement>,
        /// Taken otherwise.
        else_body: Vec<Statement>,
    },
    /// A connection chain.
    Connection(CircuitExpr),
}

/// A connection chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitExpr {
    /// Stages in order.
    pub groups: Vec<CircuitGroup>,
}

/// One stage of a chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitGroup {
    /// Nodes in order.
    pub nodes: Vec<CircuitNode>,
}

/// A node in a chain stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CircuitNode {
    /// A port or declared node, narrowed by accessors.
    Reference {
        /// Referenced name.
        name: Ident,
        /// Accessors applied in order.
        accessors: Vec<Accessor>,
    },
    /// `declare name: body`
    Declared {
        /// Node name.
        name: Ident,
        /// What the node is.
        body: NodeBody,
    },
    /// An unnamed node.
    Anonymous(NodeBody),
    /// A parenthesized sub-chain.
    Nested(CircuitExpr),
}

/// What a created node is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeBody {
    /// An instance of a function.
    Function(Instantiation),
    /// An instance of a function parameter of the enclosing definition.
    GenericFunction(Ident),
    /// A pass-through of the given interface.
    Interface(InterfaceExpr),
}

/// An access on a referenced port or node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Accessor {
    /// `.name`
    Member(Ident),
    /// `[index]`
    Index(StaticExpr),
    /// `[start:end]`, inclusive.
    Slice(StaticExpr, StaticExpr),
}
