//! Lexical scopes.
//!
//! A [`Scope`] borrows its parent, so the chain for a conditional branch lives
//! on the stack of the resolver and is dropped when the branch is done.

use crate::error::ResolveError;
use gapl_common::{Ident, Interner};
use gapl_ir::PredefinedOp;
use std::collections::{HashMap, HashSet};

/// What a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    /// A program-level interface definition.
    Interface,
    /// A program-level function definition.
    Function,
    /// An interface generic parameter.
    GenericInterface,
    /// An integer generic parameter.
    IntegerParameter,
    /// A function generic parameter.
    FunctionParameter,
    /// A function input.
    Input,
    /// A function output.
    Output,
    /// A declared node.
    Node,
    /// A predefined function from the intrinsic table.
    Predefined,
}

impl Declaration {
    /// Short description for diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::Function => "function",
            Self::GenericInterface => "interface parameter",
            Self::IntegerParameter => "integer parameter",
            Self::FunctionParameter => "function parameter",
            Self::Input => "input",
            Self::Output => "output",
            Self::Node => "node",
            Self::Predefined => "predefined function",
        }
    }
}

/// The construct a scope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The whole program.
    Program,
    /// A function definition.
    Function(Ident),
    /// An interface definition.
    Interface(Ident),
    /// One branch of a conditional.
    Conditional,
}

/// A set of declarations with an optional enclosing scope.
#[derive(Debug)]
pub struct Scope<'p> {
    kind: ScopeKind,
    symbols: Vec<(Ident, Declaration)>,
    table: HashMap<Ident, Declaration>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    /// Creates the outermost scope.
    pub fn root(
        kind: ScopeKind,
        symbols: Vec<(Ident, Declaration)>,
        interner: &Interner,
    ) -> Result<Self, ResolveError> {
        Self::build(kind, symbols, None, interner)
    }

    /// Creates a scope nested in `self`.
    pub fn child<'c>(
        &'c self,
        kind: ScopeKind,
        symbols: Vec<(Ident, Declaration)>,
        interner: &Interner,
    ) -> Result<Scope<'c>, ResolveError> {
        Scope::build(kind, symbols, Some(self), interner)
    }

    fn build(
        kind: ScopeKind,
        symbols: Vec<(Ident, Declaration)>,
        parent: Option<&'p Scope<'p>>,
        interner: &Interner,
    ) -> Result<Self, ResolveError> {
        let scope = Self {
            kind,
            table: symbols.iter().copied().collect(),
            symbols,
            parent,
        };
        scope.validate_symbols(interner)?;
        Ok(scope)
    }

    /// Returns the declarations of this scope in declaration order.
    pub fn symbols(&self) -> &[(Ident, Declaration)] {
        &self.symbols
    }

    /// Returns the kind of this scope.
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Looks a name up in this scope only.
    pub fn resolve_local(&self, name: Ident) -> Option<Declaration> {
        self.table.get(&name).copied()
    }

    /// Looks a name up in this scope, then in each enclosing scope.
    pub fn resolve_global(&self, name: Ident) -> Option<Declaration> {
        self.resolve_local(name)
            .or_else(|| self.parent.and_then(|p| p.resolve_global(name)))
    }

    /// Looks a name up through the scope chain, then the intrinsic table.
    pub fn resolve(&self, name: Ident, interner: &Interner) -> Result<Declaration, ResolveError> {
        self.resolve_global(name)
            .or_else(|| PredefinedOp::from_name(interner.resolve(name)).map(|_| Declaration::Predefined))
            .ok_or_else(|| ResolveError::UnresolvedSymbol {
                name: interner.resolve(name).to_string(),
            })
    }

    /// Rejects duplicate names and names of predefined functions.
    pub fn validate_symbols(&self, interner: &Interner) -> Result<(), ResolveError> {
        let mut seen = HashSet::new();
        for (name, _) in &self.symbols {
            let text = interner.resolve(*name);
            if !seen.insert(*name) || PredefinedOp::from_name(text).is_some() {
                return Err(ResolveError::Redeclaration {
                    name: text.to_string(),
                    scope: self.describe(interner),
                });
            }
        }
        Ok(())
    }

    fn describe(&self, interner: &Interner) -> String {
        match self.kind {
            ScopeKind::Program => "program".to_string(),
            ScopeKind::Function(name) => format!("function `{}`", interner.resolve(name)),
            ScopeKind::Interface(name) => format!("interface `{}`", interner.resolve(name)),
            ScopeKind::Conditional => match self.parent {
                Some(parent) => format!("conditional block of {}", parent.describe(interner)),
                None => "conditional block".to_string(),
            },
        }
    }
}
