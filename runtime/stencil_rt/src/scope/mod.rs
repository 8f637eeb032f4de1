//! Variable scope chain for compiled render logic.
//!
//! Scopes form a singly-linked chain, child to parent, never cyclic. A
//! lookup checks local bindings, then delegates to the parent, and yields
//! the undefined sentinel when the name is bound nowhere - no lookup ever
//! fails. Overlay scopes are created per block, loop, or local construct
//! and discarded when that logic returns; a child never mutates its parent.

use rustc_hash::FxHashMap;

use crate::shared::SharedCell;
use stencil_value::Value;

/// A shared handle to one node of the scope chain.
pub type ScopeNode = SharedCell<Scope>;

/// A single scope containing variable bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    /// Variable bindings in this scope.
    bindings: FxHashMap<String, Value>,
    /// Parent scope, for lexical delegation.
    parent: Option<ScopeNode>,
}

impl Scope {
    /// Create a new empty scope with no parent.
    pub fn new() -> Self {
        Scope::default()
    }

    /// Create a new scope with a parent.
    pub fn with_parent(parent: ScopeNode) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Create a root scope from initial bindings.
    pub fn from_bindings(bindings: impl IntoIterator<Item = (String, Value)>) -> Self {
        Scope {
            bindings: bindings.into_iter().collect(),
            parent: None,
        }
    }

    /// Define a variable in this scope, shadowing any parent binding.
    #[inline]
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a variable by name.
    ///
    /// Checks local bindings first, then the parent chain. A name bound
    /// nowhere yields the sentinel carrying the name - never an error.
    pub fn lookup(&self, name: &str) -> Value {
        if let Some(value) = self.bindings.get(name) {
            return value.clone();
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup(name);
        }
        Value::undefined_named(name)
    }

    /// The parent node, if this is not a root scope.
    pub fn parent(&self) -> Option<ScopeNode> {
        self.parent.clone()
    }
}

/// Create a child scope node with the given bindings whose parent is
/// `parent`. The parent is shared, not copied, and is never mutated.
pub fn overlay(
    parent: &ScopeNode,
    bindings: impl IntoIterator<Item = (String, Value)>,
) -> ScopeNode {
    let mut scope = Scope::with_parent(parent.clone());
    for (name, value) in bindings {
        scope.define(name, value);
    }
    SharedCell::new(scope)
}
