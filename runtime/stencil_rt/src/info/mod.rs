//! Per-hierarchy shared state: the block-override protocol.
//!
//! One `HierarchyInfo` is created per root render and threaded through
//! level-preserving evaluations. Each `extends` hop derives a fresh info
//! that inherits a snapshot of the current override map, so the parent
//! template - which registers its own blocks *after* the child's - resolves
//! blocks the child already declared without knowing about the child. The
//! template cache and the export table are shared (same cell) across the
//! whole hierarchy.
//!
//! # Override levels
//!
//! Override lists are append-only and registration-ordered: the most
//! recently extended (most specific) template's entry comes first. Levels
//! are 1-based from the most specific entry; level 1 is the default, and a
//! block body delegating to the next less-specific override asks for its
//! own level plus one.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{FilterFn, SharedConfig, TestFn};
use crate::error::{
    block_level_out_of_range, unknown_block, unknown_filter, unknown_test, RenderResult,
};
use crate::output::SharedSink;
use crate::scope::ScopeNode;
use crate::shared::SharedCell;
use crate::state::RenderState;
use crate::template::{BlockFn, SharedUnit};
use stencil_value::Value;

/// The default block level: the most specific override.
pub const DEFAULT_BLOCK_LEVEL: usize = 1;

/// How a derived hierarchy info relates to the one it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Template inheritance: the parent inherits the child's override map
    /// snapshot and shares the export table.
    Extends,
    /// Inclusion: fresh overrides, shared exports.
    Include,
    /// Import: fresh overrides and a fresh export table - the imported
    /// template's exports become the module namespace.
    Import,
}

/// State shared across one inheritance chain's render.
pub struct HierarchyInfo {
    config: SharedConfig,
    template_name: String,
    /// Autoescape default for this template, from the configuration.
    pub autoescape: bool,
    filters: FxHashMap<String, FilterFn>,
    tests: FxHashMap<String, TestFn>,
    /// Block name to override list, append-only during setup phases.
    overrides: RefCell<FxHashMap<String, Vec<BlockFn>>>,
    cache: SharedCell<FxHashMap<String, SharedUnit>>,
    exports: SharedCell<FxHashMap<String, Value>>,
}

impl HierarchyInfo {
    /// Create the root hierarchy info for a fresh render.
    pub fn new(config: SharedConfig, template_name: &str) -> Rc<Self> {
        let autoescape = config.autoescape_default(template_name);
        let filters = config.filters();
        let tests = config.tests();
        Rc::new(HierarchyInfo {
            config,
            template_name: template_name.to_string(),
            autoescape,
            filters,
            tests,
            overrides: RefCell::new(FxHashMap::default()),
            cache: SharedCell::default(),
            exports: SharedCell::default(),
        })
    }

    /// Derive the info for evaluating another template from this one.
    pub fn derive(self: &Rc<Self>, behavior: Behavior, template_name: &str) -> Rc<Self> {
        let overrides = match behavior {
            Behavior::Extends => self.overrides.borrow().clone(),
            Behavior::Include | Behavior::Import => FxHashMap::default(),
        };
        let exports = match behavior {
            Behavior::Extends | Behavior::Include => self.exports.clone(),
            Behavior::Import => SharedCell::default(),
        };
        Rc::new(HierarchyInfo {
            config: self.config.clone(),
            template_name: template_name.to_string(),
            autoescape: self.config.autoescape_default(template_name),
            filters: self.config.filters(),
            tests: self.config.tests(),
            overrides: RefCell::new(overrides),
            cache: self.cache.clone(),
            exports,
        })
    }

    /// The name of the template this info was created for.
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// The active configuration.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Append a block body to the override list for `name`.
    ///
    /// Registration order is override order: setup phases run most-specific
    /// template first, so the first entry is the most specific.
    pub fn register_block(&self, name: &str, func: BlockFn) {
        tracing::trace!(block = name, template = %self.template_name, "registering block");
        self.overrides
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push(func);
    }

    /// Number of overrides registered under `name` (0 if unknown).
    ///
    /// A block body can check this before delegating to a less-specific
    /// level.
    pub fn override_depth(&self, name: &str) -> usize {
        self.overrides.borrow().get(name).map_or(0, Vec::len)
    }

    /// Evaluate the override of `name` at `level` against a fresh state.
    ///
    /// Level 1 is the most specific override; level k selects the k-th
    /// entry in registration order. An unknown name is `UnknownBlock`; a
    /// level past the end of the list is `BlockLevelOutOfRange`. The block
    /// body shares this hierarchy info, so delegation and nested block
    /// evaluation keep working inside it.
    pub fn evaluate_block(
        self: &Rc<Self>,
        name: &str,
        level: usize,
        scope: ScopeNode,
        sink: &SharedSink,
    ) -> RenderResult<()> {
        let func = {
            let overrides = self.overrides.borrow();
            let list = overrides.get(name).ok_or_else(|| unknown_block(name))?;
            if level == 0 || level > list.len() {
                return Err(block_level_out_of_range(name, level, list.len()));
            }
            list[level - 1]
        };
        let mut state = RenderState::from_info(scope, sink.clone(), Rc::clone(self));
        func(&mut state)
    }

    /// Apply the named filter to `value` with `args`.
    pub fn call_filter(&self, name: &str, value: &Value, args: &[Value]) -> RenderResult<Value> {
        let func = self.filters.get(name).ok_or_else(|| unknown_filter(name))?;
        func(value, args)
    }

    /// Apply the named test to `value` with `args`.
    pub fn call_test(&self, name: &str, value: &Value, args: &[Value]) -> RenderResult<bool> {
        let func = self.tests.get(name).ok_or_else(|| unknown_test(name))?;
        func(value, args)
    }

    /// Record a value published by a template for inclusion/import use.
    pub fn export(&self, name: &str, value: Value) {
        self.exports.borrow_mut().insert(name.to_string(), value);
    }

    /// Read back an exported value, if present.
    pub fn exported(&self, name: &str) -> Option<Value> {
        self.exports.borrow().get(name).cloned()
    }

    /// Snapshot the export table as a map value (the import namespace).
    pub fn exports_value(&self) -> Value {
        let entries: HashMap<String, Value> = self
            .exports
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Value::map(entries)
    }

    /// Fetch a cached template, if one was loaded under this name before.
    pub fn cached_template(&self, name: &str) -> Option<SharedUnit> {
        self.cache.borrow().get(name).cloned()
    }

    /// Cache a loaded template for the rest of the hierarchy.
    pub fn cache_template(&self, name: &str, unit: SharedUnit) {
        self.cache.borrow_mut().insert(name.to_string(), unit);
    }
}

#[cfg(test)]
mod tests;
