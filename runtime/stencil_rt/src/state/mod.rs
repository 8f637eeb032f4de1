//! Per-render execution state.
//!
//! A `RenderState` is the handle compiled render logic is driven through:
//! it bundles the active scope node, the output sink, the configuration,
//! and the hierarchy info shared across the current extends-chain. One is
//! created fresh per render entry point (root render, extend hop, block
//! invocation); overlay scopes are pushed and popped as nested constructs
//! run.

use std::rc::Rc;

use crate::config::SharedConfig;
use crate::error::RenderResult;
use crate::info::{Behavior, HierarchyInfo, DEFAULT_BLOCK_LEVEL};
use crate::output::{null_sink, SharedSink};
use crate::scope::{overlay, Scope, ScopeNode};
use crate::shared::SharedCell;
use crate::template::{BlockFn, SharedUnit};
use stencil_value::Value;

/// Execution state for one template evaluation.
pub struct RenderState {
    scope: ScopeNode,
    config: SharedConfig,
    sink: SharedSink,
    info: Rc<HierarchyInfo>,
}

impl RenderState {
    /// Create the state for a fresh template evaluation, building a new
    /// hierarchy info.
    pub fn new(
        scope: ScopeNode,
        sink: SharedSink,
        config: SharedConfig,
        template_name: &str,
    ) -> Self {
        let info = HierarchyInfo::new(config.clone(), template_name);
        RenderState {
            scope,
            config,
            sink,
            info,
        }
    }

    /// Create a state that joins an existing hierarchy (extend hops, block
    /// bodies, includes).
    pub fn from_info(scope: ScopeNode, sink: SharedSink, info: Rc<HierarchyInfo>) -> Self {
        let config = info.config().clone();
        RenderState {
            scope,
            config,
            sink,
            info,
        }
    }

    /// The hierarchy info shared across this extends-chain.
    pub fn info(&self) -> &Rc<HierarchyInfo> {
        &self.info
    }

    /// The current scope node.
    pub fn scope(&self) -> &ScopeNode {
        &self.scope
    }

    /// Autoescape default for the template being evaluated.
    pub fn autoescape(&self) -> bool {
        self.info.autoescape
    }

    // Variables

    /// Resolve a variable through the scope chain; yields the sentinel if
    /// it is bound nowhere.
    pub fn lookup(&self, name: &str) -> Value {
        self.scope.borrow().lookup(name)
    }

    /// Bind a variable in the current scope.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.scope.borrow_mut().define(name, value);
    }

    /// Record a value this template publishes for inclusion/import use.
    pub fn export(&self, name: &str, value: Value) {
        self.info.export(name, value);
    }

    /// Attribute access, degrading to the sentinel.
    pub fn get_attr(&self, value: &Value, attr: &str) -> Value {
        self.config.get_attr(value, attr)
    }

    /// Subscript access, degrading to the sentinel.
    pub fn get_item(&self, value: &Value, key: &Value) -> Value {
        self.config.get_item(value, key)
    }

    // Output

    /// Emit one chunk of rendered text.
    pub fn write(&self, chunk: &str) {
        self.sink.write(chunk);
    }

    /// Emit a value as output text (the sentinel emits nothing).
    pub fn write_value(&self, value: &Value) {
        if !value.is_undefined() {
            self.sink.write(&value.to_string());
        }
    }

    // Scopes

    /// Create an overlay scope (child of the current scope) without
    /// switching to it.
    pub fn overlay(&self, bindings: impl IntoIterator<Item = (String, Value)>) -> ScopeNode {
        overlay(&self.scope, bindings)
    }

    /// Enter an overlay scope with the given bindings.
    pub fn push_overlay(&mut self, bindings: impl IntoIterator<Item = (String, Value)>) {
        self.scope = overlay(&self.scope, bindings);
    }

    /// Leave the current overlay scope. No-op at the root scope.
    pub fn pop_overlay(&mut self) {
        let parent = self.scope.borrow().parent();
        if let Some(parent) = parent {
            self.scope = parent;
        }
    }

    /// Run `body` inside an overlay scope, restoring the previous scope
    /// afterwards even when the body fails.
    pub fn scoped<F>(
        &mut self,
        bindings: impl IntoIterator<Item = (String, Value)>,
        body: F,
    ) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        let saved = self.scope.clone();
        self.scope = overlay(&saved, bindings);
        let result = body(self);
        self.scope = saved;
        result
    }

    // Blocks

    /// Register a block body under `name` (setup phase).
    pub fn register_block(&self, name: &str, func: BlockFn) {
        self.info.register_block(name, func);
    }

    /// Evaluate the most specific override of block `name` against an
    /// overlay of the current scope.
    pub fn evaluate_block(&self, name: &str) -> RenderResult<()> {
        self.evaluate_block_at(name, DEFAULT_BLOCK_LEVEL)
    }

    /// Evaluate block `name` at an explicit level (1 = most specific).
    ///
    /// A block body delegating to the next less-specific override calls
    /// this with its own level plus one.
    pub fn evaluate_block_at(&self, name: &str, level: usize) -> RenderResult<()> {
        let scope = self.overlay([]);
        self.info.evaluate_block(name, level, scope, &self.sink)
    }

    // Filters and tests

    /// Apply a filter from the hierarchy's snapshot table.
    pub fn call_filter(&self, name: &str, value: &Value, args: &[Value]) -> RenderResult<Value> {
        self.info.call_filter(name, value, args)
    }

    /// Apply a test from the hierarchy's snapshot table.
    pub fn call_test(&self, name: &str, value: &Value, args: &[Value]) -> RenderResult<bool> {
        self.info.call_test(name, value, args)
    }

    // Template loading, inheritance, inclusion

    /// Load a template by name, consulting the hierarchy-wide cache.
    ///
    /// The name is joined against the current template's name first.
    pub fn get_template(&self, name: &str) -> RenderResult<SharedUnit> {
        let full_name = self.config.join_path(name, self.info.template_name());
        if let Some(unit) = self.info.cached_template(&full_name) {
            return Ok(unit);
        }
        tracing::debug!(template = %full_name, "loading template");
        let unit = self.config.load_template(&full_name)?;
        self.info.cache_template(&full_name, unit.clone());
        Ok(unit)
    }

    /// Extend the named parent template.
    ///
    /// The parent evaluates against a derived hierarchy info that inherits
    /// this template's override map, so blocks registered here win at the
    /// default level. The caller's root routine should emit nothing after
    /// a successful extend.
    pub fn extend(&self, name: &str) -> RenderResult<()> {
        let unit = self.get_template(name)?;
        tracing::debug!(parent = name, child = %self.info.template_name(), "extending");
        let info = self.info.derive(Behavior::Extends, name);
        self.config
            .evaluate_template(&unit, self.scope.clone(), self.sink.clone(), info)
    }

    /// Include the named template at this point in the output.
    ///
    /// The included template sees the current scope and shares the export
    /// table, but starts with an empty override map. With `ignore_missing`,
    /// an unresolvable name renders nothing instead of failing.
    pub fn include(&self, name: &str, ignore_missing: bool) -> RenderResult<()> {
        let unit = match self.get_template(name) {
            Ok(unit) => unit,
            Err(err) if ignore_missing && err.is_missing_template() => return Ok(()),
            Err(err) => return Err(err),
        };
        tracing::debug!(template = name, "including");
        let info = self.info.derive(Behavior::Include, name);
        self.config
            .evaluate_template(&unit, self.scope.clone(), self.sink.clone(), info)
    }

    /// Import the named template as a module namespace.
    ///
    /// The template is evaluated against a null sink (its output is
    /// discarded); the values it exports become the entries of the returned
    /// map.
    pub fn import_template(&self, name: &str) -> RenderResult<Value> {
        let unit = self.get_template(name)?;
        tracing::debug!(template = name, "importing");
        let info = self.info.derive(Behavior::Import, name);
        let module_scope = SharedCell::new(Scope::new());
        self.config
            .evaluate_template(&unit, module_scope, null_sink(), Rc::clone(&info))?;
        Ok(info.exports_value())
    }
}
