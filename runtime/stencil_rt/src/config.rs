//! Configuration capability set.
//!
//! The host supplies one [`Configuration`] per template environment. It is
//! the only extension point a host is expected to implement: autoescape
//! default, filter and test tables, template loading and path joining, and
//! the template evaluation hook (overridable for interception or
//! instrumentation). Every hook has a default; the default loader always
//! fails, so loading must be supplied by the collaborator before `extends`,
//! `include`, or `import` can work.

use rustc_hash::FxHashMap;
use std::rc::Rc;

use crate::error::{missing_template, RenderResult};
use crate::info::HierarchyInfo;
use crate::output::SharedSink;
use crate::scope::ScopeNode;
use crate::state::RenderState;
use crate::template::{RenderUnit, SharedUnit};
use stencil_value::Value;

/// A filter: applied to a receiver value with forwarded arguments.
pub type FilterFn = fn(&Value, &[Value]) -> RenderResult<Value>;

/// A test: a boolean predicate over a receiver value with arguments.
pub type TestFn = fn(&Value, &[Value]) -> RenderResult<bool>;

/// Shared configuration handle.
pub type SharedConfig = Rc<dyn Configuration>;

/// Pluggable per-environment policy hooks.
pub trait Configuration {
    /// Whether autoescaping is on by default for the named template.
    fn autoescape_default(&self, _template_name: &str) -> bool {
        false
    }

    /// The filter table. Snapshotted into each hierarchy info at creation.
    fn filters(&self) -> FxHashMap<String, FilterFn> {
        FxHashMap::default()
    }

    /// The test table. Snapshotted like the filter table.
    fn tests(&self) -> FxHashMap<String, TestFn> {
        FxHashMap::default()
    }

    /// Load a compiled template by (already joined) name.
    ///
    /// The default policy always fails with `MissingTemplate`.
    fn load_template(&self, name: &str) -> RenderResult<SharedUnit> {
        Err(missing_template(name))
    }

    /// Resolve a possibly-relative template name against the requesting
    /// template's name. The default keeps the name as-is.
    fn join_path(&self, name: &str, _parent_name: &str) -> String {
        name.to_string()
    }

    /// Evaluate a render unit against the given scope, sink, and hierarchy
    /// info.
    ///
    /// Level-preserving evaluations (extend hops, includes, imports) go
    /// through this hook, so overriding it intercepts every template
    /// evaluation in the hierarchy.
    fn evaluate_template(
        &self,
        unit: &RenderUnit,
        scope: ScopeNode,
        sink: SharedSink,
        info: Rc<HierarchyInfo>,
    ) -> RenderResult<()> {
        let mut state = RenderState::from_info(scope, sink, info);
        unit.run(&mut state)
    }

    /// Attribute access (`value.attr`), degrading to the sentinel.
    fn get_attr(&self, value: &Value, attr: &str) -> Value {
        match value.as_map() {
            Some(entries) => entries
                .get(attr)
                .cloned()
                .unwrap_or_else(|| Value::undefined_named(attr)),
            None => Value::undefined_named(attr),
        }
    }

    /// Subscript access (`value[key]`), degrading to the sentinel.
    ///
    /// Lists accept integer keys (negative counts from the end); string
    /// keys fall back to attribute access.
    fn get_item(&self, value: &Value, key: &Value) -> Value {
        match (value, key) {
            (Value::List(items), Value::Int(i)) => {
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                let idx = if *i < 0 { *i + len } else { *i };
                usize::try_from(idx)
                    .ok()
                    .and_then(|idx| items.get(idx).cloned())
                    .unwrap_or_else(Value::undefined)
            }
            (receiver, Value::Str(k)) => self.get_attr(receiver, k),
            _ => Value::undefined(),
        }
    }
}

/// Configuration with every hook at its default.
#[derive(Default)]
pub struct DefaultConfig;

impl Configuration for DefaultConfig {}
