#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use std::cell::Cell;
use std::rc::Rc;

use crate::config::{Configuration, DefaultConfig, FilterFn, SharedConfig};
use crate::error::{missing_template, RenderResult};
use crate::looping::{iterate, UnpackShape};
use crate::output::{callback_sink, SharedSink};
use crate::scope::Scope;
use crate::shared::SharedCell;
use crate::state::RenderState;
use crate::template::{default_setup, BlockFn, RenderUnit, SharedUnit};
use crate::{HierarchyInfo, ScopeNode};
use parking_lot::Mutex;
use std::sync::Arc;
use stencil_value::Value;

fn no_blocks() -> impl Iterator<Item = (String, BlockFn)> {
    std::iter::empty()
}

fn hello_root(state: &mut RenderState) -> RenderResult<()> {
    state.write("Hello, ");
    let name = state.lookup("name");
    state.write_value(&name);
    state.write("!");
    Ok(())
}

#[test]
fn render_collects_output_into_a_string() {
    let unit = RenderUnit::new(hello_root, default_setup, no_blocks(), Rc::new(DefaultConfig));
    let out = unit
        .render([("name".to_string(), Value::string("world"))])
        .unwrap();
    assert_eq!(out, "Hello, world!");
}

#[test]
fn rendering_with_empty_bindings_never_fails() {
    // Unresolved references render as the sentinel's empty text.
    let unit = RenderUnit::new(hello_root, default_setup, no_blocks(), Rc::new(DefaultConfig));
    assert_eq!(unit.render([]).unwrap(), "Hello, !");
}

fn loop_root(state: &mut RenderState) -> RenderResult<()> {
    let items = state.lookup("items");
    iterate(&items, &UnpackShape::name("item"), |loop_state, bindings| {
        state.scoped(bindings.to_vec(), |state| {
            if !loop_state.first {
                state.write(", ");
            }
            let item = state.lookup("item");
            state.write_value(&item);
            Ok(())
        })
    })
}

#[test]
fn loop_driven_template_renders_in_order() {
    let unit = RenderUnit::new(loop_root, default_setup, no_blocks(), Rc::new(DefaultConfig));
    let items = Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]);
    let out = unit.render([("items".to_string(), items)]).unwrap();
    assert_eq!(out, "1, 2, 3");
}

#[test]
fn loop_over_unset_variable_renders_nothing() {
    let unit = RenderUnit::new(loop_root, default_setup, no_blocks(), Rc::new(DefaultConfig));
    assert_eq!(unit.render([]).unwrap(), "");
}

fn upper(value: &Value, _args: &[Value]) -> RenderResult<Value> {
    Ok(Value::string(value.to_string().to_uppercase()))
}

struct FilteredConfig;

impl Configuration for FilteredConfig {
    fn filters(&self) -> FxHashMap<String, FilterFn> {
        let mut filters = FxHashMap::default();
        filters.insert("upper".to_string(), upper as FilterFn);
        filters
    }
}

fn filtered_root(state: &mut RenderState) -> RenderResult<()> {
    let name = state.lookup("name");
    let shouted = state.call_filter("upper", &name, &[])?;
    state.write_value(&shouted);
    Ok(())
}

#[test]
fn filters_apply_through_the_snapshot_table() {
    let unit = RenderUnit::new(
        filtered_root,
        default_setup,
        no_blocks(),
        Rc::new(FilteredConfig),
    );
    let out = unit
        .render([("name".to_string(), Value::string("ada"))])
        .unwrap();
    assert_eq!(out, "ADA");
}

#[test]
fn unknown_filter_aborts_the_render() {
    let unit = RenderUnit::new(
        filtered_root,
        default_setup,
        no_blocks(),
        Rc::new(DefaultConfig),
    );
    let err = unit
        .render([("name".to_string(), Value::string("ada"))])
        .unwrap_err();
    assert_eq!(err.to_string(), "no filter named 'upper'");
}

#[test]
fn callback_sink_streams_chunks_in_document_order() {
    let chunks = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&chunks);
    let sink = callback_sink(move |chunk| seen.lock().push(chunk.to_string()));

    let unit = RenderUnit::new(hello_root, default_setup, no_blocks(), Rc::new(DefaultConfig));
    let scope = SharedCell::new(Scope::from_bindings([(
        "name".to_string(),
        Value::string("stream"),
    )]));
    let mut state = RenderState::new(scope, sink, unit.config().clone(), unit.name());
    unit.run(&mut state).unwrap();

    assert_eq!(
        *chunks.lock(),
        vec!["Hello, ".to_string(), "stream".to_string(), "!".to_string()]
    );
}

// Import: the imported template's output is discarded, its exports become
// the module namespace.

fn macros_root(state: &mut RenderState) -> RenderResult<()> {
    state.write("this never reaches the document");
    state.export("version", Value::string("1.2"));
    Ok(())
}

fn importer_root(state: &mut RenderState) -> RenderResult<()> {
    let module = state.import_template("macros.html")?;
    state.write("v=");
    let version = state.get_attr(&module, "version");
    state.write_value(&version);
    Ok(())
}

struct MacroLoader;

impl Configuration for MacroLoader {
    fn load_template(&self, name: &str) -> RenderResult<SharedUnit> {
        if name == "macros.html" {
            Ok(RenderUnit::named(
                "macros.html",
                macros_root,
                default_setup,
                no_blocks(),
                Rc::new(DefaultConfig),
            ))
        } else {
            Err(missing_template(name))
        }
    }
}

#[test]
fn import_builds_a_module_from_exports() {
    let unit = RenderUnit::new(
        importer_root,
        default_setup,
        no_blocks(),
        Rc::new(MacroLoader),
    );
    assert_eq!(unit.render([]).unwrap(), "v=1.2");
}

// The evaluate_template hook intercepts every hierarchy evaluation.

struct CountingConfig {
    evaluations: Cell<usize>,
}

impl Configuration for CountingConfig {
    fn load_template(&self, name: &str) -> RenderResult<SharedUnit> {
        if name == "snippet.html" {
            Ok(RenderUnit::named(
                "snippet.html",
                hello_root,
                default_setup,
                no_blocks(),
                Rc::new(DefaultConfig),
            ))
        } else {
            Err(missing_template(name))
        }
    }

    fn evaluate_template(
        &self,
        unit: &RenderUnit,
        scope: ScopeNode,
        sink: SharedSink,
        info: Rc<HierarchyInfo>,
    ) -> RenderResult<()> {
        self.evaluations.set(self.evaluations.get() + 1);
        let mut state = RenderState::from_info(scope, sink, info);
        unit.run(&mut state)
    }
}

fn including_root(state: &mut RenderState) -> RenderResult<()> {
    state.include("snippet.html", false)?;
    state.include("snippet.html", false)
}

#[test]
fn evaluate_template_hook_sees_every_hop() {
    let config = Rc::new(CountingConfig {
        evaluations: Cell::new(0),
    });
    let shared: SharedConfig = config.clone();
    let unit = RenderUnit::new(including_root, default_setup, no_blocks(), shared);
    let out = unit.render([]).unwrap();
    assert_eq!(out, "Hello, !Hello, !");
    assert_eq!(config.evaluations.get(), 2);
}
