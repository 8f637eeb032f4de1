#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use std::rc::Rc;

use super::{Behavior, HierarchyInfo, DEFAULT_BLOCK_LEVEL};
use crate::config::{Configuration, DefaultConfig, FilterFn, SharedConfig, TestFn};
use crate::error::{RenderErrorKind, RenderResult};
use crate::output::buffer_sink;
use crate::scope::Scope;
use crate::shared::SharedCell;
use crate::state::RenderState;
use crate::template::{RenderUnit, SharedUnit};
use stencil_value::Value;

fn config() -> SharedConfig {
    Rc::new(DefaultConfig)
}

fn root_info() -> Rc<HierarchyInfo> {
    HierarchyInfo::new(config(), "page.html")
}

fn write_one(state: &mut RenderState) -> RenderResult<()> {
    state.write("one");
    Ok(())
}

fn write_two(state: &mut RenderState) -> RenderResult<()> {
    state.write("two");
    Ok(())
}

fn noop(_state: &mut RenderState) -> RenderResult<()> {
    Ok(())
}

fn evaluate(info: &Rc<HierarchyInfo>, name: &str, level: usize) -> RenderResult<String> {
    let sink = buffer_sink();
    let scope = SharedCell::new(Scope::new());
    info.evaluate_block(name, level, scope, &sink)?;
    Ok(sink.contents())
}

#[test]
fn registration_order_is_override_order() {
    let info = root_info();
    info.register_block("title", write_one);
    info.register_block("title", write_two);
    assert_eq!(info.override_depth("title"), 2);
    // Level 1 (default) is the first entry appended, i.e. most specific.
    assert_eq!(evaluate(&info, "title", DEFAULT_BLOCK_LEVEL).unwrap(), "one");
    assert_eq!(evaluate(&info, "title", 2).unwrap(), "two");
}

#[test]
fn unknown_block_errors() {
    let info = root_info();
    let err = evaluate(&info, "missing", 1).unwrap_err();
    assert_eq!(
        err.kind,
        RenderErrorKind::UnknownBlock {
            name: "missing".to_string()
        }
    );
}

#[test]
fn out_of_range_levels_error() {
    let info = root_info();
    info.register_block("title", write_one);
    for level in [0, 2] {
        let err = evaluate(&info, "title", level).unwrap_err();
        assert_eq!(
            err.kind,
            RenderErrorKind::BlockLevelOutOfRange {
                name: "title".to_string(),
                level,
                depth: 1,
            }
        );
    }
}

#[test]
fn extends_inherits_override_snapshot() {
    let child = root_info();
    child.register_block("title", write_one);

    let parent = child.derive(Behavior::Extends, "base.html");
    // Parent setup appends after the child's entry.
    parent.register_block("title", write_two);

    assert_eq!(evaluate(&parent, "title", 1).unwrap(), "one");
    assert_eq!(evaluate(&parent, "title", 2).unwrap(), "two");
    // The child's own info never saw the parent's registration.
    assert_eq!(child.override_depth("title"), 1);
}

#[test]
fn include_starts_with_empty_overrides() {
    let info = root_info();
    info.register_block("title", write_one);
    let included = info.derive(Behavior::Include, "snippet.html");
    assert_eq!(included.override_depth("title"), 0);
}

#[test]
fn exports_are_shared_across_extends_and_include() {
    let info = root_info();
    for behavior in [Behavior::Extends, Behavior::Include] {
        let derived = info.derive(behavior, "other.html");
        derived.export("published", Value::int(1));
    }
    assert_eq!(info.exported("published"), Some(Value::int(1)));
}

#[test]
fn import_gets_a_fresh_export_table() {
    let info = root_info();
    info.export("mine", Value::int(1));
    let imported = info.derive(Behavior::Import, "macros.html");
    assert_eq!(imported.exported("mine"), None);
    imported.export("theirs", Value::int(2));
    assert_eq!(info.exported("theirs"), None);
    assert_eq!(
        imported.exports_value(),
        Value::map(
            [("theirs".to_string(), Value::int(2))]
                .into_iter()
                .collect()
        )
    );
}

#[test]
fn template_cache_is_shared_across_derivations() {
    let info = root_info();
    let unit: SharedUnit = RenderUnit::named(
        "cached.html",
        noop,
        crate::template::default_setup,
        std::iter::empty::<(String, crate::template::BlockFn)>(),
        config(),
    );
    let derived = info.derive(Behavior::Extends, "base.html");
    derived.cache_template("cached.html", unit.clone());
    let hit = info.cached_template("cached.html").unwrap();
    assert!(Rc::ptr_eq(&hit, &unit));
    assert!(info.cached_template("other.html").is_none());
}

fn upper(value: &Value, _args: &[Value]) -> RenderResult<Value> {
    Ok(Value::string(value.to_string().to_uppercase()))
}

fn longer_than(value: &Value, args: &[Value]) -> RenderResult<bool> {
    let limit = match args.first() {
        Some(Value::Int(n)) => *n,
        _ => 0,
    };
    let len = i64::try_from(value.to_string().len()).unwrap_or(i64::MAX);
    Ok(len > limit)
}

struct TableConfig;

impl Configuration for TableConfig {
    fn filters(&self) -> FxHashMap<String, FilterFn> {
        let mut filters = FxHashMap::default();
        filters.insert("upper".to_string(), upper as FilterFn);
        filters
    }

    fn tests(&self) -> FxHashMap<String, TestFn> {
        let mut tests = FxHashMap::default();
        tests.insert("longer_than".to_string(), longer_than as TestFn);
        tests
    }
}

#[test]
fn call_filter_applies_snapshot_entry() {
    let info = HierarchyInfo::new(Rc::new(TableConfig), "page.html");
    let out = info
        .call_filter("upper", &Value::string("hi"), &[])
        .unwrap();
    assert_eq!(out, Value::string("HI"));
}

#[test]
fn unknown_filter_is_fatal() {
    let info = root_info();
    let err = info
        .call_filter("upper", &Value::string("hi"), &[])
        .unwrap_err();
    assert_eq!(
        err.kind,
        RenderErrorKind::UnknownFilter {
            name: "upper".to_string()
        }
    );
}

#[test]
fn call_test_applies_snapshot_entry() {
    let info = HierarchyInfo::new(Rc::new(TableConfig), "page.html");
    assert!(info
        .call_test("longer_than", &Value::string("hello"), &[Value::int(3)])
        .unwrap());
    assert!(!info
        .call_test("longer_than", &Value::string("hi"), &[Value::int(3)])
        .unwrap());
}

#[test]
fn unknown_test_is_fatal() {
    let info = root_info();
    let err = info.call_test("odd", &Value::int(1), &[]).unwrap_err();
    assert_eq!(
        err.kind,
        RenderErrorKind::UnknownTest {
            name: "odd".to_string()
        }
    );
}
