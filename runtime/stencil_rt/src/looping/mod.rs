//! Loop iteration helper.
//!
//! Turns any enumerable value into an indexed sequence and drives a
//! callback over it with standard `loop.*` metadata. Normalization happens
//! once up front - the helper is not restartable and not lazy; the source
//! is fully materialized before the first callback runs.
//!
//! The metadata record is rebuilt per step, so a callback that keeps a copy
//! sees that step's values rather than the final iteration's.

use crate::error::{not_iterable, shape_arity_mismatch, shape_not_unpackable, RenderResult};
use stencil_value::Value;

/// Loop metadata for one iteration step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopState {
    /// 0-based position.
    pub index0: usize,
    /// 1-based position.
    pub index: usize,
    /// Steps remaining including this one.
    pub revindex: usize,
    /// Steps remaining after this one.
    pub revindex0: usize,
    /// True only on the first step.
    pub first: bool,
    /// True only on the last step.
    pub last: bool,
}

impl LoopState {
    fn at(i: usize, n: usize) -> Self {
        LoopState {
            index0: i,
            index: i + 1,
            revindex: n - i,
            revindex0: n - i - 1,
            first: i == 0,
            last: i + 1 == n,
        }
    }

    /// Cycle among `values` with the current index: `values[index0 % len]`.
    ///
    /// An empty slice yields the sentinel rather than erroring - a metadata
    /// accessor should not abort a render.
    pub fn cycle(&self, values: &[Value]) -> Value {
        if values.is_empty() {
            return Value::undefined();
        }
        values[self.index0 % values.len()].clone()
    }
}

/// How each element is bound per iteration.
#[derive(Clone, Debug)]
pub enum UnpackShape {
    /// A single simple name: the element is delivered directly.
    Name(String),
    /// Structural binding: the element is destructured positionally, with
    /// nesting.
    Tuple(Vec<UnpackShape>),
}

impl UnpackShape {
    /// A single simple name.
    pub fn name(name: impl Into<String>) -> Self {
        UnpackShape::Name(name.into())
    }

    /// A positional tuple of sub-shapes.
    pub fn tuple(shapes: Vec<UnpackShape>) -> Self {
        UnpackShape::Tuple(shapes)
    }
}

/// Normalize a source value into an indexed sequence.
///
/// Lists are used directly; strings iterate per character; maps iterate
/// their keys (sorted, for deterministic output); the sentinel iterates as
/// empty so an unset variable renders an empty loop instead of aborting.
/// Scalars are `NotIterable`.
pub fn sequence_from_value(source: &Value) -> RenderResult<Vec<Value>> {
    match source {
        Value::List(items) => Ok(items.to_vec()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::string(String::from(c))).collect()),
        Value::Map(entries) => {
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort();
            Ok(keys
                .into_iter()
                .map(|key| Value::string(key.clone()))
                .collect())
        }
        Value::Undefined(_) => Ok(Vec::new()),
        other => Err(not_iterable(other.type_name())),
    }
}

/// Destructure `value` against `shape`, appending `(name, value)` leaves in
/// shape order.
fn bind(shape: &UnpackShape, value: Value, out: &mut Vec<(String, Value)>) -> RenderResult<()> {
    match shape {
        UnpackShape::Name(name) => {
            out.push((name.clone(), value));
            Ok(())
        }
        UnpackShape::Tuple(shapes) => {
            let Some(items) = value.as_list() else {
                return Err(shape_not_unpackable(shapes.len(), value.type_name()));
            };
            if items.len() != shapes.len() {
                return Err(shape_arity_mismatch(shapes.len(), items.len()));
            }
            let items = items.to_vec();
            for (sub, item) in shapes.iter().zip(items) {
                bind(sub, item, out)?;
            }
            Ok(())
        }
    }
}

/// Iterate `source`, invoking `callback` per element with that step's loop
/// metadata and the element's bindings.
///
/// A simple-name shape binds the element directly; a tuple shape
/// destructures it strictly (`ShapeMismatch` on a non-list element or an
/// arity mismatch). An empty source returns `Ok(())` without invoking the
/// callback.
pub fn iterate<F>(source: &Value, shape: &UnpackShape, mut callback: F) -> RenderResult<()>
where
    F: FnMut(&LoopState, &[(String, Value)]) -> RenderResult<()>,
{
    let seq = sequence_from_value(source)?;
    let n = seq.len();
    for (i, item) in seq.into_iter().enumerate() {
        let loop_state = LoopState::at(i, n);
        let mut bindings = Vec::new();
        bind(shape, item, &mut bindings)?;
        callback(&loop_state, &bindings)?;
    }
    Ok(())
}
