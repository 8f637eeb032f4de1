//! Runtime values for the Stencil template runtime.
//!
//! A [`Value`] is what template variables hold: scalars, strings, lists,
//! string-keyed maps, and the undefined sentinel. The sentinel is the
//! central piece of the missing-value contract: any lookup that resolves to
//! nothing yields `Value::Undefined`, never an error, and the sentinel
//! renders as the empty string.

mod heap;

use std::collections::HashMap;
use std::fmt;

pub use heap::Heap;

/// A dynamically typed template value.
///
/// Heap variants (`Str`, `List`, `Map`) use [`Heap`] for enforced shared
/// allocation; construct them through the factory methods.
#[derive(Clone, Debug)]
pub enum Value {
    /// The missing-value sentinel, optionally carrying the name it was
    /// looked up under (for diagnostics only; all undefineds compare equal).
    Undefined(Option<Heap<String>>),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    Str(Heap<String>),
    /// List of values.
    List(Heap<Vec<Value>>),
    /// Map from string keys to values.
    Map(Heap<HashMap<String, Value>>),
}

impl Value {
    /// Create the anonymous undefined sentinel.
    #[inline]
    pub fn undefined() -> Self {
        Value::Undefined(None)
    }

    /// Create an undefined sentinel that remembers the name it stands in for.
    #[inline]
    pub fn undefined_named(name: impl Into<String>) -> Self {
        Value::Undefined(Some(Heap::new(name.into())))
    }

    /// Create an integer value.
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    /// Create a floating-point value.
    #[inline]
    pub fn float(n: f64) -> Self {
        Value::Float(n)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    /// Create a map value with String keys.
    #[inline]
    pub fn map(entries: HashMap<String, Value>) -> Self {
        Value::Map(Heap::new(entries))
    }

    /// Returns `true` if this is the undefined sentinel.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined(_))
    }

    /// The name this sentinel was looked up under, if it is one and it
    /// remembers it.
    pub fn origin_name(&self) -> Option<&str> {
        match self {
            Value::Undefined(Some(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Template truthiness: the sentinel, `false`, zero, and empty
    /// collections are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined(_) => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }

    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined(_) => "undefined",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow the list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the map entries, if this is a map.
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // One logical sentinel: the origin name is diagnostics only.
            (Value::Undefined(_), Value::Undefined(_)) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            #[expect(clippy::float_cmp, reason = "structural value equality")]
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Output-text formatting: this is what `write_value` emits into the
/// rendered document. The sentinel renders as the empty string so that
/// referencing an unset variable never aborts or leaks a placeholder.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined(_) => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                // Sorted for deterministic output; map key order is
                // unspecified at the HashMap level.
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {}", entries[key])?;
                }
                write!(f, "}}")
            }
        }
    }
}
