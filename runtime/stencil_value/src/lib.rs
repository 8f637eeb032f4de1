//! Stencil Value - runtime value model for the Stencil template runtime.
//!
//! Templates operate on dynamically typed values. This crate defines the
//! [`Value`] enum shared between the runtime and host-supplied filters,
//! including the undefined sentinel that stands in for any variable a
//! template references but never binds.
//!
//! # Heap Enforcement
//!
//! Heap-allocated values (strings, lists, maps) are wrapped in [`Heap`],
//! whose constructor is private to the value module. External code must go
//! through `Value`'s factory methods:
//!
//! ```text
//! let s = Value::string("hello");      // OK
//! let xs = Value::list(vec![]);        // OK
//! let s = Value::Str(Heap::new(...));  // ERROR: Heap::new is pub(super)
//! ```

mod value;

pub use value::{Heap, Value};
