//! Heap wrapper for enforced Arc usage.
//!
//! `Heap<T>` wraps `Arc<T>` and provides the ONLY way to allocate heap
//! values in the Value system. External code cannot call `Heap::new()`
//! directly since the constructor is `pub(super)` (visible only within the
//! value module), so all heap allocations go through `Value`'s factory
//! methods.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A heap-allocated value wrapper.
///
/// The `new` constructor is private to the value module, so external code
/// must use `Value::string()`, `Value::list()`, etc.
///
/// # Zero-Cost Abstraction
/// The `#[repr(transparent)]` attribute ensures this has the same memory
/// layout as `Arc<T>`, so there's no overhead from the wrapper.
#[repr(transparent)]
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    /// Create a new heap-allocated value.
    ///
    /// This is `pub(super)` - only visible within the value module.
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Heap<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl<T: ?Sized + Eq> Eq for Heap<T> {}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: ?Sized> AsRef<T> for Heap<T> {
    #[inline]
    fn as_ref(&self) -> &T {
        &self.0
    }
}
