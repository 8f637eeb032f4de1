//! Single-threaded shared mutable cell.
//!
//! Rendering is single-threaded and synchronous (one logical render owns
//! its scope chain and hierarchy tables exclusively), so sharing goes
//! through `Rc<RefCell<T>>` rather than atomics. `SharedCell` wraps that
//! pair and enforces that allocations go through its factory method.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A single-threaded shared cell for reference-counted interior mutability.
///
/// Used for scope nodes and for the hierarchy tables (template cache,
/// exports) that one extends-chain shares.
///
/// # Thread Safety
/// `SharedCell<T>` is NOT thread-safe; it uses `Rc` internally. This is
/// intentional for the runtime's cooperative-by-recursion execution model.
///
/// # Zero-Cost Abstraction
/// `#[repr(transparent)]` ensures the same memory layout as
/// `Rc<RefCell<T>>`; the wrapper adds no overhead.
#[repr(transparent)]
pub struct SharedCell<T>(Rc<RefCell<T>>);

impl<T> SharedCell<T> {
    /// Create a new `SharedCell` wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        SharedCell(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Returns `true` if both cells point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for SharedCell<T> {
    #[inline]
    fn clone(&self) -> Self {
        SharedCell(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedCell").field(&self.0).finish()
    }
}

impl<T: Default> Default for SharedCell<T> {
    fn default() -> Self {
        SharedCell::new(T::default())
    }
}
