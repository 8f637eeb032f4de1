//! Stencil Runtime - execution runtime for precompiled templates.
//!
//! A template compiler (external to this crate) translates template source
//! into executable render logic: a `root` routine that emits text, a `setup`
//! routine that registers block overrides, and a block map. This crate
//! supplies everything that logic needs while running:
//!
//! - `Scope`: variable scope chain with shadowing and the undefined sentinel
//! - `RenderUnit`: a compiled template plus its configuration
//! - `RenderState`: the per-render handle compiled code is driven through
//! - `HierarchyInfo`: block-override lists, filter/test snapshots, the
//!   template cache, and the export table shared across one extends-chain
//! - `looping::iterate`: the loop helper with `loop.*` metadata and
//!   structural unpacking
//!
//! # Calling convention
//!
//! A compiled template is `RenderUnit::new(root, setup, blocks, config)`.
//! `setup` runs first and registers blocks into the active hierarchy info
//! ([`default_setup`] registers the unit's whole block map); `root` then
//! emits output through [`RenderState::write`], resolves variables with
//! [`RenderState::lookup`], and may call [`RenderState::extend`] for
//! template inheritance.
//!
//! # Re-exports
//!
//! Value types are re-exported from `stencil_value` for convenience.

pub mod error;

mod config;
mod info;
mod looping;
mod output;
mod scope;
mod shared;
mod state;
mod template;

// Re-export value types from stencil_value
pub use stencil_value::{Heap, Value};

pub use config::{Configuration, DefaultConfig, FilterFn, SharedConfig, TestFn};
pub use error::{RenderError, RenderErrorKind, RenderResult};
pub use info::{Behavior, HierarchyInfo};
pub use looping::{iterate, sequence_from_value, LoopState, UnpackShape};
pub use output::{buffer_sink, callback_sink, null_sink, SharedSink, SinkImpl};
pub use scope::{overlay, Scope, ScopeNode};
pub use shared::SharedCell;
pub use state::RenderState;
pub use template::{default_setup, BlockFn, RenderUnit, RootFn, SetupFn, SharedUnit};

#[cfg(test)]
mod tests;
