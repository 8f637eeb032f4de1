//! Compiled template wrapper.
//!
//! The external compiler hands us exactly two routines plus a block map;
//! [`RenderUnit`] couples them with the active configuration. Units are
//! immutable after construction and shared via `Rc` (the template cache
//! hands out clones of the same unit).

use rustc_hash::FxHashMap;
use std::rc::Rc;

use crate::config::SharedConfig;
use crate::error::RenderResult;
use crate::output::buffer_sink;
use crate::scope::Scope;
use crate::shared::SharedCell;
use crate::state::RenderState;
use stencil_value::Value;

/// A compiled root routine: emits text through the state's sink.
pub type RootFn = fn(&mut RenderState) -> RenderResult<()>;

/// A compiled block body, invoked through the override list.
pub type BlockFn = fn(&mut RenderState) -> RenderResult<()>;

/// A compiled setup routine.
///
/// Runs before `root` and is solely responsible for registering the unit's
/// blocks into the active hierarchy info. Receives the unit so it can reach
/// the block map; [`default_setup`] registers the whole map.
pub type SetupFn = fn(&mut RenderState, &RenderUnit) -> RenderResult<()>;

/// Shared handle to a compiled template.
pub type SharedUnit = Rc<RenderUnit>;

/// Setup routine that registers every entry of the unit's block map.
///
/// Compilers that need nothing beyond plain block registration pass this.
pub fn default_setup(state: &mut RenderState, unit: &RenderUnit) -> RenderResult<()> {
    for (name, func) in unit.blocks() {
        state.register_block(name, *func);
    }
    Ok(())
}

/// A compiled template: root and setup routines, the block map, and the
/// configuration it runs under. Immutable after construction.
pub struct RenderUnit {
    name: String,
    root: RootFn,
    setup: SetupFn,
    blocks: FxHashMap<String, BlockFn>,
    config: SharedConfig,
}

impl RenderUnit {
    /// Create an anonymous render unit.
    pub fn new(
        root: RootFn,
        setup: SetupFn,
        blocks: impl IntoIterator<Item = (impl Into<String>, BlockFn)>,
        config: SharedConfig,
    ) -> SharedUnit {
        Self::named("<string>", root, setup, blocks, config)
    }

    /// Create a render unit with a template name (used for path joining and
    /// autoescape policy).
    pub fn named(
        name: impl Into<String>,
        root: RootFn,
        setup: SetupFn,
        blocks: impl IntoIterator<Item = (impl Into<String>, BlockFn)>,
        config: SharedConfig,
    ) -> SharedUnit {
        Rc::new(RenderUnit {
            name: name.into(),
            root,
            setup,
            blocks: blocks
                .into_iter()
                .map(|(name, func)| (name.into(), func))
                .collect(),
            config,
        })
    }

    /// The template's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The block map the compiler attached to this unit.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &BlockFn)> {
        self.blocks.iter().map(|(name, func)| (name.as_str(), func))
    }

    /// The configuration this unit runs under.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Run setup (block registration) then root against an existing state.
    pub fn run(&self, state: &mut RenderState) -> RenderResult<()> {
        (self.setup)(state, self)?;
        (self.root)(state)
    }

    /// Render to a string: wraps root-scope creation, buffer collection,
    /// state construction, and `run`.
    pub fn render(
        &self,
        bindings: impl IntoIterator<Item = (String, Value)>,
    ) -> RenderResult<String> {
        let scope = SharedCell::new(Scope::from_bindings(bindings));
        let sink = buffer_sink();
        let mut state = RenderState::new(scope, sink.clone(), self.config.clone(), &self.name);
        self.run(&mut state)?;
        Ok(sink.contents())
    }
}

impl std::fmt::Debug for RenderUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderUnit")
            .field("name", &self.name)
            .field("blocks", &self.blocks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
