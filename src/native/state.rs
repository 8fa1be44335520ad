//! Engine state - per-thread records for every live node and config.
//!
//! Two thread-locals back the engine:
//! - `STATE`: node and config records, context slots, the logger callback
//! - `TREE`: the Taffy tree mirroring node structure
//!
//! They are separate so that layout callbacks, which run while `TREE` is
//! borrowed, can still read node records.

use std::cell::RefCell;
use std::collections::HashMap;

use taffy::{NodeId, TaffyTree};

use super::layout::LayoutRecord;
use super::style::NodeStyle;
use super::{BaselineCallback, LogCallback, MeasureCallback, RawConfig, RawNode};
use crate::types::ExperimentalFeatures;

// =============================================================================
// Records
// =============================================================================

/// Native config record.
#[derive(Debug, Clone)]
pub(crate) struct NativeConfig {
    pub context: u64,
    pub experimental: ExperimentalFeatures,
    pub use_web_defaults: bool,
    pub use_legacy_stretch: bool,
    pub point_scale_factor: f32,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            context: 0,
            experimental: ExperimentalFeatures::empty(),
            use_web_defaults: false,
            use_legacy_stretch: false,
            point_scale_factor: 1.0,
        }
    }
}

/// Native node record.
pub(crate) struct NativeNode {
    pub taffy_id: NodeId,
    pub config: RawConfig,
    pub context: u64,
    pub owner: RawNode,
    pub children: Vec<RawNode>,
    pub style: NodeStyle,
    pub layout: LayoutRecord,
    pub measure: Option<MeasureCallback>,
    pub baseline: Option<BaselineCallback>,
    pub is_dirty: bool,
    pub has_new_layout: bool,
    pub is_reference_baseline: bool,
    /// Bumped every time the node itself is dirtied. A layout pass compares
    /// it with the value it planned with.
    pub revision: u64,
}

impl NativeNode {
    pub fn new(taffy_id: NodeId, config: RawConfig, style: NodeStyle) -> Self {
        Self {
            taffy_id,
            config,
            context: 0,
            owner: RawNode::NULL,
            children: Vec::new(),
            style,
            layout: LayoutRecord::default(),
            measure: None,
            baseline: None,
            is_dirty: false,
            has_new_layout: true,
            is_reference_baseline: false,
            revision: 0,
        }
    }
}

// =============================================================================
// Engine State
// =============================================================================

pub(crate) struct EngineState {
    pub nodes: HashMap<RawNode, NativeNode>,
    pub configs: HashMap<RawConfig, NativeConfig>,
    pub default_config: RawConfig,
    pub logger: Option<LogCallback>,
    next_handle: u64,
}

impl EngineState {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            configs: HashMap::new(),
            default_config: RawConfig::NULL,
            logger: None,
            next_handle: 1,
        }
    }

    /// Allocate a fresh raw handle value. Never returns 0.
    pub fn allocate_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// Mark a node and its owners dirty, stopping at the first dirty ancestor.
    pub fn mark_dirty_chain(&mut self, mut raw: RawNode) {
        if let Some(node) = self.nodes.get_mut(&raw) {
            node.revision = node.revision.wrapping_add(1);
        }
        while let Some(node) = self.nodes.get_mut(&raw) {
            if node.is_dirty {
                break;
            }
            node.is_dirty = true;
            raw = node.owner;
        }
    }

    /// Config record for a node, falling back to defaults.
    pub fn config_of(&self, raw: RawNode) -> NativeConfig {
        self.nodes
            .get(&raw)
            .and_then(|node| self.configs.get(&node.config))
            .cloned()
            .unwrap_or_default()
    }
}

thread_local! {
    static STATE: RefCell<EngineState> = RefCell::new(EngineState::new());

    static TREE: RefCell<TaffyTree<RawNode>> = RefCell::new(new_tree());
}

fn new_tree() -> TaffyTree<RawNode> {
    let mut tree = TaffyTree::new();
    // Rounding follows the config's point scale factor instead.
    tree.disable_rounding();
    tree
}

// =============================================================================
// Access
// =============================================================================

/// Run `f` against the engine state.
///
/// State borrows are short and never held across callbacks.
pub(crate) fn with_state<R>(f: impl FnOnce(&mut EngineState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Like [`with_state`], but returns `None` during thread teardown or if the
/// state is already borrowed. Used on release paths, which must not fail.
pub(crate) fn try_with_state<R>(f: impl FnOnce(&mut EngineState) -> R) -> Option<R> {
    STATE
        .try_with(|state| state.try_borrow_mut().ok().map(|mut state| f(&mut state)))
        .ok()
        .flatten()
}

/// Run `f` against the Taffy tree, or `None` while a layout pass holds it.
pub(crate) fn with_tree<R>(f: impl FnOnce(&mut TaffyTree<RawNode>) -> R) -> Option<R> {
    TREE.try_with(|tree| tree.try_borrow_mut().ok().map(|mut tree| f(&mut tree)))
        .ok()
        .flatten()
}
