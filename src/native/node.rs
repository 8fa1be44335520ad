//! Node entry points: lifecycle, context slot, tree structure, style,
//! dirtiness and callback registration.
//!
//! Validation failures are reported the way the engine reports everything:
//! a `Fatal` message through the logger, which aborts the operation before
//! any state changes.

use super::config::config_get_default;
use super::diagnostics::{self, Diagnostic};
use super::layout::LayoutRecord;
use super::print;
use super::state::{try_with_state, with_state, with_tree, NativeNode};
use super::style::{build_style, NodeStyle};
use super::{BaselineCallback, MeasureCallback, RawConfig, RawNode};
use crate::error::{Error, Result};
use crate::types::{Direction, LogLevel, PrintOptions};

const BUSY: &str = "Cannot modify the tree while layout is running";

// =============================================================================
// Lifecycle
// =============================================================================

/// Create a node bound to the default config.
pub fn node_new() -> RawNode {
    node_new_with_config(config_get_default())
}

/// Create a node bound to `config`. Returns [`RawNode::NULL`] if the config
/// is unknown or the tree is unavailable.
pub fn node_new_with_config(config: RawConfig) -> RawNode {
    let Some(web_defaults) =
        with_state(|state| state.configs.get(&config).map(|c| c.use_web_defaults))
    else {
        return RawNode::NULL;
    };

    let style = NodeStyle::for_config(web_defaults);
    let Some(Ok(taffy_id)) =
        with_tree(|tree| tree.new_leaf(build_style(&style, Direction::Ltr)))
    else {
        return RawNode::NULL;
    };

    let raw = with_state(|state| {
        let raw = RawNode(state.allocate_handle());
        state.nodes.insert(raw, NativeNode::new(taffy_id, config, style));
        raw
    });
    log::trace!(target: "arrange", "node {} allocated", raw.0);
    raw
}

/// Free a node. It is detached from its owner and its children are orphaned.
///
/// Never fails; during thread teardown it does what it still can.
pub fn node_free(raw: RawNode) {
    let Some(Some(record)) = try_with_state(|state| {
        let record = state.nodes.remove(&raw)?;
        if let Some(owner) = state.nodes.get_mut(&record.owner) {
            owner.children.retain(|&child| child != raw);
        }
        state.mark_dirty_chain(record.owner);
        for child in &record.children {
            if let Some(child) = state.nodes.get_mut(child) {
                child.owner = RawNode::NULL;
            }
        }
        Some(record)
    }) else {
        return;
    };

    if with_tree(|tree| tree.remove(record.taffy_id)).is_none() {
        log::warn!(target: "arrange", "node {} freed while the layout tree was unavailable", raw.0);
    }
    log::trace!(target: "arrange", "node {} freed", raw.0);
}

/// Reset a detached, childless node to the defaults of its config.
///
/// Clears the measure and baseline callbacks and the context slot.
pub fn node_reset(raw: RawNode) -> Result<()> {
    let check = with_state(|state| {
        state
            .nodes
            .get(&raw)
            .map(|node| (node.children.is_empty(), node.owner.is_null(), node.taffy_id))
    });
    let taffy_id = match check {
        None => return Ok(()),
        Some((false, _, _)) => {
            return diagnostics::fatal(raw, "Cannot reset a node which still has children attached");
        }
        Some((_, false, _)) => {
            return diagnostics::fatal(raw, "Cannot reset a node still attached to a owner");
        }
        Some((true, true, taffy_id)) => taffy_id,
    };

    let web_defaults = with_state(|state| state.config_of(raw).use_web_defaults);
    let style = NodeStyle::for_config(web_defaults);
    let synced = with_tree(|tree| {
        tree.set_node_context(taffy_id, None)?;
        tree.set_style(taffy_id, build_style(&style, Direction::Ltr))
    });
    match synced {
        None => return diagnostics::fatal(raw, BUSY),
        Some(Err(error)) => return report(raw, error),
        Some(Ok(())) => {}
    }

    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&raw) {
            let config = node.config;
            *node = NativeNode::new(taffy_id, config, style);
        }
    });
    Ok(())
}

/// Copy `src`'s style onto `dst` and mark `dst` dirty.
pub fn node_copy_style(dst: RawNode, src: RawNode) {
    with_state(|state| {
        let Some(style) = state.nodes.get(&src).map(|node| node.style) else {
            return;
        };
        if let Some(node) = state.nodes.get_mut(&dst) {
            node.style = style;
            state.mark_dirty_chain(dst);
        }
    });
}

/// Number of live nodes on this thread's engine.
pub fn node_instance_count() -> usize {
    with_state(|state| state.nodes.len())
}

/// Config a node was created with.
pub fn node_config(raw: RawNode) -> RawConfig {
    with_state(|state| state.nodes.get(&raw).map(|node| node.config).unwrap_or_default())
}

// =============================================================================
// Context Slot
// =============================================================================

pub fn node_set_context(raw: RawNode, context: u64) {
    try_with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&raw) {
            node.context = context;
        }
    });
}

pub fn node_get_context(raw: RawNode) -> u64 {
    try_with_state(|state| state.nodes.get(&raw).map(|node| node.context))
        .flatten()
        .unwrap_or(0)
}

// =============================================================================
// Tree Structure
// =============================================================================

/// Insert `child` into `parent` at `index`.
///
/// All checks run before anything changes, so a rejected insert leaves both
/// nodes untouched.
pub fn node_insert_child(parent: RawNode, child: RawNode, index: usize) -> Result<()> {
    enum Check {
        Valid(taffy::NodeId, taffy::NodeId),
        Missing,
        Rejected(&'static str),
        OutOfRange(usize),
    }

    let check = with_state(|state| {
        let (Some(parent_node), Some(child_node)) =
            (state.nodes.get(&parent), state.nodes.get(&child))
        else {
            return Check::Missing;
        };
        if !child_node.owner.is_null() {
            return Check::Rejected("Child already has a owner, it must be removed first.");
        }
        if parent_node.measure.is_some() {
            return Check::Rejected(
                "Cannot add child: Nodes with measure functions cannot have children.",
            );
        }
        if index > parent_node.children.len() {
            return Check::OutOfRange(parent_node.children.len());
        }

        // Inserting an ancestor would close a cycle
        let mut ancestor = parent;
        while !ancestor.is_null() {
            if ancestor == child {
                return Check::Rejected(
                    "Cannot add a node as a child of itself or its descendants.",
                );
            }
            ancestor = state.nodes.get(&ancestor).map(|node| node.owner).unwrap_or_default();
        }

        Check::Valid(parent_node.taffy_id, child_node.taffy_id)
    });

    let (parent_id, child_id) = match check {
        Check::Valid(parent_id, child_id) => (parent_id, child_id),
        Check::Missing => return Ok(()),
        Check::Rejected(message) => return diagnostics::fatal(parent, message),
        Check::OutOfRange(count) => return Err(Error::IndexOutOfRange { index, count }),
    };

    match with_tree(|tree| tree.insert_child_at_index(parent_id, index, child_id)) {
        None => return diagnostics::fatal(parent, BUSY),
        Some(Err(error)) => return report(parent, error),
        Some(Ok(())) => {}
    }

    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&parent) {
            node.children.insert(index, child);
        }
        if let Some(node) = state.nodes.get_mut(&child) {
            node.owner = parent;
        }
        state.mark_dirty_chain(parent);
    });
    Ok(())
}

/// Remove `child` from `parent`. Does nothing if `child` is not a child of
/// `parent`.
pub fn node_remove_child(parent: RawNode, child: RawNode) -> Result<()> {
    let ids = with_state(|state| {
        let child_node = state.nodes.get(&child)?;
        if child_node.owner != parent {
            return None;
        }
        Some((state.nodes.get(&parent)?.taffy_id, child_node.taffy_id))
    });
    let Some((parent_id, child_id)) = ids else {
        return Ok(());
    };

    match with_tree(|tree| tree.remove_child(parent_id, child_id)) {
        None => return diagnostics::fatal(parent, BUSY),
        Some(Err(error)) => return report(parent, error),
        Some(Ok(_)) => {}
    }

    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = state.nodes.get_mut(&child) {
            node.owner = RawNode::NULL;
            node.layout = LayoutRecord::default();
        }
        state.mark_dirty_chain(parent);
    });
    Ok(())
}

pub fn node_child_count(raw: RawNode) -> usize {
    with_state(|state| state.nodes.get(&raw).map_or(0, |node| node.children.len()))
}

/// Child at `index`, or [`RawNode::NULL`] when out of range.
pub fn node_child_at(raw: RawNode, index: usize) -> RawNode {
    with_state(|state| {
        state
            .nodes
            .get(&raw)
            .and_then(|node| node.children.get(index).copied())
            .unwrap_or_default()
    })
}

pub fn node_owner(raw: RawNode) -> RawNode {
    with_state(|state| state.nodes.get(&raw).map(|node| node.owner).unwrap_or_default())
}

// =============================================================================
// Style
// =============================================================================

/// Copy of a node's style.
pub fn node_style(raw: RawNode) -> Option<NodeStyle> {
    with_state(|state| state.nodes.get(&raw).map(|node| node.style))
}

/// Mutate a node's style and mark it dirty.
pub fn node_update_style(raw: RawNode, f: impl FnOnce(&mut NodeStyle)) {
    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&raw) {
            f(&mut node.style);
            state.mark_dirty_chain(raw);
        }
    });
}

pub fn node_set_is_reference_baseline(raw: RawNode, value: bool) {
    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&raw) {
            if node.is_reference_baseline != value {
                node.is_reference_baseline = value;
                state.mark_dirty_chain(raw);
            }
        }
    });
}

pub fn node_is_reference_baseline(raw: RawNode) -> bool {
    with_state(|state| state.nodes.get(&raw).is_some_and(|node| node.is_reference_baseline))
}

// =============================================================================
// Layout & Dirtiness
// =============================================================================

/// Most recent computed layout of a node.
pub fn node_layout(raw: RawNode) -> LayoutRecord {
    with_state(|state| state.nodes.get(&raw).map(|node| node.layout).unwrap_or_default())
}

/// Mark a measured leaf dirty so its measure callback runs again.
pub fn node_mark_dirty(raw: RawNode) -> Result<()> {
    let Some((taffy_id, measured)) = with_state(|state| {
        state.nodes.get(&raw).map(|node| (node.taffy_id, node.measure.is_some()))
    }) else {
        return Ok(());
    };
    if !measured {
        return diagnostics::fatal(
            raw,
            "Only leaf nodes with custom measure functions should manually mark themselves as dirty",
        );
    }

    match with_tree(|tree| tree.mark_dirty(taffy_id)) {
        None => return diagnostics::fatal(raw, BUSY),
        Some(Err(error)) => return report(raw, error),
        Some(Ok(())) => {}
    }
    with_state(|state| state.mark_dirty_chain(raw));
    Ok(())
}

pub fn node_is_dirty(raw: RawNode) -> bool {
    with_state(|state| state.nodes.get(&raw).is_some_and(|node| node.is_dirty))
}

pub fn node_has_new_layout(raw: RawNode) -> bool {
    with_state(|state| state.nodes.get(&raw).is_some_and(|node| node.has_new_layout))
}

pub fn node_set_has_new_layout(raw: RawNode, value: bool) {
    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&raw) {
            node.has_new_layout = value;
        }
    });
}

// =============================================================================
// Callbacks
// =============================================================================

/// Install or clear a node's measure callback.
pub fn node_set_measure_func(raw: RawNode, measure: Option<MeasureCallback>) -> Result<()> {
    let Some((taffy_id, has_children)) = with_state(|state| {
        state.nodes.get(&raw).map(|node| (node.taffy_id, !node.children.is_empty()))
    }) else {
        return Ok(());
    };
    if measure.is_some() && has_children {
        return diagnostics::fatal(
            raw,
            "Cannot set measure function: Nodes with measure functions cannot have children.",
        );
    }

    // Only measured nodes carry a Taffy context
    match with_tree(|tree| tree.set_node_context(taffy_id, measure.map(|_| raw))) {
        None => return diagnostics::fatal(raw, BUSY),
        Some(Err(error)) => return report(raw, error),
        Some(Ok(())) => {}
    }

    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&raw) {
            node.measure = measure;
            state.mark_dirty_chain(raw);
        }
    });
    Ok(())
}

pub fn node_has_measure_func(raw: RawNode) -> bool {
    with_state(|state| state.nodes.get(&raw).is_some_and(|node| node.measure.is_some()))
}

/// Install or clear a node's baseline callback.
pub fn node_set_baseline_func(raw: RawNode, baseline: Option<BaselineCallback>) {
    with_state(|state| {
        if let Some(node) = state.nodes.get_mut(&raw) {
            node.baseline = baseline;
        }
    });
}

pub fn node_has_baseline_func(raw: RawNode) -> bool {
    with_state(|state| state.nodes.get(&raw).is_some_and(|node| node.baseline.is_some()))
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Dump the subtree under `raw` through the logger at `Debug` level.
pub fn node_print(raw: RawNode, options: PrintOptions) -> Result<()> {
    let Some(text) = with_state(|state| print::render(state, raw, options)) else {
        return Ok(());
    };
    diagnostics::emit(Diagnostic::for_node(raw, LogLevel::Debug, text))
}

fn report(raw: RawNode, error: taffy::TaffyError) -> Result<()> {
    diagnostics::emit(Diagnostic::for_node(raw, LogLevel::Error, error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::node_calculate_layout;
    use crate::types::{MeasureMode, Size};

    fn fixed(_: RawNode, _: f32, _: MeasureMode, _: f32, _: MeasureMode) -> Result<Size> {
        Ok(Size::new(10.0, 10.0))
    }

    #[test]
    fn test_insert_and_remove() {
        let parent = node_new();
        let a = node_new();
        let b = node_new();

        node_insert_child(parent, a, 0).unwrap();
        node_insert_child(parent, b, 0).unwrap();
        assert_eq!(node_child_count(parent), 2);
        assert_eq!(node_child_at(parent, 0), b);
        assert_eq!(node_child_at(parent, 1), a);
        assert_eq!(node_owner(a), parent);
        assert_eq!(node_child_at(parent, 2), RawNode::NULL);

        node_remove_child(parent, b).unwrap();
        assert_eq!(node_child_count(parent), 1);
        assert!(node_owner(b).is_null());

        for raw in [parent, a, b] {
            node_free(raw);
        }
    }

    #[test]
    fn test_insert_rejects_owned_child() {
        let first = node_new();
        let second = node_new();
        let child = node_new();
        node_insert_child(first, child, 0).unwrap();

        let result = node_insert_child(second, child, 0);
        assert!(matches!(result, Err(Error::LogEscalation { level: LogLevel::Fatal, .. })));
        assert_eq!(node_child_count(second), 0);
        assert_eq!(node_owner(child), first);
    }

    #[test]
    fn test_insert_rejects_cycle() {
        let root = node_new();
        let child = node_new();
        node_insert_child(root, child, 0).unwrap();
        assert!(node_insert_child(child, root, 0).is_err());
        assert!(node_insert_child(root, root, 0).is_err());
    }

    #[test]
    fn test_measure_rules() {
        let parent = node_new();
        let child = node_new();
        node_insert_child(parent, child, 0).unwrap();

        assert!(node_set_measure_func(parent, Some(fixed)).is_err());
        assert!(!node_has_measure_func(parent));

        node_set_measure_func(child, Some(fixed)).unwrap();
        assert!(node_has_measure_func(child));
        assert!(node_insert_child(child, node_new(), 0).is_err());

        node_set_measure_func(child, None).unwrap();
        assert!(!node_has_measure_func(child));
    }

    #[test]
    fn test_mark_dirty_requires_measure() {
        let node = node_new();
        assert!(node_mark_dirty(node).is_err());
        node_set_measure_func(node, Some(fixed)).unwrap();
        node_set_has_new_layout(node, false);
        assert!(node_mark_dirty(node).is_ok());
        assert!(node_is_dirty(node));
    }

    #[test]
    fn test_dirty_propagates_to_owner() {
        let root = node_new();
        let child = node_new();
        node_insert_child(root, child, 0).unwrap();
        node_calculate_layout(root, 100.0, 100.0, Direction::Ltr).unwrap();
        assert!(!node_is_dirty(root));

        node_update_style(child, |style| style.flex_grow = 1.0);
        assert!(node_is_dirty(child));
        assert!(node_is_dirty(root));
    }

    #[test]
    fn test_reset_rules() {
        let root = node_new();
        let child = node_new();
        node_insert_child(root, child, 0).unwrap();

        assert!(node_reset(root).is_err());
        assert!(node_reset(child).is_err());

        node_remove_child(root, child).unwrap();
        node_set_context(child, 7);
        node_update_style(child, |style| style.flex_grow = 3.0);
        node_reset(child).unwrap();

        assert_eq!(node_get_context(child), 0);
        assert!(node_style(child).is_some_and(|style| style.flex_grow.is_nan()));
    }

    #[test]
    fn test_free_orphans_children() {
        let before = node_instance_count();
        let root = node_new();
        let child = node_new();
        node_insert_child(root, child, 0).unwrap();

        node_free(root);
        assert!(node_owner(child).is_null());
        node_free(child);
        assert_eq!(node_instance_count(), before);
    }

    #[test]
    fn test_copy_style() {
        let src = node_new();
        let dst = node_new();
        node_update_style(src, |style| style.flex_grow = 2.0);
        node_copy_style(dst, src);
        assert!(node_style(dst).is_some_and(|style| style.flex_grow == 2.0));
    }
}
