//! Layout computation through Taffy and the computed layout record.
//!
//! A pass runs in four steps:
//! 1. Plan: walk the subtree, resolve directions and build Taffy styles
//! 2. Sync: push changed styles into the tree
//! 3. Compute: run Taffy with the registered measure callbacks
//! 4. Extract: copy rounded results back, then query baseline callbacks

use taffy::{AvailableSpace, Dimension as TaffyDimension, NodeId, Style};

use super::diagnostics::{self, Diagnostic};
use super::state::{with_state, with_tree, EngineState};
use super::style::build_style;
use super::RawNode;
use crate::error::{Error, Result};
use crate::types::{Direction, Edge, LogLevel, MeasureMode, Unit};
use crate::value::{is_undefined, UNDEFINED};

// =============================================================================
// Layout Record
// =============================================================================

/// Computed layout of one node, relative to its owner.
///
/// Edge arrays are ordered left, top, right, bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRecord {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub direction: Direction,
    pub margin: [f32; 4],
    pub padding: [f32; 4],
    pub border: [f32; 4],
    /// Result of the baseline callback, or [`UNDEFINED`] if none ran.
    pub baseline: f32,
}

impl Default for LayoutRecord {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: UNDEFINED,
            height: UNDEFINED,
            direction: Direction::Inherit,
            margin: [0.0; 4],
            padding: [0.0; 4],
            border: [0.0; 4],
            baseline: UNDEFINED,
        }
    }
}

impl LayoutRecord {
    /// Build a record from a Taffy layout, rounding to the point grid.
    fn from_taffy(layout: &taffy::Layout, direction: Direction, scale: f32) -> Self {
        let round = |value: f32| round_to_scale(value, scale);
        let edges = |rect: taffy::Rect<f32>| {
            [round(rect.left), round(rect.top), round(rect.right), round(rect.bottom)]
        };

        Self {
            left: round(layout.location.x),
            top: round(layout.location.y),
            width: round(layout.size.width),
            height: round(layout.size.height),
            direction,
            margin: edges(layout.margin),
            padding: edges(layout.padding),
            border: edges(layout.border),
            baseline: UNDEFINED,
        }
    }

    pub fn margin(&self, edge: Edge) -> f32 {
        self.edge(&self.margin, edge)
    }

    pub fn padding(&self, edge: Edge) -> f32 {
        self.edge(&self.padding, edge)
    }

    pub fn border(&self, edge: Edge) -> f32 {
        self.edge(&self.border, edge)
    }

    /// Physical and logical edges resolve; shorthands have no single value.
    fn edge(&self, values: &[f32; 4], edge: Edge) -> f32 {
        let rtl = self.direction == Direction::Rtl;
        match edge {
            Edge::Left => values[0],
            Edge::Top => values[1],
            Edge::Right => values[2],
            Edge::Bottom => values[3],
            Edge::Start => values[if rtl { 2 } else { 0 }],
            Edge::End => values[if rtl { 0 } else { 2 }],
            Edge::Horizontal | Edge::Vertical | Edge::All => UNDEFINED,
        }
    }
}

/// Round to the nearest multiple of `1 / scale`. A scale of 0 disables rounding.
fn round_to_scale(value: f32, scale: f32) -> f32 {
    if scale == 0.0 || !value.is_finite() {
        return value;
    }
    (value * scale).round() / scale
}

// =============================================================================
// Planning
// =============================================================================

struct PlanEntry {
    raw: RawNode,
    taffy_id: NodeId,
    revision: u64,
    direction: Direction,
    style: Style,
}

struct LayoutPlan {
    entries: Vec<PlanEntry>,
    scale: f32,
}

/// Preorder walk of the subtree under `root`, resolving directions.
fn build_plan(
    state: &EngineState,
    root: RawNode,
    width: f32,
    height: f32,
    owner_direction: Direction,
) -> Option<LayoutPlan> {
    let scale = state.config_of(root).point_scale_factor;
    let mut entries = Vec::new();
    let mut stack = vec![(root, owner_direction)];

    while let Some((raw, parent_direction)) = stack.pop() {
        let Some(node) = state.nodes.get(&raw) else {
            continue;
        };
        let direction = node.style.direction.resolve(parent_direction);
        let mut style = build_style(&node.style, direction);

        if raw == root {
            fill_available(&mut style, &node.style, width, height);
        }

        entries.push(PlanEntry {
            raw,
            taffy_id: node.taffy_id,
            revision: node.revision,
            direction,
            style,
        });
        stack.extend(node.children.iter().rev().map(|&child| (child, direction)));
    }

    (!entries.is_empty()).then_some(LayoutPlan { entries, scale })
}

/// A root without an explicit size fills the available space exactly.
fn fill_available(style: &mut Style, node: &super::NodeStyle, width: f32, height: f32) {
    let sized = |unit: Unit| matches!(unit, Unit::Point | Unit::Percent);

    if !sized(node.width.unit()) && node.max_width.is_undefined() && !is_undefined(width) {
        style.size.width = TaffyDimension::Length(width);
    }
    if !sized(node.height.unit()) && node.max_height.is_undefined() && !is_undefined(height) {
        style.size.height = TaffyDimension::Length(height);
    }
}

fn available_space(value: f32) -> AvailableSpace {
    if is_undefined(value) {
        AvailableSpace::MaxContent
    } else {
        AvailableSpace::Definite(value)
    }
}

fn measure_input(known: Option<f32>, available: AvailableSpace) -> (f32, MeasureMode) {
    match (known, available) {
        (Some(size), _) => (size, MeasureMode::Exactly),
        (None, AvailableSpace::Definite(size)) => (size, MeasureMode::AtMost),
        (None, _) => (UNDEFINED, MeasureMode::Undefined),
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Compute layout for the subtree under `root`.
///
/// `width`/`height` are the available space ([`UNDEFINED`] = unconstrained);
/// `direction` is the owner direction used to resolve `Inherit`.
pub fn node_calculate_layout(
    root: RawNode,
    width: f32,
    height: f32,
    direction: Direction,
) -> Result<()> {
    let Some(plan) = with_state(|state| build_plan(state, root, width, height, direction)) else {
        return Ok(());
    };
    log::trace!(target: "arrange", "layout pass over {} nodes", plan.entries.len());

    let root_id = plan.entries[0].taffy_id;
    let available =
        taffy::Size { width: available_space(width), height: available_space(height) };
    let mut failure: Option<Error> = None;

    let computed = with_tree(|tree| {
        for entry in &plan.entries {
            let changed = tree
                .style(entry.taffy_id)
                .map(|current| *current != entry.style)
                .unwrap_or(true);
            if changed {
                tree.set_style(entry.taffy_id, entry.style.clone())?;
            }
        }

        tree.compute_layout_with_measure(
            root_id,
            available,
            |known: taffy::Size<Option<f32>>,
             space: taffy::Size<AvailableSpace>,
             _id: NodeId,
             context: Option<&mut RawNode>,
             _style: &Style| {
                let Some(&mut raw) = context else {
                    return taffy::Size::ZERO;
                };
                if failure.is_some() {
                    return taffy::Size::ZERO;
                }
                let Some(measure) =
                    with_state(|state| state.nodes.get(&raw).and_then(|node| node.measure))
                else {
                    return taffy::Size::ZERO;
                };

                let (w, width_mode) = measure_input(known.width, space.width);
                let (h, height_mode) = measure_input(known.height, space.height);
                match measure(raw, w, width_mode, h, height_mode) {
                    Ok(size) => taffy::Size {
                        width: known.width.unwrap_or(size.width),
                        height: known.height.unwrap_or(size.height),
                    },
                    Err(error) => {
                        failure = Some(error);
                        taffy::Size::ZERO
                    }
                }
            },
        )?;

        plan.entries
            .iter()
            .map(|entry| {
                tree.layout(entry.taffy_id)
                    .map(|layout| LayoutRecord::from_taffy(layout, entry.direction, plan.scale))
            })
            .collect::<taffy::TaffyResult<Vec<_>>>()
    });

    if let Some(error) = failure {
        // Drop the cached zero sizes so the next pass measures again
        with_tree(|tree| {
            for entry in &plan.entries {
                let _ = tree.mark_dirty(entry.taffy_id);
            }
        });
        return Err(error);
    }
    let records = match computed {
        Some(Ok(records)) => records,
        Some(Err(error)) => {
            let message = error.to_string();
            return diagnostics::emit(Diagnostic::for_node(root, LogLevel::Error, message));
        }
        None => {
            return diagnostics::fatal(root, "Cannot calculate layout while layout is running");
        }
    };

    let baselines = with_state(|state| {
        let mut baselines = Vec::new();
        let mut changed = Vec::new();
        for (entry, record) in plan.entries.iter().zip(records) {
            if let Some(node) = state.nodes.get_mut(&entry.raw) {
                node.layout = record;
                node.has_new_layout = true;
                node.is_dirty = false;
                if node.revision != entry.revision {
                    changed.push(entry.raw);
                }
                if let Some(baseline) = node.baseline {
                    baselines.push((entry.raw, baseline, record.width, record.height));
                }
            }
        }
        // Styled by a callback mid-pass: the record predates the change
        for raw in changed {
            state.mark_dirty_chain(raw);
        }
        baselines
    });

    for (raw, baseline, width, height) in baselines {
        let value = baseline(raw, width, height)?;
        with_state(|state| {
            if let Some(node) = state.nodes.get_mut(&raw) {
                node.layout.baseline = value;
            }
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_scale() {
        assert_eq!(round_to_scale(10.4, 1.0), 10.0);
        assert_eq!(round_to_scale(10.3, 2.0), 10.5);
        assert_eq!(round_to_scale(10.3, 0.0), 10.3);
        assert!(round_to_scale(UNDEFINED, 1.0).is_nan());
    }

    #[test]
    fn test_measure_input_modes() {
        assert_eq!(
            measure_input(Some(5.0), AvailableSpace::MaxContent),
            (5.0, MeasureMode::Exactly)
        );
        assert_eq!(measure_input(None, AvailableSpace::Definite(7.0)), (7.0, MeasureMode::AtMost));
        let (size, mode) = measure_input(None, AvailableSpace::MinContent);
        assert!(size.is_nan());
        assert_eq!(mode, MeasureMode::Undefined);
    }

    #[test]
    fn test_style_change_during_measure_stays_dirty() {
        use crate::types::Size;
        use crate::value::Value;
        use crate::Node;

        let root = Node::new().unwrap();
        let leaf = Node::new().unwrap();
        leaf.set_measure_function(|node, _, _, _, _| {
            if node.height() == Value::auto() {
                node.set_height(Value::point(50.0));
            }
            Size::new(10.0, 10.0)
        })
        .unwrap();
        root.add_child(&leaf).unwrap();

        root.calculate_layout(100.0, UNDEFINED).unwrap();
        assert_eq!(leaf.height(), Value::point(50.0));
        assert_eq!(leaf.layout_height(), 10.0);
        assert!(leaf.is_dirty());
        assert!(root.is_dirty());

        root.calculate_layout(100.0, UNDEFINED).unwrap();
        assert_eq!(leaf.layout_height(), 50.0);
        assert!(!leaf.is_dirty());
        assert!(!root.is_dirty());
    }

    #[test]
    fn test_logical_edges_follow_direction() {
        let record = LayoutRecord {
            margin: [1.0, 2.0, 3.0, 4.0],
            direction: Direction::Rtl,
            ..LayoutRecord::default()
        };
        assert_eq!(record.margin(Edge::Start), 3.0);
        assert_eq!(record.margin(Edge::End), 1.0);
        assert_eq!(record.margin(Edge::Bottom), 4.0);
        assert!(record.margin(Edge::All).is_nan());
    }
}
