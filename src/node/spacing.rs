//! Per-edge style values and computed layout reads.
//!
//! Position and padding have no `Auto` form; setting `Auto` clears the edge.
//! Margins accept `Auto`. Borders are plain widths.

use super::Node;
use crate::native::{self, dimension_value, length_value};
use crate::types::{Direction, Edge};
use crate::value::{Value, UNDEFINED};

impl Node {
    // -------------------------------------------------------------------------
    // Edge Style
    // -------------------------------------------------------------------------

    pub fn position(&self, edge: Edge) -> Value {
        self.read_style(|style| style.position.get(edge))
    }

    pub fn set_position(&self, edge: Edge, value: Value) {
        self.update_style(|style| style.position.set(edge, length_value(value)));
    }

    pub fn margin(&self, edge: Edge) -> Value {
        self.read_style(|style| style.margin.get(edge))
    }

    pub fn set_margin(&self, edge: Edge, value: Value) {
        self.update_style(|style| style.margin.set(edge, dimension_value(value)));
    }

    pub fn padding(&self, edge: Edge) -> Value {
        self.read_style(|style| style.padding.get(edge))
    }

    pub fn set_padding(&self, edge: Edge, value: Value) {
        self.update_style(|style| style.padding.set(edge, length_value(value)));
    }

    /// Border width, or [`UNDEFINED`] if the edge is unset.
    pub fn border(&self, edge: Edge) -> f32 {
        self.read_style(|style| {
            let value = style.border.get(edge);
            if value.is_undefined() { UNDEFINED } else { value.value() }
        })
    }

    pub fn set_border(&self, edge: Edge, width: f32) {
        self.update_style(|style| style.border.set(edge, Value::point(width)));
    }

    // -------------------------------------------------------------------------
    // Computed Layout
    // -------------------------------------------------------------------------

    /// Left offset relative to the parent.
    pub fn layout_x(&self) -> f32 {
        native::node_layout(self.raw()).left
    }

    /// Top offset relative to the parent.
    pub fn layout_y(&self) -> f32 {
        native::node_layout(self.raw()).top
    }

    pub fn layout_width(&self) -> f32 {
        native::node_layout(self.raw()).width
    }

    pub fn layout_height(&self) -> f32 {
        native::node_layout(self.raw()).height
    }

    pub fn layout_direction(&self) -> Direction {
        native::node_layout(self.raw()).direction
    }

    /// Computed margin. `Start`/`End` follow the layout direction; the
    /// shorthand edges return [`UNDEFINED`].
    pub fn layout_margin(&self, edge: Edge) -> f32 {
        native::node_layout(self.raw()).margin(edge)
    }

    pub fn layout_padding(&self, edge: Edge) -> f32 {
        native::node_layout(self.raw()).padding(edge)
    }

    pub fn layout_border(&self, edge: Edge) -> f32 {
        native::node_layout(self.raw()).border(edge)
    }

    /// Baseline reported by the baseline function during the last layout
    /// pass, or [`UNDEFINED`].
    pub fn layout_baseline(&self) -> f32 {
        native::node_layout(self.raw()).baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_values() {
        let node = Node::new().unwrap();
        node.set_margin(Edge::Left, Value::auto());
        node.set_padding(Edge::Top, Value::auto());
        node.set_position(Edge::Start, Value::percent(10.0));
        node.set_border(Edge::All, 2.0);

        assert_eq!(node.margin(Edge::Left), Value::auto());
        assert!(node.padding(Edge::Top).is_undefined());
        assert_eq!(node.position(Edge::Start), Value::percent(10.0));
        assert!(node.border(Edge::Bottom).is_nan());
        assert_eq!(node.border(Edge::All), 2.0);
    }

    #[test]
    fn test_computed_box_model() {
        let root = Node::new().unwrap();
        root.set_padding(Edge::All, Value::point(5.0));
        root.set_border(Edge::Horizontal, 1.0);
        let child = Node::new().unwrap();
        child.set_margin(Edge::Top, Value::point(3.0));
        child.set_height(Value::point(10.0));
        root.add_child(&child).unwrap();

        root.calculate_layout(100.0, 50.0).unwrap();

        assert_eq!(root.layout_width(), 100.0);
        assert_eq!(root.layout_height(), 50.0);
        assert_eq!(root.layout_padding(Edge::Left), 5.0);
        assert_eq!(root.layout_border(Edge::Right), 1.0);
        assert_eq!(root.layout_border(Edge::Top), 0.0);
        assert!(root.layout_padding(Edge::All).is_nan());

        assert_eq!(child.layout_x(), 6.0);
        assert_eq!(child.layout_y(), 8.0);
        assert_eq!(child.layout_width(), 88.0);
        assert_eq!(child.layout_margin(Edge::Top), 3.0);
    }

    #[test]
    fn test_rtl_logical_edges() {
        let root = Node::new().unwrap();
        root.set_direction(Direction::Rtl);
        root.set_padding(Edge::Start, Value::point(7.0));
        root.calculate_layout(50.0, 50.0).unwrap();

        assert_eq!(root.layout_direction(), Direction::Rtl);
        assert_eq!(root.layout_padding(Edge::Right), 7.0);
        assert_eq!(root.layout_padding(Edge::Start), 7.0);
        assert_eq!(root.layout_padding(Edge::Left), 0.0);
    }
}
