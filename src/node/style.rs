//! Style pass-throughs. Every setter marks the node dirty.

use super::Node;
use crate::native::{self, dimension_value, length_value, NodeStyle};
use crate::types::{Align, Direction, Display, FlexDirection, Justify, Overflow, PositionType, Wrap};
use crate::value::{is_undefined, Value};

impl Node {
    pub(super) fn read_style<R>(&self, f: impl FnOnce(&NodeStyle) -> R) -> R {
        f(&native::node_style(self.raw()).unwrap_or_default())
    }

    pub(super) fn update_style(&self, f: impl FnOnce(&mut NodeStyle)) {
        native::node_update_style(self.raw(), f);
    }

    /// Copy every style property of `source` onto this node.
    pub fn copy_style(&self, source: &Node) {
        native::node_copy_style(self.raw(), source.raw());
    }

    // -------------------------------------------------------------------------
    // Container
    // -------------------------------------------------------------------------

    /// Declared direction; [`layout_direction`](Self::layout_direction) has
    /// the resolved one.
    pub fn style_direction(&self) -> Direction {
        self.read_style(|style| style.direction)
    }

    pub fn set_direction(&self, direction: Direction) {
        self.update_style(|style| style.direction = direction);
    }

    pub fn flex_direction(&self) -> FlexDirection {
        self.read_style(|style| style.flex_direction)
    }

    pub fn set_flex_direction(&self, flex_direction: FlexDirection) {
        self.update_style(|style| style.flex_direction = flex_direction);
    }

    pub fn justify_content(&self) -> Justify {
        self.read_style(|style| style.justify_content)
    }

    pub fn set_justify_content(&self, justify: Justify) {
        self.update_style(|style| style.justify_content = justify);
    }

    pub fn align_items(&self) -> Align {
        self.read_style(|style| style.align_items)
    }

    pub fn set_align_items(&self, align: Align) {
        self.update_style(|style| style.align_items = align);
    }

    pub fn align_self(&self) -> Align {
        self.read_style(|style| style.align_self)
    }

    pub fn set_align_self(&self, align: Align) {
        self.update_style(|style| style.align_self = align);
    }

    pub fn align_content(&self) -> Align {
        self.read_style(|style| style.align_content)
    }

    pub fn set_align_content(&self, align: Align) {
        self.update_style(|style| style.align_content = align);
    }

    pub fn position_type(&self) -> PositionType {
        self.read_style(|style| style.position_type)
    }

    pub fn set_position_type(&self, position_type: PositionType) {
        self.update_style(|style| style.position_type = position_type);
    }

    pub fn wrap(&self) -> Wrap {
        self.read_style(|style| style.flex_wrap)
    }

    pub fn set_wrap(&self, wrap: Wrap) {
        self.update_style(|style| style.flex_wrap = wrap);
    }

    pub fn overflow(&self) -> Overflow {
        self.read_style(|style| style.overflow)
    }

    pub fn set_overflow(&self, overflow: Overflow) {
        self.update_style(|style| style.overflow = overflow);
    }

    pub fn display(&self) -> Display {
        self.read_style(|style| style.display)
    }

    pub fn set_display(&self, display: Display) {
        self.update_style(|style| style.display = display);
    }

    // -------------------------------------------------------------------------
    // Flex Item
    // -------------------------------------------------------------------------

    /// The `flex` shorthand, or [`UNDEFINED`](crate::UNDEFINED) if unset.
    pub fn flex(&self) -> f32 {
        self.read_style(|style| style.flex)
    }

    /// Positive values grow, negative values shrink (outside web defaults).
    pub fn set_flex(&self, flex: f32) {
        self.update_style(|style| style.flex = flex);
    }

    pub fn flex_grow(&self) -> f32 {
        self.read_style(|style| if is_undefined(style.flex_grow) { 0.0 } else { style.flex_grow })
    }

    pub fn set_flex_grow(&self, grow: f32) {
        self.update_style(|style| style.flex_grow = grow);
    }

    pub fn flex_shrink(&self) -> f32 {
        self.read_style(|style| match style.flex_shrink {
            shrink if !is_undefined(shrink) => shrink,
            _ if style.uses_web_defaults() => 1.0,
            _ => 0.0,
        })
    }

    pub fn set_flex_shrink(&self, shrink: f32) {
        self.update_style(|style| style.flex_shrink = shrink);
    }

    pub fn flex_basis(&self) -> Value {
        self.read_style(|style| style.flex_basis)
    }

    pub fn set_flex_basis(&self, basis: Value) {
        self.update_style(|style| style.flex_basis = dimension_value(basis));
    }

    // -------------------------------------------------------------------------
    // Dimensions
    // -------------------------------------------------------------------------

    pub fn width(&self) -> Value {
        self.read_style(|style| style.width)
    }

    pub fn set_width(&self, width: Value) {
        self.update_style(|style| style.width = dimension_value(width));
    }

    pub fn height(&self) -> Value {
        self.read_style(|style| style.height)
    }

    pub fn set_height(&self, height: Value) {
        self.update_style(|style| style.height = dimension_value(height));
    }

    pub fn min_width(&self) -> Value {
        self.read_style(|style| style.min_width)
    }

    pub fn set_min_width(&self, min_width: Value) {
        self.update_style(|style| style.min_width = length_value(min_width));
    }

    pub fn min_height(&self) -> Value {
        self.read_style(|style| style.min_height)
    }

    pub fn set_min_height(&self, min_height: Value) {
        self.update_style(|style| style.min_height = length_value(min_height));
    }

    pub fn max_width(&self) -> Value {
        self.read_style(|style| style.max_width)
    }

    pub fn set_max_width(&self, max_width: Value) {
        self.update_style(|style| style.max_width = length_value(max_width));
    }

    pub fn max_height(&self) -> Value {
        self.read_style(|style| style.max_height)
    }

    pub fn set_max_height(&self, max_height: Value) {
        self.update_style(|style| style.max_height = length_value(max_height));
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.read_style(|style| style.aspect_ratio)
    }

    pub fn set_aspect_ratio(&self, ratio: f32) {
        self.update_style(|style| style.aspect_ratio = ratio);
    }

    // -------------------------------------------------------------------------
    // Baseline
    // -------------------------------------------------------------------------

    pub fn is_reference_baseline(&self) -> bool {
        native::node_is_reference_baseline(self.raw())
    }

    pub fn set_is_reference_baseline(&self, value: bool) {
        native::node_set_is_reference_baseline(self.raw(), value);
    }
}

#[cfg(test)]
mod tests {
    use crate::types::Unit;
    use crate::Config;

    use super::*;

    #[test]
    fn test_defaults() {
        let node = Node::new().unwrap();
        assert_eq!(node.flex_direction(), FlexDirection::Column);
        assert_eq!(node.align_items(), Align::Stretch);
        assert_eq!(node.align_content(), Align::FlexStart);
        assert_eq!(node.flex_grow(), 0.0);
        assert_eq!(node.flex_shrink(), 0.0);
        assert_eq!(node.width(), Value::auto());
        assert!(node.max_width().is_undefined());
        assert!(node.flex().is_nan());
    }

    #[test]
    fn test_web_defaults() {
        let config = Config::new().unwrap();
        config.set_use_web_defaults(true);
        let node = Node::with_config(&config).unwrap();
        assert_eq!(node.flex_direction(), FlexDirection::Row);
        assert_eq!(node.align_content(), Align::Stretch);
        assert_eq!(node.flex_shrink(), 1.0);
    }

    #[test]
    fn test_setters_mark_dirty() {
        let node = Node::new().unwrap();
        node.calculate().unwrap();
        assert!(!node.is_dirty());
        node.set_width(Value::point(40.0));
        assert!(node.is_dirty());
        assert_eq!(node.width(), Value::point(40.0));
    }

    #[test]
    fn test_min_max_drop_auto() {
        let node = Node::new().unwrap();
        node.set_min_width(Value::auto());
        assert_eq!(node.min_width().unit(), Unit::Undefined);
        node.set_flex_basis(Value::percent(25.0));
        assert_eq!(node.flex_basis(), Value::percent(25.0));
    }
}
