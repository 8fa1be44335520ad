//! Node style storage and conversion to Taffy styles.
//!
//! Styles are stored in engine vocabulary (edges with shorthands, undefined
//! values, the `flex` shorthand) and resolved into a concrete `taffy::Style`
//! once the node's layout direction is known.

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems,
    AlignSelf as TaffyAlignSelf, Dimension as TaffyDimension, Display as TaffyDisplay,
    FlexDirection as TaffyFlexDirection, FlexWrap as TaffyFlexWrap,
    JustifyContent as TaffyJustifyContent, LengthPercentage, LengthPercentageAuto,
    Overflow as TaffyOverflow, Position as TaffyPosition, Rect, Size, Style,
};

use crate::types::{
    Align, Direction, Display, Edge, FlexDirection, Justify, Overflow, PositionType, Unit, Wrap,
};
use crate::value::{is_undefined, Value, UNDEFINED};

// =============================================================================
// Edges
// =============================================================================

/// Per-edge values, including the logical and shorthand slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edges([Value; Edge::COUNT]);

impl Edges {
    #[inline]
    pub fn get(&self, edge: Edge) -> Value {
        self.0[edge.index()]
    }

    #[inline]
    pub fn set(&mut self, edge: Edge, value: Value) {
        self.0[edge.index()] = value;
    }

    /// Resolve a physical edge (`Left`, `Top`, `Right`, `Bottom`) for a layout
    /// direction. Logical edges win over physical ones, physical ones over
    /// the axis shorthand, and the axis shorthand over `All`.
    pub fn resolve(&self, edge: Edge, direction: Direction) -> Value {
        let rtl = direction == Direction::Rtl;
        let (logical, axis) = match edge {
            Edge::Left => (Some(if rtl { Edge::End } else { Edge::Start }), Edge::Horizontal),
            Edge::Right => (Some(if rtl { Edge::Start } else { Edge::End }), Edge::Horizontal),
            Edge::Top | Edge::Bottom => (None, Edge::Vertical),
            _ => return self.get(edge),
        };

        logical
            .map(|logical| self.get(logical))
            .into_iter()
            .chain([self.get(edge), self.get(axis), self.get(Edge::All)])
            .find(|value| !value.is_undefined())
            .unwrap_or_default()
    }

    /// Iterate over the slots that hold a value.
    pub fn defined(&self) -> impl Iterator<Item = (Edge, Value)> + '_ {
        Edge::ALL
            .iter()
            .map(|&edge| (edge, self.get(edge)))
            .filter(|(_, value)| !value.is_undefined())
    }
}

// =============================================================================
// Node Style
// =============================================================================

/// Complete style of a native node.
///
/// `flex`, `flex_grow`, `flex_shrink` and `aspect_ratio` use [`UNDEFINED`] for
/// "not set".
#[derive(Debug, Clone, Copy)]
pub struct NodeStyle {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,

    pub flex: f32,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Value,

    pub position: Edges,
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,

    pub width: Value,
    pub height: Value,
    pub min_width: Value,
    pub min_height: Value,
    pub max_width: Value,
    pub max_height: Value,
    pub aspect_ratio: f32,

    web_defaults: bool,
}

impl NodeStyle {
    /// Default style for a node created under a config.
    pub fn for_config(web_defaults: bool) -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: if web_defaults { FlexDirection::Row } else { FlexDirection::Column },
            justify_content: Justify::FlexStart,
            align_content: if web_defaults { Align::Stretch } else { Align::FlexStart },
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: UNDEFINED,
            flex_grow: UNDEFINED,
            flex_shrink: UNDEFINED,
            flex_basis: Value::auto(),
            position: Edges::default(),
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            width: Value::auto(),
            height: Value::auto(),
            min_width: Value::undefined(),
            min_height: Value::undefined(),
            max_width: Value::undefined(),
            max_height: Value::undefined(),
            aspect_ratio: UNDEFINED,
            web_defaults,
        }
    }

    #[inline]
    pub fn uses_web_defaults(&self) -> bool {
        self.web_defaults
    }

    /// Flex grow after applying the `flex` shorthand.
    pub fn resolved_flex_grow(&self) -> f32 {
        if !is_undefined(self.flex_grow) {
            self.flex_grow
        } else if !is_undefined(self.flex) && self.flex > 0.0 {
            self.flex
        } else {
            0.0
        }
    }

    /// Flex shrink after applying the `flex` shorthand.
    pub fn resolved_flex_shrink(&self) -> f32 {
        if !is_undefined(self.flex_shrink) {
            self.flex_shrink
        } else if !self.web_defaults && !is_undefined(self.flex) && self.flex < 0.0 {
            -self.flex
        } else if self.web_defaults {
            1.0
        } else {
            0.0
        }
    }

    /// Flex basis after applying the `flex` shorthand.
    pub fn resolved_flex_basis(&self) -> Value {
        match self.flex_basis.unit() {
            Unit::Point | Unit::Percent => self.flex_basis,
            _ if !self.web_defaults && !is_undefined(self.flex) && self.flex > 0.0 => {
                Value::point(0.0)
            }
            _ => Value::auto(),
        }
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self::for_config(false)
    }
}

/// Normalise a size value. `Auto` is kept.
pub(crate) fn dimension_value(value: Value) -> Value {
    match value.unit() {
        Unit::Point => Value::point(value.value()),
        Unit::Percent => Value::percent(value.value()),
        Unit::Auto => Value::auto(),
        Unit::Undefined => Value::undefined(),
    }
}

/// Normalise a length value for properties without an `Auto` form
/// (min/max sizes, position, padding, border). `Auto` becomes undefined.
pub(crate) fn length_value(value: Value) -> Value {
    match value.unit() {
        Unit::Auto => Value::undefined(),
        _ => dimension_value(value),
    }
}

// =============================================================================
// Value Conversion
// =============================================================================

fn to_taffy_dimension(value: Value) -> TaffyDimension {
    match value.unit() {
        Unit::Point => TaffyDimension::Length(value.value()),
        Unit::Percent => TaffyDimension::Percent(value.value() / 100.0),
        Unit::Auto | Unit::Undefined => TaffyDimension::Auto,
    }
}

fn to_taffy_margin(value: Value) -> LengthPercentageAuto {
    match value.unit() {
        Unit::Point => LengthPercentageAuto::Length(value.value()),
        Unit::Percent => LengthPercentageAuto::Percent(value.value() / 100.0),
        Unit::Auto => LengthPercentageAuto::Auto,
        Unit::Undefined => LengthPercentageAuto::Length(0.0),
    }
}

fn to_taffy_inset(value: Value) -> LengthPercentageAuto {
    match value.unit() {
        Unit::Point => LengthPercentageAuto::Length(value.value()),
        Unit::Percent => LengthPercentageAuto::Percent(value.value() / 100.0),
        Unit::Auto | Unit::Undefined => LengthPercentageAuto::Auto,
    }
}

fn to_taffy_length(value: Value) -> LengthPercentage {
    match value.unit() {
        Unit::Point => LengthPercentage::Length(value.value()),
        Unit::Percent => LengthPercentage::Percent(value.value() / 100.0),
        Unit::Auto | Unit::Undefined => LengthPercentage::Length(0.0),
    }
}

fn resolve_rect<T>(edges: &Edges, direction: Direction, convert: fn(Value) -> T) -> Rect<T> {
    Rect {
        left: convert(edges.resolve(Edge::Left, direction)),
        right: convert(edges.resolve(Edge::Right, direction)),
        top: convert(edges.resolve(Edge::Top, direction)),
        bottom: convert(edges.resolve(Edge::Bottom, direction)),
    }
}

// =============================================================================
// Enum Conversion
// =============================================================================

fn to_taffy_flex_direction(
    flex_direction: FlexDirection,
    direction: Direction,
) -> TaffyFlexDirection {
    let rtl = direction == Direction::Rtl;
    match flex_direction {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::Row if rtl => TaffyFlexDirection::RowReverse,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::RowReverse if rtl => TaffyFlexDirection::Row,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: Wrap) -> TaffyFlexWrap {
    match wrap {
        Wrap::NoWrap => TaffyFlexWrap::NoWrap,
        Wrap::Wrap => TaffyFlexWrap::Wrap,
        Wrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: Justify) -> Option<TaffyJustifyContent> {
    Some(match justify {
        Justify::FlexStart => TaffyJustifyContent::FlexStart,
        Justify::Center => TaffyJustifyContent::Center,
        Justify::FlexEnd => TaffyJustifyContent::FlexEnd,
        Justify::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        Justify::SpaceAround => TaffyJustifyContent::SpaceAround,
        Justify::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_taffy_align_items(align: Align) -> Option<TaffyAlignItems> {
    match align {
        Align::Auto => None,
        Align::FlexStart | Align::SpaceBetween | Align::SpaceAround => {
            Some(TaffyAlignItems::FlexStart)
        }
        Align::Center => Some(TaffyAlignItems::Center),
        Align::FlexEnd => Some(TaffyAlignItems::FlexEnd),
        Align::Stretch => Some(TaffyAlignItems::Stretch),
        Align::Baseline => Some(TaffyAlignItems::Baseline),
    }
}

fn to_taffy_align_self(align: Align) -> Option<TaffyAlignSelf> {
    // Auto defers to the owner's align-items
    to_taffy_align_items(align)
}

fn to_taffy_align_content(align: Align) -> Option<TaffyAlignContent> {
    match align {
        Align::Auto => None,
        Align::FlexStart | Align::Baseline => Some(TaffyAlignContent::FlexStart),
        Align::Center => Some(TaffyAlignContent::Center),
        Align::FlexEnd => Some(TaffyAlignContent::FlexEnd),
        Align::Stretch => Some(TaffyAlignContent::Stretch),
        Align::SpaceBetween => Some(TaffyAlignContent::SpaceBetween),
        Align::SpaceAround => Some(TaffyAlignContent::SpaceAround),
    }
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

fn to_taffy_position(position_type: PositionType) -> TaffyPosition {
    match position_type {
        PositionType::Relative => TaffyPosition::Relative,
        PositionType::Absolute => TaffyPosition::Absolute,
    }
}

fn to_taffy_display(display: Display) -> TaffyDisplay {
    match display {
        Display::Flex => TaffyDisplay::Flex,
        Display::None => TaffyDisplay::None,
    }
}

// =============================================================================
// Style Building
// =============================================================================

/// Build a Taffy style for a node laid out in `direction` (already resolved).
pub(crate) fn build_style(style: &NodeStyle, direction: Direction) -> Style {
    let overflow = to_taffy_overflow(style.overflow);

    Style {
        display: to_taffy_display(style.display),
        position: to_taffy_position(style.position_type),
        overflow: taffy::Point { x: overflow, y: overflow },

        // Container
        flex_direction: to_taffy_flex_direction(style.flex_direction, direction),
        flex_wrap: to_taffy_flex_wrap(style.flex_wrap),
        justify_content: to_taffy_justify_content(style.justify_content),
        align_items: to_taffy_align_items(style.align_items),
        align_content: to_taffy_align_content(style.align_content),

        // Item
        flex_grow: style.resolved_flex_grow(),
        flex_shrink: style.resolved_flex_shrink(),
        flex_basis: to_taffy_dimension(style.resolved_flex_basis()),
        align_self: to_taffy_align_self(style.align_self),

        // Dimensions
        size: Size {
            width: to_taffy_dimension(style.width),
            height: to_taffy_dimension(style.height),
        },
        min_size: Size {
            width: to_taffy_dimension(style.min_width),
            height: to_taffy_dimension(style.min_height),
        },
        max_size: Size {
            width: to_taffy_dimension(style.max_width),
            height: to_taffy_dimension(style.max_height),
        },
        aspect_ratio: (!is_undefined(style.aspect_ratio)).then_some(style.aspect_ratio),

        // Box model
        inset: resolve_rect(&style.position, direction, to_taffy_inset),
        margin: resolve_rect(&style.margin, direction, to_taffy_margin),
        padding: resolve_rect(&style.padding, direction, to_taffy_length),
        border: resolve_rect(&style.border, direction, to_taffy_length),

        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_web_defaults() {
        let style = build_style(&NodeStyle::default(), Direction::Ltr);
        assert_eq!(style.flex_direction, TaffyFlexDirection::Column);
        assert_eq!(style.flex_shrink, 0.0);
        assert_eq!(style.align_content, Some(TaffyAlignContent::FlexStart));
        assert_eq!(style.size.width, TaffyDimension::Auto);
    }

    #[test]
    fn test_web_defaults() {
        let style = build_style(&NodeStyle::for_config(true), Direction::Ltr);
        assert_eq!(style.flex_direction, TaffyFlexDirection::Row);
        assert_eq!(style.flex_shrink, 1.0);
        assert_eq!(style.align_content, Some(TaffyAlignContent::Stretch));
    }

    #[test]
    fn test_flex_shorthand() {
        let mut style = NodeStyle::default();
        style.flex = 2.0;
        assert_eq!(style.resolved_flex_grow(), 2.0);
        assert_eq!(style.resolved_flex_shrink(), 0.0);
        assert_eq!(style.resolved_flex_basis(), Value::point(0.0));

        style.flex = -1.0;
        assert_eq!(style.resolved_flex_grow(), 0.0);
        assert_eq!(style.resolved_flex_shrink(), 1.0);
        assert_eq!(style.resolved_flex_basis(), Value::auto());

        style.flex_grow = 5.0;
        assert_eq!(style.resolved_flex_grow(), 5.0);
    }

    #[test]
    fn test_rtl_swaps_row() {
        let mut style = NodeStyle::default();
        style.flex_direction = FlexDirection::Row;
        assert_eq!(
            build_style(&style, Direction::Rtl).flex_direction,
            TaffyFlexDirection::RowReverse
        );
        style.flex_direction = FlexDirection::RowReverse;
        assert_eq!(build_style(&style, Direction::Rtl).flex_direction, TaffyFlexDirection::Row);
    }

    #[test]
    fn test_edge_resolution() {
        let mut edges = Edges::default();
        edges.set(Edge::All, Value::point(1.0));
        edges.set(Edge::Horizontal, Value::point(2.0));
        edges.set(Edge::Start, Value::point(3.0));

        assert_eq!(edges.resolve(Edge::Top, Direction::Ltr), Value::point(1.0));
        assert_eq!(edges.resolve(Edge::Left, Direction::Ltr), Value::point(3.0));
        assert_eq!(edges.resolve(Edge::Right, Direction::Ltr), Value::point(2.0));
        assert_eq!(edges.resolve(Edge::Right, Direction::Rtl), Value::point(3.0));
        assert_eq!(edges.defined().count(), 3);
    }

    #[test]
    fn test_percent_scaled() {
        let mut style = NodeStyle::default();
        style.width = Value::percent(50.0);
        style.padding.set(Edge::Top, Value::percent(10.0));
        let built = build_style(&style, Direction::Ltr);
        assert_eq!(built.size.width, TaffyDimension::Percent(0.5));
        assert_eq!(built.padding.top, LengthPercentage::Percent(0.1));
    }

    #[test]
    fn test_length_value_drops_auto() {
        assert!(length_value(Value::auto()).is_undefined());
        assert_eq!(dimension_value(Value::auto()), Value::auto());
        assert_eq!(length_value(Value::point(4.0)), Value::point(4.0));
    }
}
