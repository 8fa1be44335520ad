//! Core enums and small value types shared by the proxies and the engine.
//!
//! These mirror the vocabulary of the layout engine: every style property that
//! is not a [`Value`](crate::Value) is one of the enums below.

use bitflags::bitflags;

// =============================================================================
// Direction
// =============================================================================

/// Writing direction of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Direction {
    /// Take the direction of the owner (LTR at the root).
    #[default]
    Inherit = 0,
    Ltr = 1,
    Rtl = 2,
}

impl Direction {
    /// Resolve `Inherit` against the owner's resolved direction.
    pub const fn resolve(self, owner: Direction) -> Direction {
        match self {
            Self::Inherit => match owner {
                Self::Inherit => Self::Ltr,
                other => other,
            },
            other => other,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

// =============================================================================
// Flex Enums
// =============================================================================

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FlexDirection {
    #[default]
    Column = 0,
    ColumnReverse = 1,
    Row = 2,
    RowReverse = 3,
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::ColumnReverse => "column-reverse",
            Self::Row => "row",
            Self::RowReverse => "row-reverse",
        }
    }
}

/// Justify content (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Justify {
    #[default]
    FlexStart = 0,
    Center = 1,
    FlexEnd = 2,
    SpaceBetween = 3,
    SpaceAround = 4,
    SpaceEvenly = 5,
}

impl Justify {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FlexStart => "flex-start",
            Self::Center => "center",
            Self::FlexEnd => "flex-end",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
            Self::SpaceEvenly => "space-evenly",
        }
    }
}

/// Cross axis alignment, used for align-items, align-self and align-content.
///
/// `Auto` is only meaningful for align-self, where it defers to the owner's
/// align-items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Align {
    #[default]
    Auto = 0,
    FlexStart = 1,
    Center = 2,
    FlexEnd = 3,
    Stretch = 4,
    Baseline = 5,
    SpaceBetween = 6,
    SpaceAround = 7,
}

impl Align {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::FlexStart => "flex-start",
            Self::Center => "center",
            Self::FlexEnd => "flex-end",
            Self::Stretch => "stretch",
            Self::Baseline => "baseline",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
        }
    }
}

/// Position type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PositionType {
    #[default]
    Relative = 0,
    Absolute = 1,
}

impl PositionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Absolute => "absolute",
        }
    }
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Wrap {
    #[default]
    NoWrap = 0,
    Wrap = 1,
    WrapReverse = 2,
}

impl Wrap {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoWrap => "nowrap",
            Self::Wrap => "wrap",
            Self::WrapReverse => "wrap-reverse",
        }
    }
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Overflow {
    #[default]
    Visible = 0,
    Hidden = 1,
    Scroll = 2,
}

impl Overflow {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Scroll => "scroll",
        }
    }
}

/// Display mode. `None` removes the node from layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Display {
    #[default]
    Flex = 0,
    None = 1,
}

impl Display {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flex => "flex",
            Self::None => "none",
        }
    }
}

// =============================================================================
// Edges
// =============================================================================

/// Box edge selector for position, margin, padding and border.
///
/// `Start`/`End` follow the resolved direction, `Horizontal`/`Vertical`/`All`
/// are shorthands that apply when no more specific edge is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

impl Edge {
    /// Number of distinct edge slots.
    pub const COUNT: usize = 9;

    pub const ALL: [Edge; Self::COUNT] = [
        Self::Left,
        Self::Top,
        Self::Right,
        Self::Bottom,
        Self::Start,
        Self::End,
        Self::Horizontal,
        Self::Vertical,
        Self::All,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Start => "start",
            Self::End => "end",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::All => "all",
        }
    }
}

// =============================================================================
// Units & Measurement
// =============================================================================

/// Unit tag carried by a [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Unit {
    #[default]
    Undefined = 0,
    Point = 1,
    Percent = 2,
    Auto = 3,
}

/// How a measure callback should interpret the size it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MeasureMode {
    /// No constraint; the size argument is undefined.
    Undefined = 0,
    /// The node must be exactly this size.
    Exactly = 1,
    /// The node may be at most this size.
    AtMost = 2,
}

/// Result of a measure callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Severity of an engine log message.
///
/// `Error` and `Fatal` abort the operation that produced them once the message
/// has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Verbose = 4,
    Fatal = 5,
}

impl LogLevel {
    /// Whether a message at this level aborts the current operation.
    pub const fn escalates(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error | LogLevel::Fatal => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Verbose => log::Level::Trace,
        }
    }
}

// =============================================================================
// Config Features
// =============================================================================

/// Experimental engine behaviours that can be toggled per config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentalFeature {
    WebFlexBasis,
}

bitflags! {
    /// Set of enabled [`ExperimentalFeature`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExperimentalFeatures: u8 {
        const WEB_FLEX_BASIS = 1 << 0;
    }
}

impl From<ExperimentalFeature> for ExperimentalFeatures {
    fn from(feature: ExperimentalFeature) -> Self {
        match feature {
            ExperimentalFeature::WebFlexBasis => Self::WEB_FLEX_BASIS,
        }
    }
}

bitflags! {
    /// What a tree dump includes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PrintOptions: u8 {
        const LAYOUT = 1 << 0;
        const STYLE = 1 << 1;
        const CHILDREN = 1 << 2;
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::LAYOUT | Self::STYLE | Self::CHILDREN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_resolve() {
        assert_eq!(Direction::Inherit.resolve(Direction::Inherit), Direction::Ltr);
        assert_eq!(Direction::Inherit.resolve(Direction::Rtl), Direction::Rtl);
        assert_eq!(Direction::Ltr.resolve(Direction::Rtl), Direction::Ltr);
    }

    #[test]
    fn test_log_level_escalation() {
        assert!(LogLevel::Error.escalates());
        assert!(LogLevel::Fatal.escalates());
        assert!(!LogLevel::Warn.escalates());
        assert!(!LogLevel::Debug.escalates());
        assert_eq!(log::Level::from(LogLevel::Fatal), log::Level::Error);
    }

    #[test]
    fn test_print_options_default() {
        let options = PrintOptions::default();
        assert!(options.contains(PrintOptions::LAYOUT));
        assert!(options.contains(PrintOptions::STYLE));
        assert!(options.contains(PrintOptions::CHILDREN));
    }
}
