//! Native layout engine - the opaque resource owner behind the proxies.
//!
//! This module plays the part of a C layout library: resources are referred to
//! by raw integer handles, every node and config carries an opaque user-data
//! slot, callbacks are plain function pointers, and a single logger callback
//! receives every diagnostic. Layout itself is delegated to
//! [Taffy](https://github.com/DioxusLabs/taffy).
//!
//! # Architecture
//!
//! ```text
//! Node / Config proxies ──raw handles──▶ native entry points
//!                                          │
//!                      ┌───────────────────┼─────────────────────┐
//!                      ▼                   ▼                     ▼
//!               EngineState          TaffyTree<RawNode>     logger callback
//!        (records, styles, slots)    (structure + layout)   (diagnostics)
//! ```
//!
//! The engine is thread-confined: each thread gets its own state, its own
//! tree and its own default config. Entry points that can emit a log message
//! return [`Result`](crate::Result) so that escalated messages reach the caller.
//!
//! Layout callbacks run while the tree is borrowed. Structural mutations made
//! from inside a callback are rejected with a `Fatal` log message.

mod config;
mod diagnostics;
mod layout;
mod node;
mod print;
mod state;
mod style;

pub use config::*;
pub use diagnostics::set_logger;
pub use layout::{node_calculate_layout, LayoutRecord};
pub use node::*;
pub use style::{Edges, NodeStyle};

pub(crate) use style::{dimension_value, length_value};

use crate::error::Result;
use crate::types::{LogLevel, MeasureMode, Size};

// =============================================================================
// Raw Handles
// =============================================================================

/// Raw handle to a native node. `RawNode::NULL` means "no node".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawNode(pub(crate) u64);

impl RawNode {
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Raw handle to a native config. `RawConfig::NULL` means "no config".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawConfig(pub(crate) u64);

impl RawConfig {
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

// =============================================================================
// Callback Signatures
// =============================================================================

/// Measure callback: `(node, width, width_mode, height, height_mode)`.
pub type MeasureCallback = fn(RawNode, f32, MeasureMode, f32, MeasureMode) -> Result<Size>;

/// Baseline callback: `(node, width, height)`.
pub type BaselineCallback = fn(RawNode, f32, f32) -> Result<f32>;

/// Logger callback: `(config, node, level, message)`. `node` may be null.
pub type LogCallback = fn(RawConfig, RawNode, LogLevel, &str) -> Result<()>;
