//! # arrange
//!
//! Managed node and config proxies over a native flexbox layout engine.
//!
//! ## Architecture
//!
//! The layout engine ([`native`]) owns every node and config and refers to
//! them by raw integer handles. Application code works with [`Node`] and
//! [`Config`] proxies instead. Each proxy owns exactly one engine resource and
//! releases it when the last clone is dropped.
//!
//! The engine finds its way back to a proxy through a weak *context link*: a
//! generational token stored in the resource's user-data slot that resolves
//! through a per-kind registry. Measure, baseline and log callbacks use it to
//! call the closures registered on the proxy.
//!
//! ```text
//! Node / Config ──owns──▶ NativeHandle ──raw handle──▶ native engine ──▶ taffy
//!       ▲                                                   │
//!       └──── ContextRegistry ◀── context token ◀───────────┘
//! ```
//!
//! Everything is thread-confined: each thread has its own engine and its own
//! shared default config, and proxies are `!Send`.
//!
//! ## Errors
//!
//! Engine log messages at `Error` or `Fatal` level are delivered to the
//! config's logger and then returned as [`Error::LogEscalation`] from the
//! operation that caused them.
//!
//! ## Modules
//!
//! - [`types`] - Style enums, measure modes, log levels, print options
//! - [`value`] - Unit-tagged style values
//! - [`native`] - The layout engine behind the proxies

mod bridge;
mod config;
mod context;
mod error;
mod handle;
pub mod native;
mod node;
pub mod types;
pub mod value;

pub use config::{Config, Logger};
pub use error::{Error, Result};
pub use node::{BaselineFunction, MeasureFunction, Node};
pub use types::*;
pub use value::{is_undefined, Value, UNDEFINED};
