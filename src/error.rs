//! Error types for proxy and engine operations.

use thiserror::Error;

use crate::types::LogLevel;

/// Errors surfaced by node and config operations.
///
/// Nothing is retried internally; every error reaches the caller of the
/// operation that triggered it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The engine could not produce a resource.
    #[error("failed to allocate native {kind}")]
    Allocation {
        /// Resource kind ("node" or "config").
        kind: &'static str,
    },

    /// A context link resolved to a proxy that no longer exists.
    #[error("{kind} is already deallocated")]
    StaleReference {
        /// Resource kind ("node" or "config").
        kind: &'static str,
    },

    /// The engine invoked a callback on a node that never registered one.
    #[error("{callback} function is not defined")]
    CallbackContract {
        /// Callback name ("measure" or "baseline").
        callback: &'static str,
    },

    /// An `Error` or `Fatal` log message aborted the current operation.
    #[error("{level:?}: {message}")]
    LogEscalation {
        /// Severity of the message.
        level: LogLevel,
        /// The message as delivered to the logger.
        message: String,
    },

    /// A child index was outside the node's child list.
    #[error("child index {index} out of range for {count} children")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current child count.
        count: usize,
    },
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::Allocation { kind: "node" }.to_string(),
            "failed to allocate native node"
        );
        assert_eq!(
            Error::StaleReference { kind: "config" }.to_string(),
            "config is already deallocated"
        );
        assert_eq!(
            Error::CallbackContract { callback: "measure" }.to_string(),
            "measure function is not defined"
        );
        let escalated = Error::LogEscalation { level: LogLevel::Fatal, message: "boom".into() };
        assert_eq!(escalated.to_string(), "Fatal: boom");
    }
}
