//! Engine diagnostics: the single logger slot and message emission.

use super::state::{try_with_state, with_state};
use super::{LogCallback, RawConfig, RawNode};
use crate::error::{Error, Result};
use crate::types::LogLevel;

/// One message produced by the engine.
#[derive(Debug, Clone)]
pub(crate) struct Diagnostic {
    pub config: RawConfig,
    pub node: RawNode,
    pub level: LogLevel,
    pub message: String,
}

impl Diagnostic {
    /// Message about a node, attributed to the node's config.
    pub fn for_node(node: RawNode, level: LogLevel, message: impl Into<String>) -> Self {
        let config = try_with_state(|state| {
            state.nodes.get(&node).map(|record| record.config).unwrap_or(state.default_config)
        })
        .unwrap_or(RawConfig::NULL);

        Self { config, node, level, message: message.into() }
    }
}

/// Install the engine-wide logger callback. `None` restores the built-in
/// channel, which forwards to the `log` crate.
pub fn set_logger(logger: Option<LogCallback>) {
    with_state(|state| state.logger = logger);
}

/// Deliver a diagnostic.
///
/// Must be called with no state borrow held: the logger may call back into
/// the engine. `Error` and `Fatal` messages abort the calling operation once
/// delivered.
pub(crate) fn emit(diagnostic: Diagnostic) -> Result<()> {
    let Diagnostic { config, node, level, message } = diagnostic;

    match try_with_state(|state| state.logger).flatten() {
        Some(logger) => logger(config, node, level, &message)?,
        None => log::log!(target: "arrange", log::Level::from(level), "{message}"),
    }

    if level.escalates() {
        return Err(Error::LogEscalation { level, message });
    }
    Ok(())
}

/// Emit a `Fatal` message about `node`. Always returns an error.
pub(crate) fn fatal(node: RawNode, message: &str) -> Result<()> {
    emit(Diagnostic::for_node(node, LogLevel::Fatal, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_without_logger() {
        set_logger(None);
        let result = emit(Diagnostic {
            config: RawConfig::NULL,
            node: RawNode::NULL,
            level: LogLevel::Fatal,
            message: "broken".into(),
        });
        assert_eq!(
            result,
            Err(Error::LogEscalation { level: LogLevel::Fatal, message: "broken".into() })
        );
    }

    #[test]
    fn test_warn_does_not_escalate() {
        set_logger(None);
        let result = emit(Diagnostic {
            config: RawConfig::NULL,
            node: RawNode::NULL,
            level: LogLevel::Warn,
            message: "careful".into(),
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_logger_receives_message() {
        use std::cell::RefCell;

        thread_local! {
            static SEEN: RefCell<Vec<(LogLevel, String)>> = const { RefCell::new(Vec::new()) };
        }
        fn record(_: RawConfig, _: RawNode, level: LogLevel, message: &str) -> Result<()> {
            SEEN.with(|seen| seen.borrow_mut().push((level, message.to_owned())));
            Ok(())
        }

        set_logger(Some(record));
        let result = emit(Diagnostic {
            config: RawConfig::NULL,
            node: RawNode::NULL,
            level: LogLevel::Error,
            message: "bad".into(),
        });
        set_logger(None);

        assert!(result.is_err());
        SEEN.with(|seen| {
            assert_eq!(seen.borrow().as_slice(), &[(LogLevel::Error, "bad".to_owned())]);
        });
    }
}
