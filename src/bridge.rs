//! Callback bridge - the engine-facing trampolines.
//!
//! The engine only knows raw handles and function pointers. Each trampoline
//! resolves the raw handle back to its proxy through the context link and
//! calls the closure registered on the proxy.
//!
//! Escalation: `Error` and `Fatal` log messages are delivered first, then
//! returned as [`Error::LogEscalation`] so the operation that caused them
//! aborts.

use crate::config::{Config, ConfigHandle};
use crate::error::{Error, Result};
use crate::native::{self, RawConfig, RawNode};
use crate::node::{Node, NodeHandle};
use crate::types::{LogLevel, MeasureMode, Size};

/// Route every engine log message through [`dispatch_log`].
pub(crate) fn install() {
    native::set_logger(Some(dispatch_log));
}

fn resolve_node(raw: RawNode, callback: &'static str) -> Result<Node> {
    NodeHandle::get_context(raw)?
        .map(Node::from_inner)
        .ok_or(Error::CallbackContract { callback })
}

pub(crate) fn measure_trampoline(
    raw: RawNode,
    width: f32,
    width_mode: MeasureMode,
    height: f32,
    height_mode: MeasureMode,
) -> Result<Size> {
    let node = resolve_node(raw, "measure")?;
    let measure = node.measure_function().ok_or(Error::CallbackContract { callback: "measure" })?;
    Ok(measure(&node, width, width_mode, height, height_mode))
}

pub(crate) fn baseline_trampoline(raw: RawNode, width: f32, height: f32) -> Result<f32> {
    let node = resolve_node(raw, "baseline")?;
    let baseline =
        node.baseline_function().ok_or(Error::CallbackContract { callback: "baseline" })?;
    Ok(baseline(&node, width, height))
}

/// Engine logger callback.
///
/// Messages for a config without a logger (or without a linked proxy) go to
/// the `log` crate under the `arrange` target. A link whose proxy is gone
/// fails with [`Error::StaleReference`] before anything is delivered.
pub(crate) fn dispatch_log(
    config: RawConfig,
    node: RawNode,
    level: LogLevel,
    message: &str,
) -> Result<()> {
    let config = ConfigHandle::get_context(config)?.map(Config::from_inner);

    match config.as_ref().and_then(|config| config.logger().map(|logger| (config, logger))) {
        Some((config, logger)) => {
            let node = NodeHandle::get_context(node)?.map(Node::from_inner);
            logger(config, node.as_ref(), level, message);
        }
        None => log::log!(target: "arrange", log::Level::from(level), "{message}"),
    }

    if level.escalates() {
        return Err(Error::LogEscalation { level, message: message.to_owned() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_measure_without_function_is_contract_error() {
        let node = Node::new().unwrap();
        assert_eq!(
            measure_trampoline(node.raw(), 1.0, MeasureMode::Exactly, 1.0, MeasureMode::Exactly),
            Err(Error::CallbackContract { callback: "measure" })
        );
        assert_eq!(
            baseline_trampoline(node.raw(), 1.0, 1.0),
            Err(Error::CallbackContract { callback: "baseline" })
        );
    }

    #[test]
    fn test_unlinked_node_is_contract_error() {
        let raw = native::node_new();
        assert_eq!(
            measure_trampoline(raw, 1.0, MeasureMode::Undefined, 1.0, MeasureMode::Undefined),
            Err(Error::CallbackContract { callback: "measure" })
        );
        native::node_free(raw);
    }

    #[test]
    fn test_measure_result_is_verbatim() {
        let node = Node::new().unwrap();
        node.set_measure_function(|_, width, _, _, _| Size::new(width * 2.0, 3.0)).unwrap();
        assert_eq!(
            measure_trampoline(node.raw(), 4.0, MeasureMode::AtMost, 0.0, MeasureMode::Undefined),
            Ok(Size::new(8.0, 3.0))
        );
    }

    #[test]
    fn test_log_delivered_then_escalated() {
        let config = Config::new().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        config.set_logger(move |_, node, level, message| {
            sink.borrow_mut().push((level, message.to_owned(), node.is_some()));
        });

        assert!(dispatch_log(config.raw(), RawNode::NULL, LogLevel::Warn, "soft").is_ok());
        assert_eq!(
            dispatch_log(config.raw(), RawNode::NULL, LogLevel::Fatal, "hard"),
            Err(Error::LogEscalation { level: LogLevel::Fatal, message: "hard".into() })
        );
        assert_eq!(
            seen.borrow().as_slice(),
            &[
                (LogLevel::Warn, "soft".to_owned(), false),
                (LogLevel::Fatal, "hard".to_owned(), false),
            ]
        );
    }

    #[test]
    fn test_stale_config_link_is_reported() {
        let config = Config::new().unwrap();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        config.set_logger(move |_, _, _, _| *counter.borrow_mut() += 1);

        let dropped = Config::new().unwrap();
        let stale = native::config_get_context(dropped.raw());
        drop(dropped);
        native::config_set_context(config.raw(), stale);

        let node = Node::with_config(&config).unwrap();
        assert_eq!(node.mark_dirty(), Err(Error::StaleReference { kind: "config" }));
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_stale_node_link_is_reported() {
        let node = Node::new().unwrap();
        node.set_measure_function(|_, _, _, _, _| Size::ZERO).unwrap();

        let dropped = Node::new().unwrap();
        let stale = native::node_get_context(dropped.raw());
        drop(dropped);
        native::node_set_context(node.raw(), stale);

        assert_eq!(
            measure_trampoline(node.raw(), 1.0, MeasureMode::Exactly, 1.0, MeasureMode::Exactly),
            Err(Error::StaleReference { kind: "node" })
        );
    }

    #[test]
    fn test_malformed_node_link_is_reported() {
        let node = Node::new().unwrap();
        native::node_set_context(node.raw(), 1 << 32);
        assert_eq!(
            measure_trampoline(node.raw(), 1.0, MeasureMode::Exactly, 1.0, MeasureMode::Exactly),
            Err(Error::StaleReference { kind: "node" })
        );
    }

    #[test]
    fn test_log_without_logger_still_escalates() {
        let config = Config::new().unwrap();
        assert!(dispatch_log(config.raw(), RawNode::NULL, LogLevel::Error, "lost").is_err());
        assert!(dispatch_log(RawConfig::NULL, RawNode::NULL, LogLevel::Info, "orphan").is_ok());
    }
}
