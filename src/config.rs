//! Config - engine-wide settings and the logger.
//!
//! Every thread has one shared default config, created on first use and bound
//! to the engine's default config. Its creation installs the log trampoline as
//! the engine's logger callback, so every engine message is routed to the
//! logger of the config it belongs to.
//!
//! ```ignore
//! let config = Config::new()?;
//! config.set_point_scale_factor(2.0);
//! config.set_logger(|_config, _node, level, message| eprintln!("{level:?}: {message}"));
//!
//! let root = Node::with_config(&config)?;
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::thread::LocalKey;

use crate::bridge;
use crate::context::ContextRegistry;
use crate::error::Result;
use crate::handle::{NativeHandle, ResourceKind};
use crate::native::{self, RawConfig};
use crate::node::Node;
use crate::types::{ExperimentalFeature, LogLevel};

/// Logger attached to a config: `(config, node, level, message)`.
pub type Logger = Rc<dyn Fn(&Config, Option<&Node>, LogLevel, &str)>;

// =============================================================================
// Resource Kind
// =============================================================================

thread_local! {
    static CONFIG_CONTEXTS: RefCell<ContextRegistry<ConfigInner>> =
        const { RefCell::new(ContextRegistry::new()) };

    static DEFAULT_CONFIG: RefCell<Option<Config>> = const { RefCell::new(None) };
}

pub(crate) struct ConfigKind;

impl ResourceKind for ConfigKind {
    type Raw = RawConfig;
    type Proxy = ConfigInner;

    const NAME: &'static str = "config";
    const NULL: RawConfig = RawConfig::NULL;

    fn free(raw: RawConfig) {
        native::config_free(raw);
    }

    fn set_native_context(raw: RawConfig, token: u64) {
        native::config_set_context(raw, token);
    }

    fn native_context(raw: RawConfig) -> u64 {
        native::config_get_context(raw)
    }

    fn registry() -> &'static LocalKey<RefCell<ContextRegistry<ConfigInner>>> {
        &CONFIG_CONTEXTS
    }
}

pub(crate) type ConfigHandle = NativeHandle<ConfigKind>;

// =============================================================================
// Config
// =============================================================================

pub(crate) struct ConfigInner {
    handle: ConfigHandle,
    logger: RefCell<Option<Logger>>,
}

/// Engine settings shared by the nodes created with them.
///
/// Cloning is cheap and yields the same config.
#[derive(Clone)]
pub struct Config {
    inner: Rc<ConfigInner>,
}

impl Config {
    /// Create a config with default settings.
    pub fn new() -> Result<Self> {
        bridge::install();
        let handle = ConfigHandle::acquire(native::config_new())?;
        Ok(Self::link(handle))
    }

    /// The shared default config of this thread.
    pub fn shared() -> Self {
        DEFAULT_CONFIG
            .with(|default| default.borrow_mut().get_or_insert_with(Self::create_shared).clone())
    }

    fn create_shared() -> Self {
        bridge::install();
        log::debug!(target: "arrange", "creating shared default config");
        Self::link(ConfigHandle::shared(native::config_get_default()))
    }

    fn link(handle: ConfigHandle) -> Self {
        let inner = Rc::new(ConfigInner { handle, logger: RefCell::new(None) });
        inner.handle.set_context(Rc::downgrade(&inner));
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<ConfigInner>) -> Self {
        Self { inner }
    }

    /// Assign a logger to the shared default config.
    pub fn set_default_logger<F>(logger: F)
    where
        F: Fn(&Config, Option<&Node>, LogLevel, &str) + 'static,
    {
        Self::shared().set_logger(logger);
    }

    /// Number of live engine configs on this thread, the default included.
    pub fn instance_count() -> usize {
        native::config_instance_count()
    }

    /// Raw engine handle.
    #[inline]
    pub fn raw(&self) -> RawConfig {
        self.inner.handle.raw()
    }

    /// Whether this is the shared default.
    pub fn is_shared(&self) -> bool {
        self.inner.handle.is_shared()
    }

    // -------------------------------------------------------------------------
    // Logger
    // -------------------------------------------------------------------------

    pub fn set_logger<F>(&self, logger: F)
    where
        F: Fn(&Config, Option<&Node>, LogLevel, &str) + 'static,
    {
        let logger: Logger = Rc::new(logger);
        self.replace_logger(Some(logger));
    }

    pub fn clear_logger(&self) {
        self.replace_logger(None);
    }

    pub fn logger(&self) -> Option<Logger> {
        self.inner.logger.borrow().clone()
    }

    pub(crate) fn replace_logger(&self, logger: Option<Logger>) -> Option<Logger> {
        self.inner.logger.replace(logger)
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub fn set_experimental_feature_enabled(&self, feature: ExperimentalFeature, enabled: bool) {
        native::config_set_experimental_feature_enabled(self.raw(), feature, enabled);
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> bool {
        native::config_is_experimental_feature_enabled(self.raw(), feature)
    }

    /// Web defaults (row direction, shrink 1, stretch content) for nodes
    /// created after this call.
    pub fn use_web_defaults(&self) -> bool {
        native::config_get_use_web_defaults(self.raw())
    }

    pub fn set_use_web_defaults(&self, enabled: bool) {
        native::config_set_use_web_defaults(self.raw(), enabled);
    }

    pub fn use_legacy_stretch_behaviour(&self) -> bool {
        native::config_get_use_legacy_stretch_behaviour(self.raw())
    }

    pub fn set_use_legacy_stretch_behaviour(&self, enabled: bool) {
        native::config_set_use_legacy_stretch_behaviour(self.raw(), enabled);
    }

    pub fn point_scale_factor(&self) -> f32 {
        native::config_get_point_scale_factor(self.raw())
    }

    /// Round layout results to multiples of `1 / factor`. 0 disables rounding.
    pub fn set_point_scale_factor(&self, factor: f32) {
        native::config_set_point_scale_factor(self.raw(), factor);
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Config {}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("handle", &self.inner.handle)
            .field("has_logger", &self.inner.logger.borrow().is_some())
            .finish()
    }
}
