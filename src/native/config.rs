//! Config entry points: lifecycle, context slot and settings.

use super::state::{try_with_state, with_state, NativeConfig};
use super::RawConfig;
use crate::types::{ExperimentalFeature, ExperimentalFeatures};

// =============================================================================
// Lifecycle
// =============================================================================

pub fn config_new() -> RawConfig {
    let raw = with_state(|state| {
        let raw = RawConfig(state.allocate_handle());
        state.configs.insert(raw, NativeConfig::default());
        raw
    });
    log::trace!(target: "arrange", "config {} allocated", raw.0);
    raw
}

/// Free a config. Nodes created with it keep working with default settings.
///
/// Freeing the shared default makes the next [`config_get_default`] create a
/// new one.
pub fn config_free(raw: RawConfig) {
    try_with_state(|state| {
        if state.configs.remove(&raw).is_some() && state.default_config == raw {
            state.default_config = RawConfig::NULL;
        }
    });
}

/// The engine's shared default config, created on first use.
pub fn config_get_default() -> RawConfig {
    with_state(|state| {
        if state.default_config.is_null() {
            let raw = RawConfig(state.allocate_handle());
            state.configs.insert(raw, NativeConfig::default());
            state.default_config = raw;
        }
        state.default_config
    })
}

/// Number of live configs on this thread's engine, the default included.
pub fn config_instance_count() -> usize {
    with_state(|state| state.configs.len())
}

// =============================================================================
// Context Slot
// =============================================================================

pub fn config_set_context(raw: RawConfig, context: u64) {
    try_with_state(|state| {
        if let Some(config) = state.configs.get_mut(&raw) {
            config.context = context;
        }
    });
}

pub fn config_get_context(raw: RawConfig) -> u64 {
    try_with_state(|state| state.configs.get(&raw).map(|config| config.context))
        .flatten()
        .unwrap_or(0)
}

// =============================================================================
// Settings
// =============================================================================

fn update(raw: RawConfig, f: impl FnOnce(&mut NativeConfig)) {
    with_state(|state| {
        if let Some(config) = state.configs.get_mut(&raw) {
            f(config);
        }
    });
}

fn read<R: Default>(raw: RawConfig, f: impl FnOnce(&NativeConfig) -> R) -> R {
    with_state(|state| state.configs.get(&raw).map(f).unwrap_or_default())
}

pub fn config_set_experimental_feature_enabled(
    raw: RawConfig,
    feature: ExperimentalFeature,
    enabled: bool,
) {
    update(raw, |config| config.experimental.set(ExperimentalFeatures::from(feature), enabled));
}

pub fn config_is_experimental_feature_enabled(
    raw: RawConfig,
    feature: ExperimentalFeature,
) -> bool {
    read(raw, |config| config.experimental.contains(ExperimentalFeatures::from(feature)))
}

/// Web defaults apply to nodes created after the change.
pub fn config_set_use_web_defaults(raw: RawConfig, enabled: bool) {
    update(raw, |config| config.use_web_defaults = enabled);
}

pub fn config_get_use_web_defaults(raw: RawConfig) -> bool {
    read(raw, |config| config.use_web_defaults)
}

pub fn config_set_use_legacy_stretch_behaviour(raw: RawConfig, enabled: bool) {
    update(raw, |config| config.use_legacy_stretch = enabled);
}

pub fn config_get_use_legacy_stretch_behaviour(raw: RawConfig) -> bool {
    read(raw, |config| config.use_legacy_stretch)
}

/// Layout values are rounded to multiples of `1 / factor`; 0 disables rounding.
pub fn config_set_point_scale_factor(raw: RawConfig, factor: f32) {
    // Negative or NaN factors make no sense as a grid
    let factor = if factor.is_finite() && factor > 0.0 { factor } else { 0.0 };
    update(raw, |config| config.point_scale_factor = factor);
}

pub fn config_get_point_scale_factor(raw: RawConfig) -> f32 {
    with_state(|state| state.configs.get(&raw).map_or(1.0, |config| config.point_scale_factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lazy_and_stable() {
        let first = config_get_default();
        assert!(!first.is_null());
        assert_eq!(config_get_default(), first);
    }

    #[test]
    fn test_instance_count() {
        config_get_default();
        let before = config_instance_count();
        let raw = config_new();
        assert_eq!(config_instance_count(), before + 1);
        config_free(raw);
        assert_eq!(config_instance_count(), before);
    }

    #[test]
    fn test_settings() {
        let raw = config_new();
        assert!(!config_is_experimental_feature_enabled(raw, ExperimentalFeature::WebFlexBasis));
        config_set_experimental_feature_enabled(raw, ExperimentalFeature::WebFlexBasis, true);
        assert!(config_is_experimental_feature_enabled(raw, ExperimentalFeature::WebFlexBasis));

        config_set_use_web_defaults(raw, true);
        assert!(config_get_use_web_defaults(raw));
        config_set_use_legacy_stretch_behaviour(raw, true);
        assert!(config_get_use_legacy_stretch_behaviour(raw));

        assert_eq!(config_get_point_scale_factor(raw), 1.0);
        config_set_point_scale_factor(raw, 2.0);
        assert_eq!(config_get_point_scale_factor(raw), 2.0);
        config_set_point_scale_factor(raw, -1.0);
        assert_eq!(config_get_point_scale_factor(raw), 0.0);
        config_free(raw);
    }

    #[test]
    fn test_context_slot() {
        let raw = config_new();
        assert_eq!(config_get_context(raw), 0);
        config_set_context(raw, 42);
        assert_eq!(config_get_context(raw), 42);
        config_free(raw);
        assert_eq!(config_get_context(raw), 0);
    }
}
