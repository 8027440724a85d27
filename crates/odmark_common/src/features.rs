//! Feature flag handling for the Odmark application.
//!
//! Feature flags are used in two ways:
//!
//! 1. Compile-time feature flags using `#[cfg(feature = "...")]` (the
//!    `openapi` documentation surface)
//! 2. Runtime flags using configuration values (`use_firestore` plus its
//!    config section)
//!
//! This module provides the helper for checking runtime flags.

use odmark_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime based on configuration.
///
/// A feature counts as enabled when its `use_*` flag is set and its config
/// section is present.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Firestore store backend is enabled at runtime.
pub fn is_firestore_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_firestore, config.firestore.as_ref())
}
