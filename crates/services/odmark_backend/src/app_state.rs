// --- File: crates/services/odmark_backend/src/app_state.rs ---
use crate::service_factory::OdmarkServiceFactory;
use odmark_common::services::ServiceFactory;
use odmark_config::AppConfig;
use std::sync::Arc;

/// Application state shared across the service.
///
/// Central composition point for configuration and the service factory,
/// following the dependency injection pattern: state is built once at
/// startup and handed down explicitly, never read from an ambient
/// singleton.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration loaded at startup.
    pub config: Arc<AppConfig>,

    /// Service factory for accessing external services.
    pub service_factory: Arc<dyn ServiceFactory>,
}

impl AppState {
    /// Create a new AppState with the given configuration.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let service_factory = Arc::new(OdmarkServiceFactory::new(config.clone()));
        Self {
            config,
            service_factory,
        }
    }
}
