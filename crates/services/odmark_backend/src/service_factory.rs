// --- File: crates/services/odmark_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! This module provides the ServiceFactory implementation for the backend
//! service: the document store backend picked from config, the identity
//! provider, and (on this headless deployment) no haptics.

use odmark_attendance::auth::StaticTokenProvider;
use odmark_common::services::{
    BoxedError, DocumentStore, Haptics, IdentityProvider, ServiceFactory,
};
use odmark_config::AppConfig;
use std::sync::Arc;

/// Service factory for the backend service.
///
/// Initializes services once at startup based on the application
/// configuration and hands them out through the trait methods.
pub struct OdmarkServiceFactory {
    document_store: Arc<dyn DocumentStore<Error = BoxedError>>,
    identity_provider: Arc<dyn IdentityProvider<Error = BoxedError>>,
}

impl OdmarkServiceFactory {
    /// Create a new service factory.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let document_store = odmark_store::create_document_store(&config);
        let identity_provider = Arc::new(StaticTokenProvider::new(&config.auth));

        Self {
            document_store,
            identity_provider,
        }
    }
}

impl ServiceFactory for OdmarkServiceFactory {
    fn document_store(&self) -> Option<Arc<dyn DocumentStore<Error = BoxedError>>> {
        Some(self.document_store.clone())
    }

    fn identity_provider(&self) -> Option<Arc<dyn IdentityProvider<Error = BoxedError>>> {
        Some(self.identity_provider.clone())
    }

    fn haptics(&self) -> Option<Arc<dyn Haptics<Error = BoxedError>>> {
        // The backend runs headless; haptic feedback exists only on
        // scanning devices.
        None
    }
}
