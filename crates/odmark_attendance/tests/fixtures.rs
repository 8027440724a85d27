//! Test fixtures for attendance API tests.
//!
//! Provides a router over an in-memory store plus static identities for
//! two clubs.

use axum::Router;
use odmark_attendance::auth::StaticTokenProvider;
use odmark_config::{
    AppConfig, AuthConfig, InstitutionConfig, ScannerConfig, ServerConfig, StaticToken,
};
use odmark_store::MemoryDocumentStore;
use std::sync::Arc;

pub const TECHSPARK_TOKEN: &str = "techspark-token";
pub const TECHSPARK_EMAIL: &str = "techspark@ritchennai.edu.in";
pub const ASTRA_TOKEN: &str = "astra-token";
pub const ASTRA_EMAIL: &str = "astra@ritchennai.edu.in";

/// Creates a test AppConfig with two known club identities.
pub fn create_test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        institution: InstitutionConfig {
            name: Some("RIT Chennai".to_string()),
            email_domain: "ritchennai.edu.in".to_string(),
        },
        use_firestore: false,
        firestore: None,
        scanner: ScannerConfig::default(),
        auth: AuthConfig {
            static_tokens: vec![
                StaticToken {
                    token: TECHSPARK_TOKEN.to_string(),
                    email: TECHSPARK_EMAIL.to_string(),
                    display_name: Some("Techspark".to_string()),
                },
                StaticToken {
                    token: ASTRA_TOKEN.to_string(),
                    email: ASTRA_EMAIL.to_string(),
                    display_name: Some("Astra".to_string()),
                },
            ],
        },
    })
}

/// Builds the attendance router over a fresh in-memory store.
pub fn build_test_router() -> (Router, Arc<MemoryDocumentStore>) {
    let config = create_test_config();
    let store = Arc::new(MemoryDocumentStore::new());
    let provider = Arc::new(StaticTokenProvider::new(&config.auth));
    let router = odmark_attendance::routes(config, store.clone(), provider);
    (router, store)
}
