//! Store backend selection.
//!
//! Picks the document store backend from the runtime configuration:
//! Firestore when `use_firestore` is set and its config section is present,
//! the in-memory store otherwise.

use crate::firestore::FirestoreStore;
use crate::memory::MemoryDocumentStore;
use odmark_common::is_firestore_enabled;
use odmark_common::services::{BoxedError, DocumentStore};
use odmark_config::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Create the document store backend for this deployment.
pub fn create_document_store(config: &Arc<AppConfig>) -> Arc<dyn DocumentStore<Error = BoxedError>> {
    if is_firestore_enabled(config) {
        // is_firestore_enabled guarantees the section is present
        let firestore_config = config.firestore.clone().unwrap();
        info!("Using Firestore document store backend");
        Arc::new(FirestoreStore::new(firestore_config))
    } else {
        info!("Using in-memory document store backend");
        Arc::new(MemoryDocumentStore::new())
    }
}
