// --- File: crates/odmark_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the external services the
//! application is composed over: the document store that holds events and
//! attendance, the identity provider that authenticates clubs, and the
//! platform haptic feedback capability. These traits allow for dependency
//! injection and easier testing by decoupling the application logic from
//! specific implementations.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A filter applied to a collection query.
///
/// The application only ever filters on top-level field equality (events
/// owned by a club), so the filter language stays deliberately small.
#[derive(Debug, Clone)]
pub enum QueryFilter {
    /// Every document in the collection.
    All,
    /// Documents whose `field` equals `value`.
    FieldEquals {
        field: String,
        value: serde_json::Value,
    },
}

/// A document returned from a collection query: its key plus its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub key: String,
    pub value: serde_json::Value,
}

/// A change notification emitted by a collection watch.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    pub collection: String,
    pub key: String,
    pub value: serde_json::Value,
}

/// A trait for document store operations.
///
/// This trait defines the operations the application performs against its
/// document database: keyed reads, idempotent upserts, filtered collection
/// queries and a change subscription. Writes to an existing key replace the
/// document as a whole; callers rely on this for idempotent re-marking.
pub trait DocumentStore: Send + Sync {
    /// Error type returned by document store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a single document by collection and key.
    fn get(
        &self,
        collection: &str,
        key: &str,
    ) -> BoxFuture<'_, Option<serde_json::Value>, Self::Error>;

    /// Idempotent upsert of a single document.
    fn set(
        &self,
        collection: &str,
        key: &str,
        value: serde_json::Value,
    ) -> BoxFuture<'_, (), Self::Error>;

    /// Query a collection with a filter.
    fn query(
        &self,
        collection: &str,
        filter: QueryFilter,
    ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error>;

    /// Delete a single document. Returns whether a document existed.
    fn delete(&self, collection: &str, key: &str) -> BoxFuture<'_, bool, Self::Error>;

    /// Subscribe to changes in a collection.
    ///
    /// Used by roster and dashboard views; the scan core itself only uses
    /// `get`/`set`/`query`. Backends without a streaming API may reject
    /// this with an error.
    fn watch(
        &self,
        collection: &str,
    ) -> BoxFuture<'_, broadcast::Receiver<DocumentChange>, Self::Error>;
}

/// The authenticated identity of the caller, as supplied by the identity
/// provider. The email decides which club's events are visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub display_name: Option<String>,
}

/// A trait for identity provider operations.
///
/// This trait defines the single operation the application needs from its
/// authentication collaborator: resolving a bearer token to an identity.
pub trait IdentityProvider: Send + Sync {
    /// Error type returned by identity provider operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve a bearer token to the identity it belongs to.
    fn verify_token(&self, token: &str) -> BoxFuture<'_, Identity, Self::Error>;
}

/// A trait for platform haptic feedback.
///
/// Best-effort: callers presence-check the service and ignore pulse
/// failures.
pub trait Haptics: Send + Sync {
    /// Error type returned by haptics operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Trigger a vibration pulse of the given duration.
    fn pulse(&self, duration_ms: u64) -> BoxFuture<'_, (), Self::Error>;
}

/// A factory for creating service instances.
///
/// This trait provides methods for accessing the external services the
/// application needs. A `None` return means the capability is absent in
/// this deployment (e.g. no haptics hardware), not an error.
pub trait ServiceFactory: Send + Sync {
    /// Get the document store instance.
    fn document_store(&self) -> Option<Arc<dyn DocumentStore<Error = BoxedError>>>;

    /// Get the identity provider instance.
    fn identity_provider(&self) -> Option<Arc<dyn IdentityProvider<Error = BoxedError>>>;

    /// Get the haptic feedback instance.
    fn haptics(&self) -> Option<Arc<dyn Haptics<Error = BoxedError>>>;
}
