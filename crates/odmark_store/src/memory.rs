//! In-memory document store.
//!
//! Process-local `DocumentStore` backend. It is the default backend when
//! Firestore is not configured and the backend every test runs against.
//! Collections are independent key/value maps; `set` is a whole-document
//! replace, matching the upsert semantics the attendance recorder relies
//! on for idempotent re-marking.

use odmark_common::services::{
    BoxFuture, BoxedError, DocumentChange, DocumentStore, QueryFilter, StoredDocument,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// In-memory implementation of the `DocumentStore` trait.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, serde_json::Value>>>,
    changes: broadcast::Sender<DocumentChange>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn read_locked(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, BTreeMap<String, serde_json::Value>>> {
        // Lock poisoning would mean a panic while holding the guard; there
        // is no recovery story for half-written state, so propagate.
        self.collections.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_locked(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, BTreeMap<String, serde_json::Value>>> {
        self.collections.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn matches(filter: &QueryFilter, value: &serde_json::Value) -> bool {
    match filter {
        QueryFilter::All => true,
        QueryFilter::FieldEquals { field, value: want } => value.get(field) == Some(want),
    }
}

impl DocumentStore for MemoryDocumentStore {
    type Error = BoxedError;

    fn get(
        &self,
        collection: &str,
        key: &str,
    ) -> BoxFuture<'_, Option<serde_json::Value>, Self::Error> {
        let collection = collection.to_string();
        let key = key.to_string();
        Box::pin(async move {
            let collections = self.read_locked();
            Ok(collections
                .get(&collection)
                .and_then(|docs| docs.get(&key))
                .cloned())
        })
    }

    fn set(
        &self,
        collection: &str,
        key: &str,
        value: serde_json::Value,
    ) -> BoxFuture<'_, (), Self::Error> {
        let collection = collection.to_string();
        let key = key.to_string();
        Box::pin(async move {
            {
                let mut collections = self.write_locked();
                collections
                    .entry(collection.clone())
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
            // Nobody listening is fine; watch() is optional.
            let _ = self.changes.send(DocumentChange {
                collection,
                key,
                value,
            });
            Ok(())
        })
    }

    fn query(
        &self,
        collection: &str,
        filter: QueryFilter,
    ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move {
            let collections = self.read_locked();
            let docs = collections
                .get(&collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|(_, value)| matches(&filter, value))
                        .map(|(key, value)| StoredDocument {
                            key: key.clone(),
                            value: value.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Ok(docs)
        })
    }

    fn delete(&self, collection: &str, key: &str) -> BoxFuture<'_, bool, Self::Error> {
        let collection = collection.to_string();
        let key = key.to_string();
        Box::pin(async move {
            let mut collections = self.write_locked();
            Ok(collections
                .get_mut(&collection)
                .map(|docs| docs.remove(&key).is_some())
                .unwrap_or(false))
        })
    }

    fn watch(
        &self,
        _collection: &str,
    ) -> BoxFuture<'_, broadcast::Receiver<DocumentChange>, Self::Error> {
        Box::pin(async move { Ok(self.changes.subscribe()) })
    }
}
