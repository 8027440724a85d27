//! Firestore REST document store backend.
//!
//! This module provides a `DocumentStore` implementation over the Firestore
//! REST API (`documents` get/patch/delete plus `:runQuery`). Documents are
//! translated between plain JSON values and Firestore's typed field format.
//!
//! The REST surface has no streaming listen (that is gRPC-only), so
//! `watch()` is rejected by this backend; deployments that need live
//! rosters run against it with polling queries.

use crate::auth::get_firestore_auth_token;
use odmark_common::services::{
    BoxFuture, BoxedError, DocumentChange, DocumentStore, QueryFilter, StoredDocument,
};
use odmark_config::FirestoreConfig;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors that can occur when interacting with the Firestore REST API
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Error during authentication with Google
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to the Firestore API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by the Firestore API
    #[error("Firestore API error: {0}")]
    ApiError(String),

    /// A document could not be translated from Firestore's field format
    #[error("Failed to decode document: {0}")]
    DecodeError(String),

    /// The operation is not available over the REST surface
    #[error("Operation not supported by the Firestore REST backend: {0}")]
    Unsupported(String),
}

/// A Firestore document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryResult {
    document: Option<FirestoreDocument>,
}

/// Client for the Firestore REST API implementing `DocumentStore`.
pub struct FirestoreStore {
    /// HTTP client for making requests to the Firestore API
    client: Client,

    /// Configuration, including project ID and service account key path
    config: FirestoreConfig,

    /// API base URL; overridable so tests can point at a local mock server
    base_url: String,
}

impl FirestoreStore {
    /// Creates a new Firestore store with the given configuration
    pub fn new(config: FirestoreConfig) -> Self {
        Self::with_base_url(config, "https://firestore.googleapis.com/v1".to_string())
    }

    /// Creates a new Firestore store against a specific API base URL
    pub fn with_base_url(config: FirestoreConfig, base_url: String) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }

    fn project_id(&self) -> Result<&str, FirestoreError> {
        self.config.project_id.as_deref().ok_or_else(|| {
            FirestoreError::ConfigError("Missing project_id in FirestoreConfig".to_string())
        })
    }

    fn documents_root(&self) -> Result<String, FirestoreError> {
        Ok(format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url,
            self.project_id()?
        ))
    }

    async fn bearer_token(&self) -> Result<String, FirestoreError> {
        get_firestore_auth_token(&self.config)
            .await
            .map_err(|e| FirestoreError::AuthError(e.to_string()))
    }

    async fn get_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Value>, FirestoreError> {
        let url = format!("{}/{}/{}", self.documents_root()?, collection, key);
        let token = self.bearer_token().await?;

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FirestoreError::ApiError(error_text));
        }

        let doc: FirestoreDocument = response.json().await?;
        Ok(Some(decode_fields(&doc.fields)?))
    }

    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        value: &Value,
    ) -> Result<(), FirestoreError> {
        let url = format!("{}/{}/{}", self.documents_root()?, collection, key);
        let token = self.bearer_token().await?;

        let body = json!({ "fields": encode_fields(value)? });
        let response = self
            .client
            .patch(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FirestoreError::ApiError(error_text));
        }
        Ok(())
    }

    async fn run_query(
        &self,
        collection: &str,
        filter: &QueryFilter,
    ) -> Result<Vec<StoredDocument>, FirestoreError> {
        // The last path segment is the collection id; anything before it is
        // the parent document path (subcollections like
        // events/{id}/attendance).
        let (parent_path, collection_id) = match collection.rsplit_once('/') {
            Some((parent, id)) => (format!("/{}", parent), id),
            None => (String::new(), collection),
        };
        let url = format!("{}{}:runQuery", self.documents_root()?, parent_path);
        let token = self.bearer_token().await?;

        let mut structured_query = json!({ "from": [{ "collectionId": collection_id }] });
        if let QueryFilter::FieldEquals { field, value } = filter {
            structured_query["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value)?,
                }
            });
        }

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&json!({ "structuredQuery": structured_query }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FirestoreError::ApiError(error_text));
        }

        let results: Vec<RunQueryResult> = response.json().await?;
        let mut documents = Vec::new();
        for result in results {
            // The final, cursor-only element of a runQuery response has no
            // document attached.
            let Some(doc) = result.document else { continue };
            let key = doc
                .name
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
            documents.push(StoredDocument {
                key,
                value: decode_fields(&doc.fields)?,
            });
        }
        Ok(documents)
    }

    async fn delete_document(&self, collection: &str, key: &str) -> Result<bool, FirestoreError> {
        // Read first so the caller learns whether anything existed; the
        // delete itself succeeds either way. The read/delete pair is not
        // atomic, which is acceptable for an administrative operation.
        let existed = self.get_document(collection, key).await?.is_some();

        let url = format!("{}/{}/{}", self.documents_root()?, collection, key);
        let token = self.bearer_token().await?;
        let response = self
            .client
            .delete(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FirestoreError::ApiError(error_text));
        }
        Ok(existed)
    }
}

impl DocumentStore for FirestoreStore {
    type Error = BoxedError;

    fn get(&self, collection: &str, key: &str) -> BoxFuture<'_, Option<Value>, Self::Error> {
        let collection = collection.to_string();
        let key = key.to_string();
        Box::pin(async move {
            self.get_document(&collection, &key)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn set(&self, collection: &str, key: &str, value: Value) -> BoxFuture<'_, (), Self::Error> {
        let collection = collection.to_string();
        let key = key.to_string();
        Box::pin(async move {
            self.set_document(&collection, &key, &value)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn query(
        &self,
        collection: &str,
        filter: QueryFilter,
    ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move {
            self.run_query(&collection, &filter)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn delete(&self, collection: &str, key: &str) -> BoxFuture<'_, bool, Self::Error> {
        let collection = collection.to_string();
        let key = key.to_string();
        Box::pin(async move {
            self.delete_document(&collection, &key)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn watch(
        &self,
        collection: &str,
    ) -> BoxFuture<'_, broadcast::Receiver<DocumentChange>, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move {
            Err(BoxedError(Box::new(FirestoreError::Unsupported(format!(
                "watch({})",
                collection
            )))))
        })
    }
}

// --- Value translation ---

/// Encode a plain JSON object into Firestore's typed field map.
fn encode_fields(value: &Value) -> Result<Map<String, Value>, FirestoreError> {
    let obj = value.as_object().ok_or_else(|| {
        FirestoreError::DecodeError("document root must be a JSON object".to_string())
    })?;
    let mut fields = Map::new();
    for (k, v) in obj {
        fields.insert(k.clone(), encode_value(v)?);
    }
    Ok(fields)
}

fn encode_value(value: &Value) -> Result<Value, FirestoreError> {
    Ok(match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore carries integers as decimal strings
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(encode_value(item)?);
            }
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value)? } }),
    })
}

/// Decode Firestore's typed field map back into a plain JSON object.
fn decode_fields(fields: &Map<String, Value>) -> Result<Value, FirestoreError> {
    let mut obj = Map::new();
    for (k, v) in fields {
        obj.insert(k.clone(), decode_value(v)?);
    }
    Ok(Value::Object(obj))
}

fn decode_value(value: &Value) -> Result<Value, FirestoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| FirestoreError::DecodeError(format!("expected typed value, got {value}")))?;

    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| FirestoreError::DecodeError("empty typed value".to_string()))?;

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.clone(),
        "integerValue" => {
            let raw = inner
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| inner.to_string());
            let parsed: i64 = raw
                .parse()
                .map_err(|_| FirestoreError::DecodeError(format!("bad integerValue: {raw}")))?;
            Value::from(parsed)
        }
        "doubleValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let mut decoded = Vec::with_capacity(items.len());
            for item in &items {
                decoded.push(decode_value(item)?);
            }
            Value::Array(decoded)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            decode_fields(&fields)?
        }
        other => {
            return Err(FirestoreError::DecodeError(format!(
                "unhandled value kind: {other}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip_preserves_scalars() {
        let doc = json!({
            "regNo": "CS101",
            "attempts": 3,
            "confidence": 0.5,
            "confirmed": true,
            "note": null,
            "tags": ["od", "event"],
            "nested": { "venue": "Main Hall" },
        });
        let fields = encode_fields(&doc).unwrap();
        assert_eq!(fields["attempts"], json!({ "integerValue": "3" }));
        assert_eq!(fields["regNo"], json!({ "stringValue": "CS101" }));

        let back = decode_fields(&fields).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        let fields = Map::from_iter([("x".to_string(), json!({ "geoPointValue": {} }))]);
        assert!(decode_fields(&fields).is_err());
    }
}
