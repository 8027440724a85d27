// --- File: crates/odmark_attendance/src/events.rs ---
//! Event management and roster reads.
//!
//! Clubs create and delete events and read attendance rosters; students
//! read their own history. All reads sort newest first, matching what the
//! dashboards render.

use crate::logic::normalize_reg_no;
use crate::models::{
    event_attendance_collection, student_attendance_collection, AttendanceRecord, EventRecord,
    EVENTS_COLLECTION,
};
use chrono::Utc;
use odmark_common::services::{BoxedError, DocumentStore, Identity, QueryFilter};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EventsError {
    #[error("store operation failed: {0}")]
    StoreError(#[source] BoxedError),
    #[error("failed to encode event: {0}")]
    EncodeError(#[from] serde_json::Error),
}

impl From<EventsError> for odmark_common::OdmarkError {
    fn from(err: EventsError) -> Self {
        match err {
            EventsError::StoreError(e) => odmark_common::OdmarkError::StoreError(e.to_string()),
            EventsError::EncodeError(e) => odmark_common::OdmarkError::ParseError(e.to_string()),
        }
    }
}

/// Request body for creating an event.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateEventRequest {
    pub title: String,
    /// Event date (YYYY-MM-DD).
    pub date: String,
    pub venue: String,
}

/// Club event catalogue over the document store.
pub struct EventDirectory {
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
}

impl EventDirectory {
    pub fn new(store: Arc<dyn DocumentStore<Error = BoxedError>>) -> Self {
        Self { store }
    }

    /// Create an event owned by the calling club.
    pub async fn create_event(
        &self,
        identity: &Identity,
        request: CreateEventRequest,
    ) -> Result<EventRecord, EventsError> {
        let record = EventRecord {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            date: request.date,
            venue: request.venue,
            club_email: identity.email.clone(),
            created_at: Utc::now(),
        };
        self.store
            .set(
                EVENTS_COLLECTION,
                &record.id,
                serde_json::to_value(&record)?,
            )
            .await
            .map_err(EventsError::StoreError)?;
        info!(event_id = %record.id, club = %record.club_email, "event created");
        Ok(record)
    }

    /// Events owned by a club, newest first.
    pub async fn list_events(&self, club_email: &str) -> Result<Vec<EventRecord>, EventsError> {
        let documents = self
            .store
            .query(
                EVENTS_COLLECTION,
                QueryFilter::FieldEquals {
                    field: "clubEmail".to_string(),
                    value: json!(club_email),
                },
            )
            .await
            .map_err(EventsError::StoreError)?;

        let mut events = decode_documents::<EventRecord>(documents);
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>, EventsError> {
        let value = self
            .store
            .get(EVENTS_COLLECTION, event_id)
            .await
            .map_err(EventsError::StoreError)?;
        match value {
            Some(value) => Ok(serde_json::from_value(value).ok()),
            None => Ok(None),
        }
    }

    /// Delete an event document. Attendance records are never deleted by
    /// this subsystem; the event's attendance collection stays behind the
    /// deleted event, as it does in the deployed database.
    pub async fn delete_event(&self, event_id: &str) -> Result<bool, EventsError> {
        self.store
            .delete(EVENTS_COLLECTION, event_id)
            .await
            .map_err(EventsError::StoreError)
    }

    /// Attendance for an event, newest first.
    pub async fn event_roster(&self, event_id: &str) -> Result<Vec<AttendanceRecord>, EventsError> {
        let documents = self
            .store
            .query(&event_attendance_collection(event_id), QueryFilter::All)
            .await
            .map_err(EventsError::StoreError)?;

        let mut roster = decode_documents::<AttendanceRecord>(documents);
        roster.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(roster)
    }

    /// A student's attendance history, newest first.
    pub async fn student_history(
        &self,
        raw_reg_no: &str,
    ) -> Result<Vec<AttendanceRecord>, EventsError> {
        let reg_no = normalize_reg_no(raw_reg_no);
        let documents = self
            .store
            .query(&student_attendance_collection(&reg_no), QueryFilter::All)
            .await
            .map_err(EventsError::StoreError)?;

        let mut history = decode_documents::<AttendanceRecord>(documents);
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(history)
    }
}

/// Decode query results, skipping documents that no longer match the
/// model. A malformed document must not take a whole roster down.
fn decode_documents<T: serde::de::DeserializeOwned>(
    documents: Vec<odmark_common::services::StoredDocument>,
) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc.value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(key = %doc.key, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}
