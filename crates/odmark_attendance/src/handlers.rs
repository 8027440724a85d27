// --- File: crates/odmark_attendance/src/handlers.rs ---
use crate::events::{CreateEventRequest, EventDirectory};
use crate::logic::{AttendanceError, AttendanceRecorder, MarkOutcome};
use crate::models::{AttendanceRecord, EventRecord};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use odmark_common::services::Identity;
use odmark_common::{HttpStatusCode, OdmarkError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

// Shared state needed by the attendance handlers
#[derive(Clone)]
pub struct AttendanceState {
    pub recorder: Arc<AttendanceRecorder>,
    pub directory: Arc<EventDirectory>,
}

/// Request body for the scan endpoint: the selected event plus the raw
/// decoded payload.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScanRequest {
    pub event_id: String,
    /// Raw decoded text; normalized (trim + uppercase) before marking.
    pub reg_no: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScanResponse {
    /// "marked" or "already_marked".
    pub result: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecord>,
}

/// Map an internal error onto the response the scanning surface renders:
/// the status from the shared taxonomy, a message that never leaks store
/// internals.
fn error_response(context: &str, e: impl Into<OdmarkError>) -> (StatusCode, String) {
    let err: OdmarkError = e.into();
    error!(error = %err, "{context}");
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("{context}. Please try again."))
}

/// Handler marking one scanned registration number against an event.
#[axum::debug_handler]
pub async fn scan_handler(
    State(state): State<Arc<AttendanceState>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let event = state
        .directory
        .get_event(&request.event_id)
        .await
        .map_err(|e| error_response("Could not load event", e))?
        .ok_or((StatusCode::NOT_FOUND, "Event not found.".to_string()))?;

    // Only the club that owns the event marks attendance for it.
    if event.club_email != identity.email {
        return Err((
            StatusCode::FORBIDDEN,
            "This event belongs to another club.".to_string(),
        ));
    }

    match state.recorder.mark(&event, &request.reg_no).await {
        Ok(MarkOutcome::Marked(record)) => Ok(Json(ScanResponse {
            result: "marked".to_string(),
            message: format!("Success: {} Marked!", record.reg_no),
            record: Some(record),
        })),
        Ok(MarkOutcome::AlreadyMarked) => Ok(Json(ScanResponse {
            result: "already_marked".to_string(),
            message: "Attendance already marked for this event.".to_string(),
            record: None,
        })),
        Err(AttendanceError::EmptyRegNo) => Err((
            StatusCode::BAD_REQUEST,
            "Scanned code is not a registration number.".to_string(),
        )),
        Err(e) => {
            error!(error = %e, event_id = %event.id, "error marking attendance");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error marking attendance. Please try again.".to_string(),
            ))
        }
    }
}

/// Handler creating a new event for the calling club.
#[axum::debug_handler]
pub async fn create_event_handler(
    State(state): State<Arc<AttendanceState>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventRecord>), (StatusCode, String)> {
    if request.title.trim().is_empty() || request.venue.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Event title and venue are required.".to_string(),
        ));
    }
    let record = state
        .directory
        .create_event(&identity, request)
        .await
        .map_err(|e| error_response("Failed to create event", e))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler listing the calling club's events, newest first.
#[axum::debug_handler]
pub async fn list_events_handler(
    State(state): State<Arc<AttendanceState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<EventRecord>>, (StatusCode, String)> {
    let events = state
        .directory
        .list_events(&identity.email)
        .await
        .map_err(|e| error_response("Failed to list events", e))?;
    Ok(Json(events))
}

/// Handler deleting one of the calling club's events.
#[axum::debug_handler]
pub async fn delete_event_handler(
    State(state): State<Arc<AttendanceState>>,
    Extension(identity): Extension<Identity>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let event = state
        .directory
        .get_event(&event_id)
        .await
        .map_err(|e| error_response("Could not load event", e))?
        .ok_or((StatusCode::NOT_FOUND, "Event not found.".to_string()))?;
    if event.club_email != identity.email {
        return Err((
            StatusCode::FORBIDDEN,
            "This event belongs to another club.".to_string(),
        ));
    }

    state
        .directory
        .delete_event(&event_id)
        .await
        .map_err(|e| error_response("Failed to delete event", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler returning the attendance roster for an event, newest first.
#[axum::debug_handler]
pub async fn event_roster_handler(
    State(state): State<Arc<AttendanceState>>,
    Extension(identity): Extension<Identity>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, (StatusCode, String)> {
    let event = state
        .directory
        .get_event(&event_id)
        .await
        .map_err(|e| error_response("Could not load event", e))?
        .ok_or((StatusCode::NOT_FOUND, "Event not found.".to_string()))?;
    if event.club_email != identity.email {
        return Err((
            StatusCode::FORBIDDEN,
            "This event belongs to another club.".to_string(),
        ));
    }

    let roster = state
        .directory
        .event_roster(&event_id)
        .await
        .map_err(|e| error_response("Failed to load roster", e))?;
    Ok(Json(roster))
}

/// Handler returning a student's attendance history, newest first.
#[axum::debug_handler]
pub async fn student_history_handler(
    State(state): State<Arc<AttendanceState>>,
    Path(reg_no): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, (StatusCode, String)> {
    let history = state
        .directory
        .student_history(&reg_no)
        .await
        .map_err(|e| error_response("Failed to load attendance history", e))?;
    Ok(Json(history))
}
