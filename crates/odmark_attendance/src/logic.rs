// --- File: crates/odmark_attendance/src/logic.rs ---
//! Attendance marking.
//!
//! The recorder turns a decoded registration number plus a selected event
//! into the dual-write attendance record described in `models`. Ordering
//! of one marking operation: normalize, duplicate pre-check, best-effort
//! profile resolution, then the two writes.

use crate::models::{
    event_attendance_collection, student_attendance_collection, student_profile_collection,
    AttendanceRecord, AttendanceStatus, EventRecord, StudentProfile, PROFILE_DOC_KEY,
};
use chrono::Utc;
use odmark_common::services::{BoxedError, DocumentStore};
use odmark_config::InstitutionConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

// --- Error Handling ---
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// The decoded payload was empty after trimming.
    #[error("empty registration number")]
    EmptyRegNo,
    /// The duplicate pre-check could not read the store.
    #[error("attendance lookup failed: {0}")]
    LookupError(#[source] BoxedError),
    /// One of the two attendance writes failed. The scan must be retried
    /// by rescanning; the session itself is unaffected.
    #[error("attendance write failed: {0}")]
    WriteError(#[source] BoxedError),
    #[error("failed to encode attendance record: {0}")]
    EncodeError(#[from] serde_json::Error),
}

impl From<AttendanceError> for odmark_common::OdmarkError {
    fn from(err: AttendanceError) -> Self {
        match err {
            AttendanceError::EmptyRegNo => {
                odmark_common::OdmarkError::ValidationError(err.to_string())
            }
            AttendanceError::LookupError(e) | AttendanceError::WriteError(e) => {
                odmark_common::OdmarkError::StoreError(e.to_string())
            }
            AttendanceError::EncodeError(e) => {
                odmark_common::OdmarkError::ParseError(e.to_string())
            }
        }
    }
}

/// Outcome of a marking operation that completed.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkOutcome {
    /// A new record was written under both keys.
    Marked(AttendanceRecord),
    /// A record for this (event, regNo) already existed; nothing was
    /// written.
    AlreadyMarked,
}

/// Normalize a decoded registration number: trim and uppercase.
///
/// This is the only normalization applied. No format or checksum check is
/// performed on the identifier: any decoded string is accepted, which is
/// a known weak point of the scheme.
pub fn normalize_reg_no(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Fallback address for students without a stored profile, derived from
/// the registration number and the institutional mail domain.
pub fn synthesized_email(reg_no: &str, email_domain: &str) -> String {
    format!("{}@{}", reg_no.to_ascii_lowercase(), email_domain)
}

/// Records attendance against the document store.
pub struct AttendanceRecorder {
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
    email_domain: String,
}

impl AttendanceRecorder {
    pub fn new(
        store: Arc<dyn DocumentStore<Error = BoxedError>>,
        institution: &InstitutionConfig,
    ) -> Self {
        Self {
            store,
            email_domain: institution.email_domain.clone(),
        }
    }

    /// Mark `raw_reg_no` as attending `event`.
    ///
    /// At most one record exists per (event, regNo): a repeat scan is
    /// answered with `AlreadyMarked` by the pre-check and writes nothing.
    /// The two writes are not transactional; a failure between them can
    /// leave the event-scoped copy without its student-scoped twin until
    /// the student is rescanned. That window is an accepted limitation of
    /// the scheme, as is the race where two devices scanning the same
    /// registration number concurrently both pass the pre-check: the keys
    /// are the same, so the loser overwrites rather than duplicates, and
    /// which scan's profile data wins is not deterministic.
    pub async fn mark(
        &self,
        event: &EventRecord,
        raw_reg_no: &str,
    ) -> Result<MarkOutcome, AttendanceError> {
        let reg_no = normalize_reg_no(raw_reg_no);
        if reg_no.is_empty() {
            return Err(AttendanceError::EmptyRegNo);
        }

        let event_collection = event_attendance_collection(&event.id);
        let existing = self
            .store
            .get(&event_collection, &reg_no)
            .await
            .map_err(AttendanceError::LookupError)?;
        if existing.is_some() {
            debug!(%reg_no, event_id = %event.id, "repeat scan, attendance already marked");
            return Ok(MarkOutcome::AlreadyMarked);
        }

        let profile = self.resolve_profile(&reg_no).await;
        let record = AttendanceRecord {
            student_email: profile
                .as_ref()
                .and_then(|p| p.email.clone())
                .unwrap_or_else(|| synthesized_email(&reg_no, &self.email_domain)),
            student_name: profile.as_ref().and_then(|p| p.name.clone()),
            department: profile.and_then(|p| p.department),
            reg_no: reg_no.clone(),
            event_id: event.id.clone(),
            event_title: event.title.clone(),
            event_date: event.date.clone(),
            event_venue: event.venue.clone(),
            status: AttendanceStatus::Confirmed,
            timestamp: Utc::now(),
        };

        let value = serde_json::to_value(&record)?;
        self.store
            .set(&event_collection, &reg_no, value.clone())
            .await
            .map_err(AttendanceError::WriteError)?;
        self.store
            .set(&student_attendance_collection(&reg_no), &event.id, value)
            .await
            .map_err(AttendanceError::WriteError)?;

        info!(%reg_no, event_id = %event.id, "attendance marked");
        Ok(MarkOutcome::Marked(record))
    }

    /// Best-effort profile lookup. Absence, a malformed document or a
    /// failed read all fall back to the synthesized identity; this path
    /// never fails the marking operation and is never surfaced.
    async fn resolve_profile(&self, reg_no: &str) -> Option<StudentProfile> {
        match self
            .store
            .get(&student_profile_collection(reg_no), PROFILE_DOC_KEY)
            .await
        {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    debug!(%reg_no, error = %e, "malformed student profile, using synthesized identity");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!(%reg_no, error = %e, "profile lookup failed, using synthesized identity");
                None
            }
        }
    }
}
