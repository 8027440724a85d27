// --- File: crates/odmark_attendance/src/models.rs ---
//! Stored models and collection paths.
//!
//! Documents keep the camelCase field names of the deployed database so a
//! Rust service and the existing data interoperate without migration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level collection holding club events.
pub const EVENTS_COLLECTION: &str = "events";

/// Key of the single profile document in a student's profile collection.
pub const PROFILE_DOC_KEY: &str = "profile";

/// Event-scoped attendance collection, keyed by registration number. This
/// is the copy club rosters read.
pub fn event_attendance_collection(event_id: &str) -> String {
    format!("events/{}/attendance", event_id)
}

/// Student-scoped attendance collection, keyed by event id. This is the
/// copy a student's personal history reads.
pub fn student_attendance_collection(reg_no: &str) -> String {
    format!("students/{}/attendance", reg_no)
}

/// Collection holding a student's profile document.
pub fn student_profile_collection(reg_no: &str) -> String {
    format!("students/{}/profile", reg_no)
}

/// A club event students attend for OD credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    /// Event date as entered by the club (YYYY-MM-DD).
    pub date: String,
    pub venue: String,
    pub club_email: String,
    pub created_at: DateTime<Utc>,
}

/// Attendance confirmation status. Only one value exists today; records
/// carry it explicitly so certificates and reports can verify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AttendanceStatus {
    Confirmed,
}

/// One student's attendance at one event.
///
/// Logically a single record, persisted as two physical copies with
/// identical field values: under [`event_attendance_collection`] keyed by
/// `reg_no`, and under [`student_attendance_collection`] keyed by
/// `event_id`. The event fields are denormalized into the record so both
/// read paths render without a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AttendanceRecord {
    pub reg_no: String,
    pub student_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub event_id: String,
    pub event_title: String,
    pub event_date: String,
    pub event_venue: String,
    pub status: AttendanceStatus,
    pub timestamp: DateTime<Utc>,
}

/// A student profile as maintained by the students themselves after
/// signup. Every field beyond the registration number is optional; scans
/// must succeed for students who never completed their profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub reg_no: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
