// File: crates/odmark_attendance/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::events::CreateEventRequest;
use crate::handlers::{ScanRequest, ScanResponse};
use crate::models::{AttendanceRecord, AttendanceStatus, EventRecord};

#[utoipa::path(
    post,
    path = "/attendance/scan",
    request_body(content = ScanRequest, example = json!({
        "event_id": "5e0ac294-6a2d-4b06-9e41-1d4a6f3f4a51",
        "reg_no": " cs101 "
    })),
    responses(
        (status = 200, description = "Scan processed", body = ScanResponse,
         example = json!({
             "result": "marked",
             "message": "Success: CS101 Marked!"
         })
        ),
        (status = 400, description = "Empty registration number"),
        (status = 403, description = "Event belongs to another club"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Marking failed; rescan the student")
    )
)]
fn doc_scan_handler() {}

#[utoipa::path(
    post,
    path = "/events",
    request_body(content = CreateEventRequest, example = json!({
        "title": "Hack Night",
        "date": "2026-08-21",
        "venue": "Main Hall"
    })),
    responses(
        (status = 201, description = "Event created", body = EventRecord),
        (status = 400, description = "Missing title or venue")
    )
)]
fn doc_create_event_handler() {}

#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "The calling club's events, newest first", body = Vec<EventRecord>)
    )
)]
fn doc_list_events_handler() {}

#[utoipa::path(
    delete,
    path = "/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "The ID of the event to delete")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Event belongs to another club"),
        (status = 404, description = "Event not found")
    )
)]
fn doc_delete_event_handler() {}

#[utoipa::path(
    get,
    path = "/events/{event_id}/attendance",
    params(
        ("event_id" = String, Path, description = "The event whose roster to read")
    ),
    responses(
        (status = 200, description = "Attendance roster, newest first", body = Vec<AttendanceRecord>),
        (status = 403, description = "Event belongs to another club"),
        (status = 404, description = "Event not found")
    )
)]
fn doc_event_roster_handler() {}

#[utoipa::path(
    get,
    path = "/students/{reg_no}/attendance",
    params(
        ("reg_no" = String, Path, description = "Registration number; normalized before lookup")
    ),
    responses(
        (status = 200, description = "The student's attendance history, newest first", body = Vec<AttendanceRecord>)
    )
)]
fn doc_student_history_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_scan_handler,
        doc_create_event_handler,
        doc_list_events_handler,
        doc_delete_event_handler,
        doc_event_roster_handler,
        doc_student_history_handler
    ),
    components(
        schemas(
            ScanRequest,
            ScanResponse,
            CreateEventRequest,
            EventRecord,
            AttendanceRecord,
            AttendanceStatus
        )
    ),
    tags(
        (name = "attendance", description = "OD attendance marking API")
    ),
    servers(
        (url = "/api", description = "Attendance API server")
    )
)]
pub struct AttendanceApiDoc;
