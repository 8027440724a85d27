// --- File: crates/odmark_attendance/src/sink.rs ---
//! Bridge between the scan controller and the recorder.
//!
//! A kiosk-style scanning surface selects one event, mounts the scan
//! controller and lets every forwarded decode flow into the recorder
//! through this sink.

use crate::logic::{AttendanceError, AttendanceRecorder, MarkOutcome};
use crate::models::EventRecord;
use odmark_common::services::{BoxFuture, BoxedError};
use odmark_scanner::{Feedback, ScanSink};
use std::sync::Arc;

/// Feeds forwarded scans for one selected event into the recorder.
pub struct RecorderScanSink {
    recorder: Arc<AttendanceRecorder>,
    event: EventRecord,
}

impl RecorderScanSink {
    pub fn new(recorder: Arc<AttendanceRecorder>, event: EventRecord) -> Self {
        Self { recorder, event }
    }
}

impl ScanSink for RecorderScanSink {
    fn handle_scan(&self, payload: &str) -> BoxFuture<'_, Feedback, BoxedError> {
        let payload = payload.to_string();
        Box::pin(async move {
            match self.recorder.mark(&self.event, &payload).await {
                Ok(MarkOutcome::Marked(record)) => {
                    Ok(Feedback::success(format!("Success: {} Marked!", record.reg_no)))
                }
                Ok(MarkOutcome::AlreadyMarked) => {
                    Ok(Feedback::notice("Attendance already marked for this event."))
                }
                Err(AttendanceError::EmptyRegNo) => {
                    Ok(Feedback::notice("Scanned code is not a registration number."))
                }
                Err(e) => Err(BoxedError(Box::new(e))),
            }
        })
    }
}
