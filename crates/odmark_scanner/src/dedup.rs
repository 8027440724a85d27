//! Decode deduplication.
//!
//! A QR code held in front of a camera decodes on nearly every frame, and
//! several decoders can fire within one frame tick. The dedup window keeps
//! all but the first of those identical detections away from the recorder.

use std::time::Duration;
use tokio::time::Instant;

/// Decision for one observed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupDecision {
    Forward,
    Suppress,
}

/// Time-bounded suppression of repeated identical payloads.
///
/// One window exists per scan session and is reset when the session
/// stops. The comparison is a strict less-than: a repeat arriving exactly
/// at the window boundary is outside the window and forwards.
#[derive(Debug)]
pub struct DedupWindow {
    window: Duration,
    last_payload: Option<String>,
    last_observed_at: Option<Instant>,
}

impl DedupWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_payload: None,
            last_observed_at: None,
        }
    }

    pub fn from_millis(window_ms: u64) -> Self {
        Self::new(Duration::from_millis(window_ms))
    }

    /// Decide whether `payload` observed at `now` reaches the recorder.
    ///
    /// Forwarding updates the window state; suppression leaves it
    /// untouched, so a code held steadily in frame keeps being suppressed
    /// only until the window measured from its first forwarded detection
    /// elapses.
    pub fn observe(&mut self, payload: &str, now: Instant) -> DedupDecision {
        if let (Some(last), Some(at)) = (self.last_payload.as_deref(), self.last_observed_at) {
            if last == payload && now.duration_since(at) < self.window {
                return DedupDecision::Suppress;
            }
        }
        self.last_payload = Some(payload.to_string());
        self.last_observed_at = Some(now);
        DedupDecision::Forward
    }

    /// Forget the last observation. Called at session teardown.
    pub fn reset(&mut self) {
        self.last_payload = None;
        self.last_observed_at = None;
    }
}
