//! Scan surface orchestration.
//!
//! The [`ScanController`] ties the pieces together for one scanning
//! surface: it owns the session for the mounted lifetime, runs the decode
//! loop that filters events through the dedup window, hands forwarded
//! payloads to a [`ScanSink`], and keeps a transient feedback line for the
//! UI. The session stays open across successful and failed scans;
//! closing it is always an explicit unmount.

use crate::camera::{CameraBackend, CameraError, DecodeEvent};
use crate::dedup::{DedupDecision, DedupWindow};
use crate::session::{ScanSession, SessionStatus};
use odmark_common::services::{BoxFuture, BoxedError, Haptics};
use odmark_config::ScannerConfig;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Errors surfaced by the controller itself.
#[derive(Error, Debug)]
pub enum ScanControllerError {
    #[error("scanner is not idle")]
    NotIdle,
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Idle,
    Mounting,
    Scanning,
    Error,
}

/// Kind of transient feedback shown over the live camera view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// Attendance recorded.
    Success,
    /// Expected, recoverable condition (already marked).
    Notice,
    /// The scan must be retried (write failure).
    Failure,
}

/// A transient feedback line. Auto-clears after the configured delay
/// without interrupting the video stream or the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Success,
            message: message.into(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Notice,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Failure,
            message: message.into(),
        }
    }
}

/// Consumer of forwarded (deduplicated) scan payloads.
///
/// The attendance recorder sits behind this seam; the controller only
/// knows that a payload turns into feedback. An `Err` means the handler
/// itself failed (a write error) and surfaces as retryable failure
/// feedback.
pub trait ScanSink: Send + Sync {
    fn handle_scan(&self, payload: &str) -> BoxFuture<'_, Feedback, BoxedError>;
}

struct ControllerInner {
    state: ControllerState,
    session: Option<Arc<ScanSession>>,
    decode_loop: Option<JoinHandle<()>>,
}

struct TransientFeedback {
    feedback: Feedback,
    expires_at: Instant,
}

/// Orchestrates one scanning surface.
pub struct ScanController {
    backend: Arc<dyn CameraBackend>,
    haptics: Option<Arc<dyn Haptics<Error = BoxedError>>>,
    sink: Arc<dyn ScanSink>,
    config: ScannerConfig,
    inner: Mutex<ControllerInner>,
    feedback: Mutex<Option<TransientFeedback>>,
    /// Bumped on every unmount; in-flight mounts compare against their
    /// captured value after each await so a cancelled mount never leaves
    /// an active session behind.
    generation: AtomicU64,
}

impl ScanController {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        haptics: Option<Arc<dyn Haptics<Error = BoxedError>>>,
        sink: Arc<dyn ScanSink>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            backend,
            haptics,
            sink,
            config,
            inner: Mutex::new(ControllerInner {
                state: ControllerState::Idle,
                session: None,
                decode_loop: None,
            }),
            feedback: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Mount the scanning surface: acquire the camera and enter Scanning.
    ///
    /// Only valid from Idle. On camera failure the controller moves to
    /// Error and the error is returned for the surface to render with a
    /// full re-initialization retry affordance.
    pub async fn mount(self: &Arc<Self>) -> Result<(), ScanControllerError> {
        let generation = self.generation.load(Ordering::Acquire);
        let session = {
            let mut inner = self.lock_inner();
            if inner.state != ControllerState::Idle {
                return Err(ScanControllerError::NotIdle);
            }
            inner.state = ControllerState::Mounting;
            let session = Arc::new(ScanSession::new(
                self.backend.clone(),
                self.haptics.clone(),
                self.config.clone(),
            ));
            // Stored before the acquisition await so an unmount racing the
            // start can reach the session and cancel it.
            inner.session = Some(session.clone());
            session
        };

        let started = session.start().await;

        // Resume point: the surface may have unmounted while the camera
        // acquisition was in flight.
        if self.generation.load(Ordering::Acquire) != generation {
            session.stop().await;
            return Err(CameraError::SessionStopped.into());
        }

        match started {
            Ok(receiver) => {
                let decode_loop = tokio::spawn(run_decode_loop(
                    self.clone(),
                    session.clone(),
                    receiver,
                    DedupWindow::from_millis(self.config.dedup_window_ms),
                ));
                let mut inner = self.lock_inner();
                inner.state = ControllerState::Scanning;
                inner.decode_loop = Some(decode_loop);
                info!("scan surface active");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "camera session failed to start");
                let mut inner = self.lock_inner();
                inner.state = ControllerState::Error;
                inner.session = None;
                Err(e.into())
            }
        }
    }

    /// Unmount the scanning surface. The only user-driven way out of
    /// Scanning; always stops the camera session, on every exit path.
    pub async fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);

        let (session, decode_loop) = {
            let mut inner = self.lock_inner();
            inner.state = ControllerState::Idle;
            (inner.session.take(), inner.decode_loop.take())
        };

        if let Some(session) = session {
            session.stop().await;
        }
        if let Some(task) = decode_loop {
            // The loop ends on its own once the camera drops the decode
            // sender; aborting covers backends that leak it.
            task.abort();
        }
        *self.lock_feedback() = None;
    }

    /// Clear an Error state back to Idle so the surface can retry with a
    /// full re-initialization.
    pub fn reset(&self) {
        let mut inner = self.lock_inner();
        if inner.state == ControllerState::Error {
            inner.state = ControllerState::Idle;
            inner.session = None;
        }
    }

    pub fn state(&self) -> ControllerState {
        self.lock_inner().state
    }

    /// Status of the underlying camera session, if one exists.
    pub fn session_status(&self) -> Option<SessionStatus> {
        self.lock_inner().session.as_ref().map(|s| s.status())
    }

    /// Toggle the torch on the live session.
    pub async fn set_torch(&self, on: bool) -> Result<(), CameraError> {
        let session = self
            .lock_inner()
            .session
            .clone()
            .ok_or(CameraError::TorchUnsupported)?;
        session.set_torch(on).await
    }

    /// The feedback currently on screen, if it has not expired yet.
    pub fn current_feedback(&self) -> Option<Feedback> {
        let mut feedback = self.lock_feedback();
        match feedback.as_ref() {
            Some(transient) if Instant::now() < transient.expires_at => {
                Some(transient.feedback.clone())
            }
            Some(_) => {
                *feedback = None;
                None
            }
            None => None,
        }
    }

    fn show_feedback(&self, value: Feedback) {
        let expires_at = Instant::now() + Duration::from_millis(self.config.status_clear_ms);
        *self.lock_feedback() = Some(TransientFeedback {
            feedback: value,
            expires_at,
        });
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_feedback(&self) -> std::sync::MutexGuard<'_, Option<TransientFeedback>> {
        self.feedback.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Single consumer of the decode channel.
///
/// Events are handled one at a time, to completion, so the dedup window
/// and feedback never see overlapping handlers. The loop ends when the
/// camera side drops the sender at stop.
async fn run_decode_loop(
    controller: Arc<ScanController>,
    session: Arc<ScanSession>,
    mut receiver: mpsc::Receiver<DecodeEvent>,
    mut window: DedupWindow,
) {
    while let Some(event) = receiver.recv().await {
        session.pulse_feedback();

        if window.observe(&event.payload, event.observed_at) == DedupDecision::Suppress {
            continue;
        }

        match controller.sink.handle_scan(&event.payload).await {
            Ok(feedback) => controller.show_feedback(feedback),
            Err(e) => {
                warn!(error = %e, payload = %event.payload, "scan handler failed");
                controller.show_feedback(Feedback::failure(
                    "Could not record attendance. Please scan again.",
                ));
            }
        }
    }
    window.reset();
}
