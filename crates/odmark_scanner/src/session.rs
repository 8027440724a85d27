//! Camera session lifecycle.
//!
//! A [`ScanSession`] owns one camera acquisition from start to stop. It is
//! one-shot: created when the scanning surface mounts, started once,
//! stopped exactly once on whichever teardown path fires first. Manual
//! retry after a camera failure means building a fresh session, never
//! restarting this one.

use crate::camera::{CameraBackend, CameraConfig, CameraError, CameraHandle, DecodeEvent};
use odmark_common::services::{BoxedError, Haptics};
use odmark_config::ScannerConfig;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Duration of the haptic pulse fired on each decode.
const DECODE_PULSE_MS: u64 = 200;

/// Lifecycle state of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Initializing,
    Active,
    Error,
    Stopped,
}

struct SessionState {
    status: SessionStatus,
    last_error: Option<String>,
    handle: Option<Arc<dyn CameraHandle>>,
    probe_task: Option<JoinHandle<()>>,
}

/// One camera acquisition, from start to stop.
pub struct ScanSession {
    backend: Arc<dyn CameraBackend>,
    haptics: Option<Arc<dyn Haptics<Error = BoxedError>>>,
    config: ScannerConfig,
    state: Mutex<SessionState>,
    torch_capable: Arc<AtomicBool>,
    torch_on: AtomicBool,
    started: AtomicBool,
    stop_requested: AtomicBool,
}

impl ScanSession {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        haptics: Option<Arc<dyn Haptics<Error = BoxedError>>>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            backend,
            haptics,
            config,
            state: Mutex::new(SessionState {
                status: SessionStatus::Initializing,
                last_error: None,
                handle: None,
                probe_task: None,
            }),
            torch_capable: Arc::new(AtomicBool::new(false)),
            torch_on: AtomicBool::new(false),
            started: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Acquire the camera and start continuous capture.
    ///
    /// Returns the receiving end of the decode channel. A second call on
    /// the same session (whether the first is still in flight or already
    /// succeeded) is rejected with `AlreadyScanning`; this guard is an
    /// internal condition, logged but never surfaced to the user.
    ///
    /// If `stop()` arrives while the camera acquisition is still in
    /// flight, the late-completing acquisition is stopped immediately so
    /// no orphaned capture pipeline outlives the session.
    pub async fn start(&self) -> Result<mpsc::Receiver<DecodeEvent>, CameraError> {
        if self.stop_requested.load(Ordering::Acquire) {
            return Err(CameraError::SessionStopped);
        }
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("rejecting re-entrant scan session start");
            return Err(CameraError::AlreadyScanning);
        }

        let (sender, receiver) = mpsc::channel(self.config.decode_queue_depth);
        let camera_config = CameraConfig::from_scanner_config(&self.config);
        let result = self.backend.open(camera_config, sender).await;

        // Resume point: teardown may have happened while the acquisition
        // was in flight.
        if self.stop_requested.load(Ordering::Acquire) {
            if let Ok(handle) = result {
                if let Err(e) = handle.stop().await {
                    warn!(error = %e, "failed to stop camera acquired after cancellation");
                }
            }
            self.with_state(|state| state.status = SessionStatus::Stopped);
            return Err(CameraError::SessionStopped);
        }

        match result {
            Ok(handle) => {
                let handle: Arc<dyn CameraHandle> = Arc::from(handle);
                let probe_task = tokio::spawn(probe_torch_capability(
                    handle.clone(),
                    self.torch_capable.clone(),
                    Duration::from_millis(self.config.torch_probe_interval_ms),
                    self.config.torch_probe_attempts,
                ));
                self.with_state(|state| {
                    state.status = SessionStatus::Active;
                    state.handle = Some(handle);
                    state.probe_task = Some(probe_task);
                });
                Ok(receiver)
            }
            Err(e) => {
                self.with_state(|state| {
                    state.status = SessionStatus::Error;
                    state.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Release the camera. Fires on every teardown path and is safe to
    /// call at any point in the lifecycle: stopping a session that never
    /// became active, or stopping twice, is a no-op rather than an error.
    pub async fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);

        let (handle, probe_task) = {
            let mut state = self.lock_state();
            if state.status != SessionStatus::Error {
                state.status = SessionStatus::Stopped;
            }
            (state.handle.take(), state.probe_task.take())
        };

        if let Some(task) = probe_task {
            task.abort();
        }
        if let Some(handle) = handle {
            if let Err(e) = handle.stop().await {
                warn!(error = %e, "camera stop reported an error");
            }
        }
        self.torch_on.store(false, Ordering::Release);
    }

    /// Switch the torch. Valid only while the session is active and the
    /// capability probe has latched support; otherwise `TorchUnsupported`.
    pub async fn set_torch(&self, on: bool) -> Result<(), CameraError> {
        if !self.torch_capable.load(Ordering::Acquire) {
            return Err(CameraError::TorchUnsupported);
        }
        let handle = {
            let state = self.lock_state();
            if state.status != SessionStatus::Active {
                return Err(CameraError::TorchUnsupported);
            }
            state.handle.clone()
        };
        let handle = handle.ok_or(CameraError::TorchUnsupported)?;
        handle.set_torch(on).await?;
        self.torch_on.store(on, Ordering::Release);
        Ok(())
    }

    /// Best-effort haptic pulse, fired on each decode when the platform
    /// exposes haptics. Failures are ignored.
    pub fn pulse_feedback(&self) {
        if let Some(haptics) = &self.haptics {
            let haptics = haptics.clone();
            tokio::spawn(async move {
                if let Err(e) = haptics.pulse(DECODE_PULSE_MS).await {
                    debug!(error = %e, "haptic pulse failed");
                }
            });
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.lock_state().status
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    pub fn torch_capable(&self) -> bool {
        self.torch_capable.load(Ordering::Acquire)
    }

    pub fn torch_on(&self) -> bool {
        self.torch_on.load(Ordering::Acquire)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_state(&self, f: impl FnOnce(&mut SessionState)) {
        f(&mut self.lock_state());
    }
}

/// Poll the capture pipeline for torch support.
///
/// Hardware torch capability is often not reported at stream start, so we
/// probe on an interval for a bounded number of attempts (defaults:
/// 16 × 500 ms ≈ 8 s). Once detected the capability latches true and the
/// probe ends; if the bound is exhausted it stays false for the session
/// lifetime. The session aborts this task on stop so no timer outlives
/// teardown.
async fn probe_torch_capability(
    handle: Arc<dyn CameraHandle>,
    capable: Arc<AtomicBool>,
    interval: Duration,
    attempts: u32,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    for attempt in 0..attempts {
        ticker.tick().await;
        match handle.torch_supported().await {
            Ok(true) => {
                capable.store(true, Ordering::Release);
                debug!(attempt, "torch capability detected");
                return;
            }
            Ok(false) => {}
            Err(e) => debug!(error = %e, "torch capability probe failed"),
        }
    }
    debug!("torch capability not detected within probe bound");
}
