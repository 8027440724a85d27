//! Platform camera abstraction.
//!
//! The scan core never talks to camera hardware directly. A
//! [`CameraBackend`] implementation owns device enumeration, frame capture
//! and QR decoding, and delivers decoded payloads into the bounded channel
//! it is handed at open time. The capture pipeline runs on its own task or
//! thread; the only contract at the boundary is the channel.
//!
//! Backpressure: when the channel is full the decode is dropped. The
//! camera side must never block on the application: a dropped frame is a
//! re-scan, a stalled capture pipeline is a frozen preview.

use odmark_common::services::BoxFuture;
use odmark_config::ScannerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

/// Errors reported by the camera layer.
///
/// `NoCameraFound` and `PermissionDenied` are deliberately distinct: the
/// first means the device has no usable camera, the second that the user
/// has to fix a platform permission. They get different messages in the
/// scanning surface.
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("no camera devices found")]
    NoCameraFound,
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("a scan session is already running")]
    AlreadyScanning,
    #[error("torch is not supported by this session")]
    TorchUnsupported,
    #[error("session already stopped")]
    SessionStopped,
    #[error("camera backend error: {0}")]
    Backend(String),
}

/// Camera facing preference. A preference, not a requirement: a backend
/// with a single front camera still opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    Environment,
    User,
}

/// Capture configuration handed to the backend at open time.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub facing: FacingMode,
    /// Target decode frame rate.
    pub frame_rate: u32,
    /// Side length of the square decode region, in pixels.
    pub decode_box_px: u32,
}

impl CameraConfig {
    /// Build the capture configuration from the scanner section of the app
    /// config. The back camera is always preferred for scanning badges.
    pub fn from_scanner_config(config: &ScannerConfig) -> Self {
        Self {
            facing: FacingMode::Environment,
            frame_rate: config.frame_rate,
            decode_box_px: config.decode_box_px,
        }
    }
}

/// A decoded QR payload and the instant it was observed.
#[derive(Debug, Clone)]
pub struct DecodeEvent {
    pub payload: String,
    pub observed_at: Instant,
}

impl DecodeEvent {
    pub fn now(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            observed_at: Instant::now(),
        }
    }
}

/// Offer a decode event to the application without ever blocking.
///
/// Backends call this from their capture pipeline. A full channel drops
/// the event (the next frame will usually decode the same code again); a
/// closed channel means the session is being torn down.
pub fn offer_decode(sender: &mpsc::Sender<DecodeEvent>, event: DecodeEvent) {
    match sender.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            debug!(payload = %event.payload, "decode queue full, dropping event");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("decode queue closed, session is stopping");
        }
    }
}

/// A platform camera implementation.
pub trait CameraBackend: Send + Sync {
    /// Acquire a camera and start continuous capture, delivering decoded
    /// payloads into `decoded`. Returns the handle controlling the live
    /// pipeline.
    fn open(
        &self,
        config: CameraConfig,
        decoded: mpsc::Sender<DecodeEvent>,
    ) -> BoxFuture<'_, Box<dyn CameraHandle>, CameraError>;
}

/// A live capture pipeline for one acquired device.
pub trait CameraHandle: Send + Sync {
    /// Whether the hardware exposes a torch. Capture pipelines often
    /// report this only after the stream has warmed up, so the session
    /// polls it for a bounded period after start.
    fn torch_supported(&self) -> BoxFuture<'_, bool, CameraError>;

    /// Switch the torch. Only meaningful once `torch_supported` has
    /// reported true.
    fn set_torch(&self, on: bool) -> BoxFuture<'_, (), CameraError>;

    /// Release the device and end capture. Must be idempotent; the
    /// decode sender is dropped as part of stopping.
    fn stop(&self) -> BoxFuture<'_, (), CameraError>;
}
