//! Shared fakes for scanner tests.

use crate::camera::{
    offer_decode, CameraBackend, CameraConfig, CameraError, CameraHandle, DecodeEvent,
};
use odmark_common::services::{BoxFuture, BoxedError, Haptics};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Haptics stand-in that counts pulses.
#[derive(Default)]
pub struct CountingHaptics {
    pub pulses: AtomicU32,
}

impl Haptics for CountingHaptics {
    type Error = BoxedError;

    fn pulse(&self, _duration_ms: u64) -> BoxFuture<'_, (), Self::Error> {
        self.pulses.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

/// Observable state of a [`FakeCameraBackend`], shared with the test body.
#[derive(Default)]
pub struct FakeCameraState {
    pub open_calls: AtomicU32,
    pub stop_calls: AtomicU32,
    pub probe_calls: AtomicU32,
    pub torch: Mutex<Option<bool>>,
    sender: Mutex<Option<mpsc::Sender<DecodeEvent>>>,
}

impl FakeCameraState {
    /// Emit a decode as the capture pipeline would.
    pub fn emit(&self, payload: &str) {
        let sender = self.sender.lock().unwrap();
        let sender = sender.as_ref().expect("camera not open");
        offer_decode(sender, DecodeEvent::now(payload));
    }
}

/// Scriptable in-process camera backend.
pub struct FakeCameraBackend {
    /// Simulated acquisition latency.
    pub open_delay: Duration,
    /// Error returned by the next `open` call, consumed once.
    pub open_error: Mutex<Option<CameraError>>,
    /// `Some(n)`: `torch_supported` reports true from the nth probe on.
    /// `None`: the hardware never reports a torch.
    pub torch_after_probes: Option<u32>,
    pub state: Arc<FakeCameraState>,
}

impl FakeCameraBackend {
    pub fn new() -> Self {
        Self {
            open_delay: Duration::ZERO,
            open_error: Mutex::new(None),
            torch_after_probes: None,
            state: Arc::new(FakeCameraState::default()),
        }
    }

    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn with_open_error(self, error: CameraError) -> Self {
        *self.open_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_torch_after_probes(mut self, probes: u32) -> Self {
        self.torch_after_probes = Some(probes);
        self
    }
}

struct FakeCameraHandle {
    state: Arc<FakeCameraState>,
    torch_after_probes: Option<u32>,
}

impl CameraBackend for FakeCameraBackend {
    fn open(
        &self,
        _config: CameraConfig,
        decoded: mpsc::Sender<DecodeEvent>,
    ) -> BoxFuture<'_, Box<dyn CameraHandle>, CameraError> {
        let delay = self.open_delay;
        let state = self.state.clone();
        let torch_after_probes = self.torch_after_probes;
        Box::pin(async move {
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            state.open_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = self.open_error.lock().unwrap().take() {
                return Err(error);
            }
            *state.sender.lock().unwrap() = Some(decoded);
            Ok(Box::new(FakeCameraHandle {
                state,
                torch_after_probes,
            }) as Box<dyn CameraHandle>)
        })
    }
}

impl CameraHandle for FakeCameraHandle {
    fn torch_supported(&self) -> BoxFuture<'_, bool, CameraError> {
        Box::pin(async move {
            let calls = self.state.probe_calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(matches!(self.torch_after_probes, Some(n) if calls >= n))
        })
    }

    fn set_torch(&self, on: bool) -> BoxFuture<'_, (), CameraError> {
        Box::pin(async move {
            *self.state.torch.lock().unwrap() = Some(on);
            Ok(())
        })
    }

    fn stop(&self) -> BoxFuture<'_, (), CameraError> {
        Box::pin(async move {
            self.state.stop_calls.fetch_add(1, Ordering::SeqCst);
            // Dropping the sender ends the decode loop, as a real
            // pipeline teardown would.
            *self.state.sender.lock().unwrap() = None;
            Ok(())
        })
    }
}
