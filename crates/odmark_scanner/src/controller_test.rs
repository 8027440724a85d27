#[cfg(test)]
mod tests {
    use crate::camera::CameraError;
    use crate::controller::{
        ControllerState, Feedback, FeedbackKind, ScanController, ScanSink,
    };
    use crate::testing::{FakeCameraBackend, FakeCameraState};
    use odmark_common::services::{BoxFuture, BoxedError};
    use odmark_config::ScannerConfig;
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::sleep;

    /// Sink that records forwarded payloads and answers with a scripted
    /// feedback, or fails like a store write error would.
    struct StubSink {
        calls: Mutex<Vec<String>>,
        feedback: Feedback,
        fail: bool,
    }

    impl StubSink {
        fn marking(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                feedback: Feedback::success(message),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                feedback: Feedback::success(""),
                fail: true,
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ScanSink for StubSink {
        fn handle_scan(&self, payload: &str) -> BoxFuture<'_, Feedback, BoxedError> {
            self.calls.lock().unwrap().push(payload.to_string());
            let result = if self.fail {
                Err(BoxedError("simulated write failure".to_string().into()))
            } else {
                Ok(self.feedback.clone())
            };
            Box::pin(async move { result })
        }
    }

    fn controller_with(
        backend: FakeCameraBackend,
        sink: Arc<StubSink>,
    ) -> (Arc<ScanController>, Arc<FakeCameraState>) {
        let state = backend.state.clone();
        let controller = Arc::new(ScanController::new(
            Arc::new(backend),
            None,
            sink,
            ScannerConfig::default(),
        ));
        (controller, state)
    }

    #[tokio::test(start_paused = true)]
    async fn mount_scans_and_stays_open_for_the_next_student() {
        let sink = StubSink::marking("CS101 Marked!");
        let (controller, camera) = controller_with(FakeCameraBackend::new(), sink.clone());

        controller.mount().await.unwrap();
        assert_eq!(controller.state(), ControllerState::Scanning);

        camera.emit("cs101");
        sleep(Duration::from_millis(10)).await;

        assert_eq!(sink.calls(), vec!["cs101".to_string()]);
        let feedback = controller.current_feedback().unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Success);
        // The session is not closed on success; the next student scans
        // into the same surface.
        assert_eq!(controller.state(), ControllerState::Scanning);
        assert_eq!(camera.stop_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_decode_within_window_reaches_the_sink_once() {
        let sink = StubSink::marking("Marked");
        let (controller, camera) = controller_with(FakeCameraBackend::new(), sink.clone());
        controller.mount().await.unwrap();

        camera.emit("CS101");
        sleep(Duration::from_millis(10)).await;
        camera.emit("CS101");
        sleep(Duration::from_millis(10)).await;
        assert_eq!(sink.calls().len(), 1);

        // Past the window the same code forwards again.
        sleep(Duration::from_millis(2100)).await;
        camera.emit("CS101");
        sleep(Duration::from_millis(10)).await;
        assert_eq!(sink.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn feedback_clears_after_the_configured_delay() {
        let sink = StubSink::marking("Marked");
        let (controller, camera) = controller_with(FakeCameraBackend::new(), sink);
        controller.mount().await.unwrap();

        camera.emit("CS101");
        sleep(Duration::from_millis(10)).await;
        assert!(controller.current_feedback().is_some());

        sleep(Duration::from_millis(3100)).await;
        assert!(controller.current_feedback().is_none());
        assert_eq!(controller.state(), ControllerState::Scanning);
    }

    #[tokio::test(start_paused = true)]
    async fn sink_failure_surfaces_retry_feedback_without_closing_the_session() {
        let sink = StubSink::failing();
        let (controller, camera) = controller_with(FakeCameraBackend::new(), sink);
        controller.mount().await.unwrap();

        camera.emit("CS101");
        sleep(Duration::from_millis(10)).await;

        let feedback = controller.current_feedback().unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Failure);
        assert_eq!(controller.state(), ControllerState::Scanning);
        assert_eq!(camera.stop_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn every_decode_pulses_haptics_even_when_suppressed() {
        let sink = StubSink::marking("Marked");
        let backend = FakeCameraBackend::new();
        let camera = backend.state.clone();
        let haptics = Arc::new(crate::testing::CountingHaptics::default());
        let controller = Arc::new(ScanController::new(
            Arc::new(backend),
            Some(haptics.clone()),
            sink.clone(),
            ScannerConfig::default(),
        ));
        controller.mount().await.unwrap();

        camera.emit("CS101");
        camera.emit("CS101");
        sleep(Duration::from_millis(10)).await;

        // The duplicate was suppressed before the sink, but the haptic
        // pulse fires per decode.
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(haptics.pulses.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_stops_the_camera_session() {
        let sink = StubSink::marking("Marked");
        let (controller, camera) = controller_with(FakeCameraBackend::new(), sink);
        controller.mount().await.unwrap();

        controller.unmount().await;
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(camera.stop_calls.load(Ordering::SeqCst), 1);
        assert!(controller.session_status().is_none());
        assert!(controller.current_feedback().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_during_inflight_mount_never_leaks_a_session() {
        let sink = StubSink::marking("Marked");
        let (controller, camera) = controller_with(
            FakeCameraBackend::new().with_open_delay(Duration::from_millis(500)),
            sink,
        );

        let mounting = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mount().await }
        });
        tokio::task::yield_now().await;
        controller.unmount().await;

        let result = mounting.await.unwrap();
        assert!(result.is_err());
        assert_eq!(controller.state(), ControllerState::Idle);
        // The camera that finished acquiring after the unmount was
        // stopped, not left capturing.
        assert_eq!(camera.stop_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn camera_failure_fails_the_mount_and_reset_allows_retry() {
        let sink = StubSink::marking("Marked");
        let (controller, camera) = controller_with(
            FakeCameraBackend::new().with_open_error(CameraError::NoCameraFound),
            sink,
        );

        let result = controller.mount().await;
        assert!(result.is_err());
        assert_eq!(controller.state(), ControllerState::Error);

        // Full re-initialization: reset and mount again; the fake's open
        // error was consumed by the first attempt.
        controller.reset();
        assert_eq!(controller.state(), ControllerState::Idle);
        controller.mount().await.unwrap();
        assert_eq!(controller.state(), ControllerState::Scanning);
        assert_eq!(camera.open_calls.load(Ordering::SeqCst), 2);
    }
}
