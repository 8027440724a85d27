#[cfg(test)]
mod tests {
    use crate::dedup::{DedupDecision, DedupWindow};
    use std::time::Duration;
    use tokio::time::Instant;

    fn window() -> DedupWindow {
        DedupWindow::from_millis(2000)
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_within_window_is_suppressed() {
        let mut window = window();
        let t0 = Instant::now();

        assert_eq!(window.observe("CS101", t0), DedupDecision::Forward);
        assert_eq!(
            window.observe("CS101", t0 + Duration::from_millis(1999)),
            DedupDecision::Suppress
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_exactly_at_window_boundary_is_forwarded() {
        // The window is a strict less-than: δ == window is outside it.
        let mut window = window();
        let t0 = Instant::now();

        assert_eq!(window.observe("CS101", t0), DedupDecision::Forward);
        assert_eq!(
            window.observe("CS101", t0 + Duration::from_millis(2000)),
            DedupDecision::Forward
        );
    }

    #[tokio::test(start_paused = true)]
    async fn different_payload_is_forwarded_regardless_of_timing() {
        let mut window = window();
        let t0 = Instant::now();

        assert_eq!(window.observe("CS101", t0), DedupDecision::Forward);
        assert_eq!(window.observe("CS102", t0), DedupDecision::Forward);
    }

    #[tokio::test(start_paused = true)]
    async fn same_frame_tick_double_decode_keeps_only_the_first() {
        // Two decoders firing in the same video frame observe the same
        // instant; only the first reaches the recorder.
        let mut window = window();
        let t0 = Instant::now();

        assert_eq!(window.observe("CS101", t0), DedupDecision::Forward);
        assert_eq!(window.observe("CS101", t0), DedupDecision::Suppress);
    }

    #[tokio::test(start_paused = true)]
    async fn suppression_does_not_extend_the_window() {
        // The window is measured from the last *forwarded* observation, so
        // a code held steadily in frame forwards again once the original
        // window elapses.
        let mut window = window();
        let t0 = Instant::now();

        assert_eq!(window.observe("CS101", t0), DedupDecision::Forward);
        assert_eq!(
            window.observe("CS101", t0 + Duration::from_millis(1500)),
            DedupDecision::Suppress
        );
        assert_eq!(
            window.observe("CS101", t0 + Duration::from_millis(2000)),
            DedupDecision::Forward
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_forgets_the_last_observation() {
        let mut window = window();
        let t0 = Instant::now();

        assert_eq!(window.observe("CS101", t0), DedupDecision::Forward);
        window.reset();
        assert_eq!(
            window.observe("CS101", t0 + Duration::from_millis(1)),
            DedupDecision::Forward
        );
    }
}
