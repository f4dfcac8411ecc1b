//! Tests for the idle notifier and activity indicator

#[cfg(test)]
mod tests {
    use crate::activity::{ActivityIndicator, ActivityObserver, IdleNotifier};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<&'static str>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<&'static str> {
            self.events.lock().clone()
        }
    }

    #[async_trait]
    impl ActivityObserver for RecordingObserver {
        async fn busy(&self) {
            self.events.lock().push("busy");
        }

        async fn idle(&self) {
            self.events.lock().push("idle");
        }
    }

    /// Observer whose busy side effect takes `busy_delay` to complete
    struct SlowObserver {
        busy_delay: Duration,
        inner: RecordingObserver,
    }

    #[async_trait]
    impl ActivityObserver for SlowObserver {
        async fn busy(&self) {
            sleep(self.busy_delay).await;
            self.inner.busy().await;
        }

        async fn idle(&self) {
            self.inner.idle().await;
        }
    }

    // ========== IdleNotifier ==========

    #[tokio::test(start_paused = true)]
    async fn test_wait_without_pings_resolves_after_quiet_window() {
        let notifier = IdleNotifier::new();
        let start = Instant::now();
        notifier.wait(ms(300)).await;
        assert_eq!(start.elapsed(), ms(300));
        assert!(notifier.last_ping_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pings_keep_wait_pending() {
        let notifier = IdleNotifier::new();
        let waiter = tokio::spawn(notifier.wait(ms(5000)));

        for _ in 0..10 {
            sleep(ms(1000)).await;
            notifier.ping();
            assert!(!waiter.is_finished());
        }
        let last_ping = notifier.last_ping_at().unwrap();

        sleep(ms(4990)).await;
        assert!(!waiter.is_finished());

        sleep(ms(20)).await;
        assert!(waiter.is_finished());
        assert_eq!(last_ping.elapsed(), ms(5010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waits_are_independent() {
        let notifier = IdleNotifier::new();
        let first = tokio::spawn(notifier.wait(ms(100)));
        sleep(ms(50)).await;
        let second = tokio::spawn(notifier.wait(ms(100)));

        sleep(ms(60)).await;
        assert!(first.is_finished());
        assert!(!second.is_finished());

        sleep(ms(50)).await;
        assert!(second.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ping_resets_every_outstanding_wait() {
        let notifier = IdleNotifier::new();
        let short = tokio::spawn(notifier.wait(ms(100)));
        let long = tokio::spawn(notifier.wait(ms(200)));

        sleep(ms(90)).await;
        notifier.ping();

        sleep(ms(20)).await;
        assert!(!short.is_finished());

        sleep(ms(90)).await;
        assert!(short.is_finished());
        assert!(!long.is_finished());

        sleep(ms(100)).await;
        assert!(long.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_activity_clock() {
        let notifier = IdleNotifier::new();
        let clone = notifier.clone();
        let waiter = tokio::spawn(notifier.wait(ms(100)));

        sleep(ms(80)).await;
        clone.ping();
        sleep(ms(80)).await;
        assert!(!waiter.is_finished());
        assert_eq!(notifier.last_ping_at(), clone.last_ping_at());
    }

    // ========== ActivityIndicator ==========

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_one_busy_and_one_idle() {
        let observer = Arc::new(RecordingObserver::default());
        let indicator = ActivityIndicator::new(ms(500), observer.clone());

        for _ in 0..5 {
            indicator.on_chunk();
            sleep(ms(100)).await;
        }
        assert!(indicator.is_busy());
        assert_eq!(observer.events(), vec!["busy"]);

        // last chunk at t=400, idle at t=900
        sleep(ms(350)).await;
        assert_eq!(observer.events(), vec!["busy"]);

        sleep(ms(100)).await;
        assert_eq!(observer.events(), vec!["busy", "idle"]);
        assert!(!indicator.is_busy());
        assert_eq!(indicator.busy_periods(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_emit_separate_periods() {
        let observer = Arc::new(RecordingObserver::default());
        let indicator = ActivityIndicator::new(ms(200), observer.clone());

        indicator.on_chunk();
        sleep(ms(300)).await;
        indicator.on_chunk();
        indicator.on_chunk();
        sleep(ms(300)).await;

        assert_eq!(observer.events(), vec!["busy", "idle", "busy", "idle"]);
        assert_eq!(indicator.busy_periods(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_chunks_no_side_effects() {
        let observer = Arc::new(RecordingObserver::default());
        let indicator = ActivityIndicator::new(ms(200), observer.clone());

        sleep(ms(1000)).await;
        assert!(observer.events().is_empty());
        assert!(!indicator.is_busy());
        assert_eq!(indicator.hysteresis(), ms(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_polled_after_deadline_resolves() {
        let notifier = IdleNotifier::new();
        let waiter = notifier.wait(ms(100));

        sleep(ms(150)).await;
        notifier.ping();

        let start = Instant::now();
        waiter.await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_during_slow_busy_effect_extends_period() {
        let observer = Arc::new(SlowObserver {
            busy_delay: ms(600),
            inner: RecordingObserver::default(),
        });
        let indicator = ActivityIndicator::new(ms(500), observer.clone());

        indicator.on_chunk();
        sleep(ms(550)).await;
        // quiet window closed at t=500, but busy() is still running
        indicator.on_chunk();

        sleep(ms(150)).await;
        assert!(indicator.is_busy());
        assert_eq!(observer.inner.events(), vec!["busy"]);

        sleep(ms(500)).await;
        assert!(!indicator.is_busy());
        assert_eq!(observer.inner.events(), vec!["busy", "idle"]);
        assert_eq!(indicator.busy_periods(), 1);
    }
}
