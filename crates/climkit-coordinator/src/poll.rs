//! Scheduled polling task

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::coordinator::PollingCoordinator;

/// Handle for a spawned polling loop
///
/// The loop stops when the coordinator fails fatally, when
/// [`PollHandle::stop`] is called, or when the handle is dropped.
#[derive(Debug)]
pub struct PollHandle {
    handle: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl PollingCoordinator {
    /// Spawn the periodic refresh loop for this coordinator
    ///
    /// Takes an owned `Arc`; clone one off when the coordinator is shared.
    /// The first refresh is expected to have been driven by the setup path
    /// (`first_refresh`), so the loop waits one full interval before its
    /// first fetch. Missed ticks are delayed, not bunched.
    pub fn spawn_polling(self: Arc<Self>) -> PollHandle {
        let coordinator = self;
        info!(
            coordinator = %coordinator.name(),
            interval = ?coordinator.update_interval(),
            "starting polling loop"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(coordinator.update_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval() fires immediately; skip that tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(err) = coordinator.async_refresh().await {
                    error!(
                        coordinator = %coordinator.name(),
                        error = %err,
                        "stopping polling loop after fatal failure"
                    );
                    break;
                }
            }
        });

        PollHandle { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use climkit_core::{DeviceSnapshot, StateSource, VendorError};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        fetches: AtomicUsize,
        fail_from: Option<usize>,
    }

    impl CountingSource {
        fn new(fail_from: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                fail_from,
            })
        }
    }

    #[async_trait]
    impl StateSource for CountingSource {
        async fn fetch_state(&self) -> Result<DeviceSnapshot, VendorError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(from) = self.fail_from {
                if n >= from {
                    return Err(VendorError::AuthFailed("token revoked".into()));
                }
            }
            Ok([("power".to_string(), json!("on"))].into_iter().collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_fetches_every_interval() {
        let source = CountingSource::new(None);
        let coord = Arc::new(PollingCoordinator::new(
            "poll",
            source.clone(),
            Duration::from_secs(30),
        ));

        let handle = Arc::clone(&coord).spawn_polling();

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_stops_after_fatal_failure() {
        let source = CountingSource::new(Some(1));
        let coord = Arc::new(PollingCoordinator::new(
            "poll",
            source.clone(),
            Duration::from_secs(10),
        ));

        let handle = Arc::clone(&coord).spawn_polling();

        tokio::time::sleep(Duration::from_secs(65)).await;
        // First fetch succeeds, second is fatal, then the loop is gone
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert!(coord.failed_fatally());
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_aborts_loop() {
        let source = CountingSource::new(None);
        let coord = Arc::new(PollingCoordinator::new(
            "poll",
            source.clone(),
            Duration::from_secs(10),
        ));

        let handle = Arc::clone(&coord).spawn_polling();
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(50)).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
