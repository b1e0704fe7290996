//! The polling coordinator

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use climkit_core::{DeviceSnapshot, StateSource, VendorError};
use tokio::sync::watch;
use tracing::{debug, error, warn};
use ulid::Ulid;

use crate::listeners::{CoordinatorUpdate, ListenerHandle, ListenerRegistry, UpdateListener};

/// Outcome of one refresh, shared with joiners of an in-flight refresh
type RefreshOutcome = Option<Result<(), VendorError>>;

/// Coordinator-owned run state, mutated only inside the refresh critical section
struct RunState {
    snapshot: Option<Arc<DeviceSnapshot>>,
    last_error: Option<VendorError>,
    last_update_success: bool,
    failed_fatally: bool,
    last_attempt_at: Option<DateTime<Utc>>,
    last_success_at: Option<DateTime<Utc>>,
}

enum Begin {
    /// This caller runs the fetch and publishes the outcome
    Run(watch::Sender<RefreshOutcome>),
    /// Another refresh is in flight; this caller awaits its outcome
    Join(watch::Receiver<RefreshOutcome>),
}

/// Owns one scheduled/polled connection to a vendor device or API
///
/// The coordinator fetches state through its [`StateSource`], keeps the
/// latest [`DeviceSnapshot`], and notifies listeners after every refresh
/// attempt, successful or not. At most one fetch is in flight at any time;
/// concurrent refresh calls coalesce onto the running one instead of
/// queueing duplicate work.
///
/// Transient fetch failures are absorbed here: the previous snapshot stays
/// in place, `last_update_success` flips to false, and listeners are told so
/// entities can render unavailable/assumed state. Only configuration-fatal
/// failures (rejected credentials) propagate out, and they latch the
/// coordinator into a failed state until [`PollingCoordinator::reset_fatal`]
/// or a reload.
pub struct PollingCoordinator {
    name: String,
    source: Arc<dyn StateSource>,
    update_interval: Duration,
    run: Mutex<RunState>,
    in_flight: Mutex<Option<watch::Receiver<RefreshOutcome>>>,
    listeners: ListenerRegistry,
}

impl PollingCoordinator {
    /// Create a coordinator for one vendor connection
    ///
    /// `name` labels log lines and should identify the integration instance
    /// (e.g. `"breeze:home"`). `update_interval` drives
    /// [`PollingCoordinator::spawn_polling`].
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn StateSource>,
        update_interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            update_interval,
            run: Mutex::new(RunState {
                snapshot: None,
                last_error: None,
                last_update_success: false,
                failed_fatally: false,
                last_attempt_at: None,
                last_success_at: None,
            }),
            in_flight: Mutex::new(None),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Latest snapshot; `None` until the first successful refresh
    pub fn snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        self.lock_run().snapshot.clone()
    }

    /// Whether the most recent refresh attempt succeeded
    ///
    /// False until the first refresh completes.
    pub fn last_update_success(&self) -> bool {
        self.lock_run().last_update_success
    }

    /// The most recent failure, cleared by the next success
    pub fn last_error(&self) -> Option<VendorError> {
        self.lock_run().last_error.clone()
    }

    /// Whether a configuration-fatal failure has latched the coordinator
    pub fn failed_fatally(&self) -> bool {
        self.lock_run().failed_fatally
    }

    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.lock_run().last_success_at
    }

    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.lock_run().last_attempt_at
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Register a listener, called synchronously after every refresh attempt
    ///
    /// Listeners run in registration order, strictly after the snapshot swap
    /// for the refresh they describe. A panicking listener is caught and
    /// logged and does not stop the pass. The returned handle unsubscribes
    /// idempotently and may be used from inside a callback (it takes effect
    /// with the next pass).
    pub fn add_listener(&self, listener: UpdateListener) -> ListenerHandle {
        self.listeners.add(listener)
    }

    /// Clear a latched fatal failure so refreshes may run again
    ///
    /// Intended for integration reload paths after reconfiguration.
    pub fn reset_fatal(&self) {
        let mut run = self.lock_run();
        run.failed_fatally = false;
        run.last_error = None;
    }

    /// Perform one refresh attempt, coalescing onto an in-flight one
    ///
    /// Returns `Ok(())` for successful and transiently-failed refreshes
    /// alike; inspect [`PollingCoordinator::last_update_success`] to tell
    /// them apart. Returns `Err` only for configuration-fatal failures.
    pub async fn async_refresh(&self) -> Result<(), VendorError> {
        if let Some(err) = self.latched_fatal() {
            return Err(err);
        }
        match self.begin() {
            Begin::Run(done) => self.run_refresh(done).await,
            Begin::Join(rx) => {
                debug!(coordinator = %self.name, "refresh already in flight, coalescing");
                self.await_outcome(rx).await
            }
        }
    }

    /// Request a refresh; redundant calls are coalesced, never an error
    ///
    /// While a refresh is in flight, callers observe the outcome of that
    /// refresh rather than triggering duplicate fetches.
    pub async fn request_refresh(&self) -> Result<(), VendorError> {
        self.async_refresh().await
    }

    /// Setup-time refresh that propagates any failure, transient included
    ///
    /// Use when first loading an integration so setup can be failed or
    /// retried instead of silently starting with no data.
    pub async fn first_refresh(&self) -> Result<(), VendorError> {
        self.async_refresh().await?;
        let run = self.lock_run();
        if run.last_update_success {
            Ok(())
        } else {
            Err(run
                .last_error
                .clone()
                .unwrap_or_else(|| VendorError::Transport("initial refresh failed".to_string())))
        }
    }

    fn lock_run(&self) -> MutexGuard<'_, RunState> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn latched_fatal(&self) -> Option<VendorError> {
        let run = self.lock_run();
        if run.failed_fatally {
            Some(run.last_error.clone().unwrap_or_else(|| {
                VendorError::AuthFailed("coordinator in failed state".to_string())
            }))
        } else {
            None
        }
    }

    /// Atomically either claim the refresh slot or join the holder
    fn begin(&self) -> Begin {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match in_flight.as_ref() {
            Some(rx) => Begin::Join(rx.clone()),
            None => {
                let (tx, rx) = watch::channel(None);
                *in_flight = Some(rx);
                Begin::Run(tx)
            }
        }
    }

    async fn run_refresh(&self, done: watch::Sender<RefreshOutcome>) -> Result<(), VendorError> {
        let started = Utc::now();
        let result = self.source.fetch_state().await;

        let update = {
            let mut run = self.lock_run();
            run.last_attempt_at = Some(started);
            match result {
                Ok(snapshot) => {
                    let snapshot = Arc::new(snapshot);
                    run.snapshot = Some(Arc::clone(&snapshot));
                    run.last_update_success = true;
                    run.last_error = None;
                    run.last_success_at = Some(Utc::now());
                    CoordinatorUpdate {
                        refresh_id: snapshot.refresh_id(),
                        success: true,
                        snapshot: Some(snapshot),
                        error: None,
                    }
                }
                Err(err) => {
                    run.last_update_success = false;
                    run.last_error = Some(err.clone());
                    if err.is_fatal() {
                        run.failed_fatally = true;
                    }
                    CoordinatorUpdate {
                        refresh_id: Ulid::new(),
                        success: false,
                        snapshot: run.snapshot.clone(),
                        error: Some(err),
                    }
                }
            }
        };

        // Free the slot before fan-out so a listener can request the next
        // refresh without joining this finished one.
        *self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;

        let outcome = match &update.error {
            Some(err) if err.is_fatal() => Err(err.clone()),
            _ => Ok(()),
        };
        let _ = done.send(Some(outcome.clone()));

        match &update.error {
            None => debug!(
                coordinator = %self.name,
                refresh_id = %update.refresh_id,
                "refresh succeeded"
            ),
            Some(err) if err.is_fatal() => error!(
                coordinator = %self.name,
                error = %err,
                "refresh failed fatally; polling suspended until reload"
            ),
            Some(err) => warn!(coordinator = %self.name, error = %err, "refresh failed"),
        }

        self.notify_listeners(&update);
        outcome
    }

    async fn await_outcome(
        &self,
        mut rx: watch::Receiver<RefreshOutcome>,
    ) -> Result<(), VendorError> {
        loop {
            if let Some(outcome) = rx.borrow().clone() {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // The running refresh was cancelled before publishing; there
                // is nothing to report and the next tick will retry.
                debug!(coordinator = %self.name, "joined refresh was cancelled");
                return Ok(());
            }
        }
    }

    fn notify_listeners(&self, update: &CoordinatorUpdate) {
        for (id, listener) in self.listeners.snapshot() {
            if catch_unwind(AssertUnwindSafe(|| listener(update))).is_err() {
                error!(
                    coordinator = %self.name,
                    listener = id,
                    "update listener panicked; continuing with remaining listeners"
                );
            }
        }
    }
}
