use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::storage::{StorageEvent, TOKEN_KEY};
use super::store::{is_token_valid, SessionStore};
use crate::navigation::Navigator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationCause {
    /// Another client removed or blanked the token.
    ExternalRemoval,
    /// The token disappeared between two polls.
    TokenRemoved,
    /// The token changed to a value that fails the local validity check.
    TokenReplaced,
}

impl fmt::Display for InvalidationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationCause::ExternalRemoval => write!(f, "token removed by another client"),
            InvalidationCause::TokenRemoved => write!(f, "token removed from storage"),
            InvalidationCause::TokenReplaced => write!(f, "token replaced with an invalid value"),
        }
    }
}

/// Last observed token and the transitions that invalidate the session.
/// Both triggers feed this one value, so a single transition fires once.
#[derive(Debug, Default)]
struct TokenWatch {
    last: Option<String>,
}

impl TokenWatch {
    fn new(initial: Option<String>) -> Self {
        Self {
            last: initial.filter(|t| !t.is_empty()),
        }
    }

    fn on_poll(&mut self, current: Option<String>) -> Option<InvalidationCause> {
        let cause = match (&self.last, &current) {
            (Some(_), None) => Some(InvalidationCause::TokenRemoved),
            (Some(prev), Some(now)) if prev != now && !is_token_valid(Some(now)) => {
                Some(InvalidationCause::TokenReplaced)
            }
            _ => None,
        };

        self.last = match cause {
            Some(_) => None,
            None => current.filter(|t| !t.is_empty()),
        };
        cause
    }

    fn on_storage_event(
        &mut self,
        new_value: Option<&str>,
        session_present: bool,
    ) -> Option<InvalidationCause> {
        if is_token_valid(new_value) {
            self.last = new_value.map(str::to_string);
            return None;
        }

        let fire = self.last.is_some() || session_present;
        self.last = None;
        fire.then_some(InvalidationCause::ExternalRemoval)
    }
}

struct MonitorHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Background watcher that forces logout when the persisted token goes away.
pub struct SessionMonitor {
    store: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    interval: Duration,
    running: Mutex<Option<MonitorHandle>>,
    invalidations: broadcast::Sender<InvalidationCause>,
}

impl SessionMonitor {
    pub fn new(store: Arc<SessionStore>, navigator: Arc<Navigator>, interval: Duration) -> Self {
        let (invalidations, _) = broadcast::channel(16);
        Self {
            store,
            navigator,
            interval,
            running: Mutex::new(None),
            invalidations,
        }
    }

    /// Start polling and listening. Returns `false` if already running.
    /// Must be called from within a Tokio runtime.
    pub fn start_monitoring(&self) -> bool {
        let Ok(mut running) = self.running.lock() else {
            return false;
        };
        if running.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            tracing::debug!("session monitor already running");
            return false;
        }

        // Subscribe and take the baseline before spawning so a removal right
        // after this call is still seen by the task.
        let events = self.store.storage_events();
        let watch = TokenWatch::new(self.store.token());

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_monitor(
            Arc::clone(&self.store),
            Arc::clone(&self.navigator),
            self.interval,
            events,
            watch,
            self.invalidations.clone(),
            shutdown_rx,
        ));

        *running = Some(MonitorHandle { shutdown, task });
        tracing::info!("session monitor started (interval {:?})", self.interval);
        true
    }

    /// Tear down timer and subscription together. Returns `false` if not running.
    pub fn stop_monitoring(&self) -> bool {
        let handle = match self.running.lock() {
            Ok(mut running) => running.take(),
            Err(_) => None,
        };

        match handle {
            Some(handle) => {
                let _ = handle.shutdown.send(());
                handle.task.abort();
                tracing::info!("session monitor stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .map(|running| running.as_ref().is_some_and(|h| !h.task.is_finished()))
            .unwrap_or(false)
    }

    /// One message per invalidation, for callers that want to report it.
    pub fn invalidations(&self) -> broadcast::Receiver<InvalidationCause> {
        self.invalidations.subscribe()
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}

async fn run_monitor(
    store: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    interval: Duration,
    mut events: broadcast::Receiver<StorageEvent>,
    mut watch: TokenWatch,
    invalidations: broadcast::Sender<InvalidationCause>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut events_open = true;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        let cause = tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv(), if events_open => match event {
                Ok(event) if event.key == TOKEN_KEY => {
                    let session_present = store.current_user().is_some();
                    watch.on_storage_event(event.new_value.as_deref(), session_present)
                }
                Ok(_) => None,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("session monitor missed {} storage events", skipped);
                    watch.on_poll(store.token())
                }
                Err(RecvError::Closed) => {
                    events_open = false;
                    None
                }
            },
            _ = ticker.tick() => watch.on_poll(store.token()),
        };

        if let Some(cause) = cause {
            invalidate(&store, &navigator, &invalidations, cause);
        }
    }
}

fn invalidate(
    store: &SessionStore,
    navigator: &Navigator,
    invalidations: &broadcast::Sender<InvalidationCause>,
    cause: InvalidationCause,
) {
    tracing::warn!("session invalidated: {}", cause);
    if let Err(e) = store.clear() {
        tracing::error!("failed to clear session: {}", e);
    }
    navigator.redirect_to_login();
    let _ = invalidations.send(cause);
}
