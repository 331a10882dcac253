//! Named channels for host-push notifications.
//!
//! Delivery is synchronous and in subscription order. A failing or
//! panicking listener is reported and skipped; the rest still run.

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use {
    hostbridge_protocol::EventFrame,
    serde_json::Value,
    tracing::{debug, trace},
};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    error::BoxError,
};

pub type ListenerResult = Result<(), BoxError>;

type Listener = Arc<dyn Fn(&[Value]) -> ListenerResult + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// What happened during one [`EventBus::publish`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Listeners that returned normally.
    pub delivered: usize,
    /// Listeners that returned an error or panicked.
    pub failed: usize,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

struct EventBusInner {
    channels: Mutex<HashMap<String, Vec<(ListenerId, Listener)>>>,
    next_listener: AtomicU64,
    diagnostics: Arc<dyn Diagnostics>,
}

impl EventBus {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                channels: Mutex::new(HashMap::new()),
                next_listener: AtomicU64::new(1),
                diagnostics,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<(ListenerId, Listener)>>> {
        self.inner
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Create `channel` with no listeners. Existing channels are untouched.
    pub fn declare(&self, channel: &str) {
        self.lock().entry(channel.to_string()).or_default();
    }

    pub fn subscribe<F>(&self, channel: &str, listener: F) -> ListenerId
    where
        F: Fn(&[Value]) -> ListenerResult + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(channel.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        debug!(channel, listener = %id, "listener subscribed");
        id
    }

    /// [`Self::subscribe`] for listeners that cannot fail.
    pub fn on<F>(&self, channel: &str, listener: F) -> ListenerId
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.subscribe(channel, move |args| {
            listener(args);
            Ok(())
        })
    }

    /// Returns `false` when `id` is not subscribed to `channel`.
    pub fn unsubscribe(&self, channel: &str, id: ListenerId) -> bool {
        let removed = {
            let mut channels = self.lock();
            let Some(listeners) = channels.get_mut(channel) else {
                return false;
            };
            listeners
                .iter()
                .position(|(lid, _)| *lid == id)
                .map(|pos| listeners.remove(pos))
        };
        // Dropped outside the lock; a listener may own other bus handles.
        let found = removed.is_some();
        drop(removed);
        if found {
            debug!(channel, listener = %id, "listener unsubscribed");
        }
        found
    }

    /// Deliver `args` to every listener currently on `channel`.
    pub fn publish(&self, channel: &str, args: &[Value]) -> PublishReport {
        let snapshot: Vec<(ListenerId, Listener)> = match self.lock().get(channel) {
            Some(listeners) => listeners.clone(),
            None => Vec::new(),
        };
        if snapshot.is_empty() {
            trace!(channel, "no listeners");
            return PublishReport::default();
        }

        #[cfg(feature = "metrics")]
        hostbridge_metrics::counter!(
            hostbridge_metrics::events::PUBLISHED_TOTAL,
            "channel" => channel.to_string()
        )
        .increment(1);

        let mut report = PublishReport::default();
        for (id, listener) in snapshot {
            let failure = match catch_unwind(AssertUnwindSafe(|| listener(args))) {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(panic) => Some(panic_message(panic.as_ref())),
            };
            match failure {
                None => report.delivered += 1,
                Some(message) => {
                    report.failed += 1;
                    debug!(channel, listener = %id, "listener failed");
                    self.inner
                        .diagnostics
                        .report(&Diagnostic::listener_failed(channel, &message));
                    #[cfg(feature = "metrics")]
                    hostbridge_metrics::counter!(
                        hostbridge_metrics::events::LISTENER_FAILURES_TOTAL,
                        "channel" => channel.to_string()
                    )
                    .increment(1);
                },
            }
        }
        report
    }

    pub fn publish_frame(&self, frame: &EventFrame) -> PublishReport {
        self.publish(&frame.event, &frame.args)
    }

    pub fn has_listeners(&self, channel: &str) -> bool {
        self.listener_count(channel) > 0
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.lock().get(channel).map_or(0, Vec::len)
    }

    /// Every declared or subscribed channel, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
