//! Request id → completion callback table.
//!
//! A slot lives from dispatch until its response has been handled. The
//! callback inside a slot is single use: [`CallbackRegistry::resolve`] takes
//! it out, [`CallbackRegistry::retire`] removes the slot.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use {hostbridge_protocol::RequestId, serde_json::Value, tracing::warn};

use crate::error::BoxError;

/// Script-side completion handler. Receives the decoded payload, if any.
pub type Callback = Box<dyn FnOnce(Option<Value>) -> CallbackResult + Send>;

pub type CallbackResult = Result<(), BoxError>;

/// Wrap an infallible closure as a [`Callback`].
pub fn callback<F>(f: F) -> Callback
where
    F: FnOnce(Option<Value>) + Send + 'static,
{
    Box::new(move |value| {
        f(value);
        Ok(())
    })
}

#[derive(Default)]
pub struct CallbackRegistry {
    slots: Mutex<HashMap<RequestId, Option<Callback>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<RequestId, Option<Callback>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `callback` under `id`.
    pub fn register(&self, id: RequestId, callback: Callback) {
        let (previous, pending) = {
            let mut slots = self.slots();
            let previous = slots.insert(id, Some(callback));
            (previous, slots.len())
        };
        if previous.is_some() {
            warn!(request_id = %id, "callback registered twice, dropping the first one");
        }
        record_pending(pending);
    }

    /// Take the callback registered under `id`. The slot stays pending
    /// until [`Self::retire`].
    pub fn resolve(&self, id: RequestId) -> Option<Callback> {
        self.slots().get_mut(&id).and_then(Option::take)
    }

    /// Remove the slot for `id`. Returns whether one existed.
    pub fn retire(&self, id: RequestId) -> bool {
        let (removed, pending) = {
            let mut slots = self.slots();
            (slots.remove(&id), slots.len())
        };
        record_pending(pending);
        // The callback, if still present, is dropped here, outside the lock.
        removed.is_some()
    }

    /// Guard that retires `id` when it goes out of scope, including
    /// during unwinding.
    pub fn retire_on_drop(&self, id: RequestId) -> RetireGuard<'_> {
        RetireGuard { registry: self, id }
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.slots().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    /// Drop every pending slot. Returns how many there were.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.slots());
        record_pending(0);
        drained.len()
    }
}

/// Retires one request id on drop. See [`CallbackRegistry::retire_on_drop`].
#[must_use = "the id is retired as soon as the guard is dropped"]
pub struct RetireGuard<'a> {
    registry: &'a CallbackRegistry,
    id: RequestId,
}

impl Drop for RetireGuard<'_> {
    fn drop(&mut self) {
        self.registry.retire(self.id);
    }
}

#[cfg(feature = "metrics")]
fn record_pending(pending: usize) {
    hostbridge_metrics::gauge!(hostbridge_metrics::bridge::PENDING_REQUESTS).set(pending as f64);
}

#[cfg(not(feature = "metrics"))]
fn record_pending(_pending: usize) {}
