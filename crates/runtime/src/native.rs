//! The native boundary as seen from the script side.
//!
//! The transport behind an entry point is opaque: a call returns nothing and
//! the host answers later through the response handler.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use hostbridge_protocol::{NativeCallFrame, RequestId};

/// One native entry point, e.g. `GetWindow`.
pub trait NativeEntry: Send + Sync {
    fn call(&self, serialized_args: &str, request_id: RequestId, has_callback: bool);
}

impl<F> NativeEntry for F
where
    F: Fn(&str, RequestId, bool) + Send + Sync,
{
    fn call(&self, serialized_args: &str, request_id: RequestId, has_callback: bool) {
        self(serialized_args, request_id, has_callback);
    }
}

/// Resolves native entry points by name.
pub trait NativeHost: Send + Sync {
    fn entry_point(&self, name: &str) -> Option<Arc<dyn NativeEntry>>;
}

/// Host that accepts calls and records them without answering.
///
/// Used by tests and by the replay tool, where responses are fed in
/// separately.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<NativeCallFrame>>>,
    known: Option<Arc<HashSet<String>>>,
}

impl RecordingHost {
    /// A host exposing every entry point name.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host exposing only the given entry point names.
    pub fn with_entries<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            calls: Arc::default(),
            known: Some(Arc::new(names.into_iter().map(Into::into).collect())),
        }
    }

    /// A recording entry point for `name`, regardless of `known`.
    pub fn entry(&self, name: &str) -> RecordingEntry {
        RecordingEntry {
            name: name.to_string(),
            calls: Arc::clone(&self.calls),
        }
    }

    pub fn calls(&self) -> Vec<NativeCallFrame> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take_calls(&self) -> Vec<NativeCallFrame> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn last_call(&self) -> Option<NativeCallFrame> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl NativeHost for RecordingHost {
    fn entry_point(&self, name: &str) -> Option<Arc<dyn NativeEntry>> {
        if let Some(ref known) = self.known
            && !known.contains(name)
        {
            return None;
        }
        Some(Arc::new(self.entry(name)))
    }
}

/// Entry point handed out by [`RecordingHost`].
#[derive(Debug, Clone)]
pub struct RecordingEntry {
    name: String,
    calls: Arc<Mutex<Vec<NativeCallFrame>>>,
}

impl NativeEntry for RecordingEntry {
    fn call(&self, serialized_args: &str, request_id: RequestId, has_callback: bool) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(NativeCallFrame {
                entry: self.name.clone(),
                args: serialized_args.to_string(),
                request_id,
                has_callback,
            });
    }
}
