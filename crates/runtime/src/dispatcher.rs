//! Outbound half of the correlation layer.
//!
//! Dispatch order is fixed: encode, allocate an id, register the callback,
//! then call the entry point. The callback must exist before the native call
//! is made because a host may answer synchronously from inside that call.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use {
    hostbridge_protocol::RequestId,
    serde_json::Value,
    tokio::sync::oneshot,
    tracing::debug,
};

use crate::{
    codec::Codec,
    error::{Error, Result},
    native::NativeEntry,
    registry::{Callback, CallbackRegistry},
    request_id::RequestIdAllocator,
};

#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    registry: Arc<CallbackRegistry>,
    ids: RequestIdAllocator,
    codec: Arc<dyn Codec>,
    max_payload_bytes: Option<usize>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CallbackRegistry>,
        codec: Arc<dyn Codec>,
        first_request_id: u64,
        max_payload_bytes: Option<usize>,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                registry,
                ids: RequestIdAllocator::new(first_request_id),
                codec,
                max_payload_bytes,
            }),
        }
    }

    /// Send `payload` to `entry`, optionally registering `callback` for the
    /// response.
    ///
    /// Returns the id the host will answer with. Nothing is allocated or
    /// registered when encoding fails or the payload is over the limit.
    pub fn dispatch<E>(
        &self,
        entry: &E,
        payload: &Value,
        callback: Option<Callback>,
    ) -> Result<RequestId>
    where
        E: NativeEntry + ?Sized,
    {
        let inner = &self.inner;
        let serialized = inner.codec.encode(payload)?;
        if let Some(limit) = inner.max_payload_bytes
            && serialized.len() > limit
        {
            return Err(Error::PayloadTooLarge {
                size: serialized.len(),
                limit,
            });
        }

        let request_id = inner.ids.next_free(|id| inner.registry.is_pending(id));
        let has_callback = callback.is_some();
        if let Some(callback) = callback {
            inner.registry.register(request_id, callback);
        }

        debug!(
            %request_id,
            has_callback,
            bytes = serialized.len(),
            "dispatching native call"
        );
        #[cfg(feature = "metrics")]
        hostbridge_metrics::counter!(hostbridge_metrics::bridge::REQUESTS_DISPATCHED_TOTAL)
            .increment(1);

        entry.call(&serialized, request_id, has_callback);
        Ok(request_id)
    }

    /// Dispatch with a callback that completes the returned future.
    ///
    /// The future fails with [`Error::ResponseDropped`] when the request is
    /// retired without its callback running, e.g. after a host error.
    pub fn request<E>(&self, entry: &E, payload: &Value) -> Result<PendingResponse>
    where
        E: NativeEntry + ?Sized,
    {
        let (tx, rx) = oneshot::channel();
        let complete: Callback = Box::new(move |value: Option<Value>| {
            // The receiver may have been dropped; nobody is waiting then.
            let _ = tx.send(value);
            Ok(())
        });
        let request_id = self.dispatch(entry, payload, Some(complete))?;
        Ok(PendingResponse { request_id, rx })
    }

    /// The id the next dispatch will try first.
    pub fn next_request_id(&self) -> RequestId {
        self.inner.ids.peek()
    }
}

/// Future resolving to the decoded payload of one request.
#[must_use = "dropping the handle discards the response"]
pub struct PendingResponse {
    request_id: RequestId,
    rx: oneshot::Receiver<Option<Value>>,
}

impl PendingResponse {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }
}

impl Future for PendingResponse {
    type Output = Result<Option<Value>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let request_id = self.request_id;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| Error::ResponseDropped { request_id }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {
        super::*,
        crate::{codec::JsonCodec, native::RecordingHost, registry::callback},
        serde_json::json,
        std::{collections::HashSet, sync::Mutex},
    };

    fn dispatcher(max_payload_bytes: Option<usize>) -> (Dispatcher, Arc<CallbackRegistry>) {
        let registry = Arc::new(CallbackRegistry::new());
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            Arc::new(JsonCodec),
            1,
            max_payload_bytes,
        );
        (dispatcher, registry)
    }

    #[test]
    fn dispatch_encodes_and_flags_callback() {
        let (dispatcher, registry) = dispatcher(None);
        let host = RecordingHost::new();
        let entry = host.entry("UpdateTab");

        let id = dispatcher
            .dispatch(&entry, &json!([4, { "selected": true }]), Some(callback(|_| {})))
            .unwrap();

        let call = host.last_call().unwrap();
        assert_eq!(call.args, r#"[4,{"selected":true}]"#);
        assert_eq!(call.request_id, id);
        assert!(call.has_callback);
        assert!(registry.is_pending(id));
    }

    #[test]
    fn dispatch_without_callback_registers_nothing() {
        let (dispatcher, registry) = dispatcher(None);
        let host = RecordingHost::new();

        dispatcher
            .dispatch(&host.entry("EnablePageAction"), &json!(["a", {}]), None)
            .unwrap();

        assert!(!host.last_call().unwrap().has_callback);
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_are_pairwise_distinct_without_responses() {
        let (dispatcher, _registry) = dispatcher(None);
        let host = RecordingHost::new();
        let entry = host.entry("GetTab");
        let ids: HashSet<RequestId> = (0..64)
            .map(|i| {
                let cb = (i % 2 == 0).then(|| callback(|_| {}));
                dispatcher.dispatch(&entry, &json!(i), cb).unwrap()
            })
            .collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn callback_is_registered_before_native_call() {
        let (dispatcher, registry) = dispatcher(None);
        let seen = Arc::new(Mutex::new(None));
        let probe = {
            let registry = Arc::clone(&registry);
            let seen = Arc::clone(&seen);
            move |_: &str, id: RequestId, _: bool| {
                *seen.lock().unwrap() = Some(registry.is_pending(id));
            }
        };

        dispatcher
            .dispatch(&probe, &Value::Null, Some(callback(|_| {})))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(true));
    }

    #[test]
    fn oversized_payload_is_rejected_before_allocation() {
        let (dispatcher, registry) = dispatcher(Some(8));
        let host = RecordingHost::new();
        let before = dispatcher.next_request_id();

        let err = dispatcher
            .dispatch(
                &host.entry("CreateTab"),
                &json!({ "url": "https://example.com" }),
                Some(callback(|_| {})),
            )
            .unwrap_err();

        assert!(matches!(err, Error::PayloadTooLarge { limit: 8, .. }));
        assert_eq!(dispatcher.next_request_id(), before);
        assert!(registry.is_empty());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn live_ids_are_skipped() {
        let (dispatcher, registry) = dispatcher(None);
        registry.register(RequestId(1), callback(|_| {}));
        let host = RecordingHost::new();

        let id = dispatcher
            .dispatch(&host.entry("GetTab"), &json!(1), None)
            .unwrap();
        assert_eq!(id, RequestId(2));
    }

    #[tokio::test]
    async fn request_resolves_when_callback_runs() {
        let (dispatcher, registry) = dispatcher(None);
        let host = RecordingHost::new();

        let pending = dispatcher.request(&host.entry("GetTab"), &json!(3)).unwrap();
        let id = pending.request_id();
        registry.resolve(id).unwrap()(Some(json!({ "id": 3 }))).unwrap();
        registry.retire(id);

        assert_eq!(pending.await.unwrap(), Some(json!({ "id": 3 })));
    }

    #[tokio::test]
    async fn request_fails_when_retired_unresolved() {
        let (dispatcher, registry) = dispatcher(None);
        let host = RecordingHost::new();

        let pending = dispatcher.request(&host.entry("GetTab"), &json!(3)).unwrap();
        let id = pending.request_id();
        registry.retire(id);

        let err = pending.await.unwrap_err();
        assert!(matches!(err, Error::ResponseDropped { request_id } if request_id == id));
    }
}
