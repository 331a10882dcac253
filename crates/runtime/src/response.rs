//! Inbound half of the correlation layer.

use std::sync::Arc;

use {
    hostbridge_protocol::{RequestId, ResponseFrame, UNKNOWN_ERROR},
    tracing::debug,
};

use crate::{
    codec::Codec,
    diagnostics::{Diagnostic, Diagnostics},
    error::{Error, Result},
    registry::CallbackRegistry,
};

/// Completes pending requests as the host answers them.
#[derive(Clone)]
pub struct ResponseHandler {
    registry: Arc<CallbackRegistry>,
    codec: Arc<dyn Codec>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ResponseHandler {
    pub fn new(
        registry: Arc<CallbackRegistry>,
        codec: Arc<dyn Codec>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            registry,
            codec,
            diagnostics,
        }
    }

    /// Handle the host's answer to `request_id`.
    ///
    /// The id is retired on every path, including when the callback fails
    /// or panics. Host errors are reported to diagnostics and never reach
    /// the callback. Answers for ids that were never registered, or that
    /// were already answered, are ignored.
    ///
    /// An `Err` is returned only for failures after retirement: an
    /// undecodable payload or a callback that returned an error.
    pub fn handle(
        &self,
        request_id: RequestId,
        name: &str,
        success: bool,
        payload: Option<&str>,
        error: Option<&str>,
    ) -> Result<()> {
        let _retire = self.registry.retire_on_drop(request_id);

        if !success {
            let error = error.filter(|e| !e.is_empty()).unwrap_or(UNKNOWN_ERROR);
            self.diagnostics
                .report(&Diagnostic::host_error(request_id, name, error));
            record_outcome(Outcome::HostError);
            return Ok(());
        }

        let Some(callback) = self.registry.resolve(request_id) else {
            debug!(%request_id, operation = name, "response without a pending callback");
            record_outcome(Outcome::NoCallback);
            return Ok(());
        };

        let value = match payload.filter(|p| !p.is_empty()) {
            Some(raw) => match self.codec.decode(raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    self.diagnostics
                        .report(&Diagnostic::decode_failed(request_id, name, &err));
                    record_outcome(Outcome::DecodeError);
                    return Err(err);
                },
            },
            None => None,
        };

        debug!(%request_id, operation = name, has_payload = value.is_some(), "delivering response");
        callback(value).map_err(|source| {
            record_outcome(Outcome::CallbackError);
            Error::CallbackFailed {
                request_id,
                operation: name.to_string(),
                source,
            }
        })?;
        record_outcome(Outcome::Delivered);
        Ok(())
    }

    pub fn handle_frame(&self, frame: &ResponseFrame) -> Result<()> {
        let error = (!frame.success).then(|| frame.error_message());
        self.handle(
            frame.request_id,
            &frame.name,
            frame.success,
            frame.response.as_deref(),
            error,
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Delivered,
    NoCallback,
    HostError,
    CallbackError,
    DecodeError,
}

#[cfg(feature = "metrics")]
fn record_outcome(outcome: Outcome) {
    use hostbridge_metrics::{bridge, counter, outcome as label};

    let label = match outcome {
        Outcome::Delivered => label::DELIVERED,
        Outcome::NoCallback => label::NO_CALLBACK,
        Outcome::HostError => label::HOST_ERROR,
        Outcome::CallbackError => label::CALLBACK_ERROR,
        Outcome::DecodeError => label::DECODE_ERROR,
    };
    counter!(bridge::RESPONSES_TOTAL, "outcome" => label).increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_outcome(_outcome: Outcome) {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {
        super::*,
        crate::{
            codec::JsonCodec,
            diagnostics::{DiagnosticKind, MemoryDiagnostics},
            error::BoxError,
            registry::{Callback, callback},
        },
        serde_json::{Value, json},
        std::{
            panic::{AssertUnwindSafe, catch_unwind},
            sync::Mutex,
        },
    };

    struct Fixture {
        registry: Arc<CallbackRegistry>,
        diagnostics: Arc<MemoryDiagnostics>,
        handler: ResponseHandler,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(CallbackRegistry::new());
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let handler = ResponseHandler::new(
            Arc::clone(&registry),
            Arc::new(JsonCodec),
            Arc::clone(&diagnostics) as Arc<dyn Diagnostics>,
        );
        Fixture {
            registry,
            diagnostics,
            handler,
        }
    }

    fn capture() -> (Callback, Arc<Mutex<Vec<Option<Value>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (callback(move |v| sink.lock().unwrap().push(v)), seen)
    }

    #[test]
    fn success_delivers_decoded_payload() {
        let f = fixture();
        let (cb, seen) = capture();
        f.registry.register(RequestId(7), cb);

        f.handler
            .handle(RequestId(7), "tabs.get", true, Some(r#"{"id":7}"#), None)
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some(json!({ "id": 7 }))]);
        assert!(!f.registry.is_pending(RequestId(7)));
        assert!(f.diagnostics.is_empty());
    }

    #[test]
    fn empty_or_missing_payload_is_absent() {
        let f = fixture();
        let (cb1, seen1) = capture();
        let (cb2, seen2) = capture();
        f.registry.register(RequestId(1), cb1);
        f.registry.register(RequestId(2), cb2);

        f.handler.handle(RequestId(1), "tabs.remove", true, None, None).unwrap();
        f.handler.handle(RequestId(2), "tabs.remove", true, Some(""), None).unwrap();

        assert_eq!(*seen1.lock().unwrap(), vec![None]);
        assert_eq!(*seen2.lock().unwrap(), vec![None]);
    }

    #[test]
    fn failure_reports_and_skips_callback() {
        let f = fixture();
        let (cb, seen) = capture();
        f.registry.register(RequestId(3), cb);

        f.handler
            .handle(RequestId(3), "windows.get", false, None, Some("No window."))
            .unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert!(!f.registry.is_pending(RequestId(3)));
        assert_eq!(f.diagnostics.messages(), ["Error during windows.get: No window."]);
    }

    #[test]
    fn failure_without_message_uses_default() {
        let f = fixture();
        f.handler
            .handle(RequestId(9), "tabs.move", false, None, None)
            .unwrap();
        assert_eq!(f.diagnostics.messages(), ["Error during tabs.move: Unknown error."]);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let f = fixture();
        f.handler
            .handle(RequestId(404), "tabs.get", true, Some("1"), None)
            .unwrap();
        assert!(f.diagnostics.is_empty());
        assert!(f.registry.is_empty());
    }

    #[test]
    fn duplicate_response_is_ignored() {
        let f = fixture();
        let (cb, seen) = capture();
        f.registry.register(RequestId(5), cb);

        f.handler.handle(RequestId(5), "tabs.get", true, Some("1"), None).unwrap();
        f.handler.handle(RequestId(5), "tabs.get", true, Some("2"), None).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some(json!(1))]);
    }

    #[test]
    fn failing_callback_still_retires() {
        let f = fixture();
        f.registry
            .register(RequestId(6), Box::new(|_| Err::<(), BoxError>("script threw".into())));

        let err = f
            .handler
            .handle(RequestId(6), "bookmarks.get", true, Some("[]"), None)
            .unwrap_err();

        assert!(matches!(err, Error::CallbackFailed { request_id: RequestId(6), .. }));
        assert!(!f.registry.is_pending(RequestId(6)));
    }

    #[test]
    fn panicking_callback_still_retires() {
        let f = fixture();
        f.registry
            .register(RequestId(12), callback(|_| panic!("callback blew up")));

        let result = catch_unwind(AssertUnwindSafe(|| {
            f.handler
                .handle(RequestId(12), "tabs.get", true, Some("{}"), None)
        }));

        assert!(result.is_err());
        assert!(!f.registry.is_pending(RequestId(12)));
        assert!(f.registry.is_empty());
    }

    #[test]
    fn undecodable_payload_reports_and_retires() {
        let f = fixture();
        let (cb, seen) = capture();
        f.registry.register(RequestId(8), cb);

        let err = f
            .handler
            .handle(RequestId(8), "tabs.get", true, Some("{oops"), None)
            .unwrap_err();

        assert!(matches!(err, Error::Json(_)));
        assert!(seen.lock().unwrap().is_empty());
        assert!(!f.registry.is_pending(RequestId(8)));
        assert_eq!(f.diagnostics.entries()[0].kind, DiagnosticKind::DecodeFailed);
    }

    #[test]
    fn frames_are_routed_through_handle() {
        let f = fixture();
        let (cb, seen) = capture();
        f.registry.register(RequestId(11), cb);

        f.handler
            .handle_frame(&ResponseFrame::ok(RequestId(11), "windows.getAll", Some("[]".into())))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some(json!([]))]);
    }

    #[test]
    fn failed_frame_without_message_uses_default() {
        let f = fixture();
        let mut frame = ResponseFrame::err(RequestId(13), "bookmarks.move", "");
        f.handler.handle_frame(&frame).unwrap();
        frame.error = None;
        f.handler.handle_frame(&frame).unwrap();

        assert_eq!(f.diagnostics.messages(), [
            "Error during bookmarks.move: Unknown error.",
            "Error during bookmarks.move: Unknown error.",
        ]);
    }
}
