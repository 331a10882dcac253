//! Request/response correlation and notification fan-out between script
//! code and a native host.
//!
//! Feature flags:
//! - `metrics`: counters and a pending-request gauge via `hostbridge-metrics`

pub mod codec;
pub mod context;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod native;
pub mod registry;
pub mod request_id;
pub mod response;

pub use {
    codec::{Codec, JsonCodec},
    context::{BridgeContext, BridgeContextBuilder},
    diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, MemoryDiagnostics, TracingDiagnostics},
    dispatcher::{Dispatcher, PendingResponse},
    error::{BoxError, Error, Result},
    events::{EventBus, ListenerId, ListenerResult, PublishReport},
    native::{NativeEntry, NativeHost, RecordingEntry, RecordingHost},
    registry::{Callback, CallbackRegistry, CallbackResult, RetireGuard, callback},
    request_id::RequestIdAllocator,
    response::ResponseHandler,
};
