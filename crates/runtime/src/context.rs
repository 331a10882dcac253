use std::sync::Arc;

use {hostbridge_config::RuntimeOptions, tracing::debug};

use crate::{
    codec::{Codec, JsonCodec},
    diagnostics::{Diagnostics, TracingDiagnostics},
    dispatcher::Dispatcher,
    events::EventBus,
    registry::CallbackRegistry,
    response::ResponseHandler,
};

/// Per script context state: one callback table, one id sequence, one
/// event bus. Pending callbacks are dropped with the context.
pub struct BridgeContext {
    registry: Arc<CallbackRegistry>,
    dispatcher: Dispatcher,
    responses: ResponseHandler,
    events: EventBus,
    diagnostics: Arc<dyn Diagnostics>,
}

impl BridgeContext {
    pub fn new(options: RuntimeOptions) -> Self {
        Self::builder().options(options).build()
    }

    pub fn builder() -> BridgeContextBuilder {
        BridgeContextBuilder::default()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn responses(&self) -> &ResponseHandler {
        &self.responses
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }

    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for BridgeContext {
    fn default() -> Self {
        Self::new(RuntimeOptions::default())
    }
}

impl Drop for BridgeContext {
    fn drop(&mut self) {
        let abandoned = self.registry.clear();
        if abandoned > 0 {
            debug!(abandoned, "context torn down with pending requests");
        }
    }
}

#[derive(Default)]
pub struct BridgeContextBuilder {
    options: RuntimeOptions,
    codec: Option<Arc<dyn Codec>>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl BridgeContextBuilder {
    pub fn options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn build(self) -> BridgeContext {
        let codec = self.codec.unwrap_or_else(|| Arc::new(JsonCodec));
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(TracingDiagnostics));
        let registry = Arc::new(CallbackRegistry::new());

        BridgeContext {
            dispatcher: Dispatcher::new(
                Arc::clone(&registry),
                Arc::clone(&codec),
                self.options.first_request_id,
                self.options.max_payload_bytes,
            ),
            responses: ResponseHandler::new(
                Arc::clone(&registry),
                codec,
                Arc::clone(&diagnostics),
            ),
            events: EventBus::new(Arc::clone(&diagnostics)),
            registry,
            diagnostics,
        }
    }
}
