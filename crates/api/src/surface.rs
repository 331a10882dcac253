use std::sync::Arc;

use {
    hostbridge_protocol::{EventDescriptor, KNOWN_CHANNELS, OperationDescriptor, RequestId},
    hostbridge_runtime::{BridgeContext, Callback, NativeHost},
    hostbridge_schema::{Arg, SchemaKind, validate_args},
    serde_json::Value,
    tracing::debug,
};

use crate::{
    error::{Error, Result},
    events::describe_channels,
    operations::{self, OperationDef, Payload},
};

/// Script-facing entry point: `call("tabs.get", args)`.
///
/// Every call is validated against the operation's schemas before anything
/// is allocated or sent.
#[derive(Clone)]
pub struct ApiSurface {
    context: Arc<BridgeContext>,
    host: Arc<dyn NativeHost>,
}

impl ApiSurface {
    /// Bind the surface to a context. Declares every well-known channel on
    /// the context's event bus.
    pub fn new(context: Arc<BridgeContext>, host: Arc<dyn NativeHost>) -> Self {
        for channel in KNOWN_CHANNELS {
            context.events().declare(channel);
        }
        Self { context, host }
    }

    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.context
    }

    pub fn call(&self, name: &str, args: Vec<Arg<Callback>>) -> Result<RequestId> {
        let def = operations::find(name).ok_or_else(|| Error::UnknownOperation(name.into()))?;
        let schemas = def.schemas();
        validate_args(&args, &schemas)?;

        let mut values = Vec::with_capacity(args.len());
        let mut callback = None;
        for (arg, schema) in args.into_iter().zip(&schemas) {
            match (arg, &schema.kind) {
                (Arg::Function(f), SchemaKind::Callback) => callback = Some(f),
                (arg, _) => values.push(arg.into_value().unwrap_or(Value::Null)),
            }
        }
        let payload = pack(def, values);

        let entry = self
            .host
            .entry_point(def.native)
            .ok_or(Error::MissingEntryPoint {
                operation: def.name,
                native: def.native,
            })?;

        let request_id = self
            .context
            .dispatcher()
            .dispatch(entry.as_ref(), &payload, callback)?;
        debug!(operation = def.name, %request_id, "operation dispatched");
        Ok(request_id)
    }

    /// Operation descriptors, in table order.
    pub fn describe(&self) -> Vec<OperationDescriptor> {
        operations::OPERATIONS
            .iter()
            .map(|def| OperationDescriptor {
                name: def.name.to_string(),
                native: def.native.to_string(),
                params_schema: def.schemas().iter().map(|s| s.describe()).collect(),
            })
            .collect()
    }

    pub fn describe_events(&self) -> Vec<EventDescriptor> {
        describe_channels()
    }
}

fn pack(def: &OperationDef, values: Vec<Value>) -> Value {
    let mut values = values.into_iter();
    match def.payload {
        Payload::None => Value::Null,
        Payload::Single => values.next().unwrap_or(Value::Null),
        Payload::Pair => Value::Array(vec![
            values.next().unwrap_or(Value::Null),
            values.next().unwrap_or(Value::Null),
        ]),
    }
}
