//! JSON-lines transcripts: one step per line, blank lines and `#` comments
//! ignored.

use {
    anyhow::{Context, Result},
    hostbridge_api::{ApiSurface, operations},
    hostbridge_protocol::{EventFrame, ResponseFrame},
    hostbridge_runtime::{Callback, RecordingHost, callback},
    hostbridge_schema::{Arg, SchemaKind},
    serde::Deserialize,
    serde_json::Value,
    tracing::{info, warn},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Call {
        call: String,
        #[serde(default)]
        args: Vec<Value>,
        #[serde(default)]
        callback: bool,
    },
    Respond {
        respond: ResponseFrame,
    },
    Event {
        event: EventFrame,
    },
    Subscribe {
        subscribe: String,
    },
}

/// Parse every step, failing on the first malformed line.
pub fn parse(raw: &str) -> Result<Vec<Step>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: not a valid step", n + 1))
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub calls: usize,
    pub rejected: usize,
    pub responses: usize,
    pub events: usize,
}

pub struct Replayer {
    api: ApiSurface,
    host: RecordingHost,
    summary: Summary,
}

impl Replayer {
    pub fn new(api: ApiSurface, host: RecordingHost) -> Self {
        Self {
            api,
            host,
            summary: Summary::default(),
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn run(&mut self, steps: Vec<Step>) {
        for step in steps {
            self.step(step);
        }
    }

    fn step(&mut self, step: Step) {
        match step {
            Step::Call {
                call,
                args,
                callback: with_callback,
            } => self.call(&call, args, with_callback),
            Step::Respond { respond } => {
                self.summary.responses += 1;
                if let Err(err) = self.api.context().responses().handle_frame(&respond) {
                    warn!(request_id = %respond.request_id, error = %err, "response handling failed");
                }
            },
            Step::Event { event } => {
                self.summary.events += 1;
                let report = self.api.context().events().publish_frame(&event);
                info!(
                    channel = %event.event,
                    delivered = report.delivered,
                    failed = report.failed,
                    "event published"
                );
            },
            Step::Subscribe { subscribe } => {
                let channel = subscribe.clone();
                self.api.context().events().on(&subscribe, move |args| {
                    let args = Value::from(args.to_vec());
                    info!(channel = %channel, args = %args, "listener invoked");
                });
            },
        }
    }

    fn call(&mut self, name: &str, args: Vec<Value>, with_callback: bool) {
        let args = with_callback_arg(name, args, with_callback);
        match self.api.call(name, args) {
            Ok(_) => {
                self.summary.calls += 1;
                for frame in self.host.take_calls() {
                    info!(
                        operation = name,
                        entry = %frame.entry,
                        args = %frame.args,
                        request_id = %frame.request_id,
                        has_callback = frame.has_callback,
                        "native call"
                    );
                }
            },
            Err(err) => {
                self.summary.rejected += 1;
                warn!(operation = name, error = %err, "call rejected");
            },
        }
    }
}

/// Turn transcript values into call arguments, placing a logging callback
/// at the operation's callback position when asked for.
fn with_callback_arg(name: &str, args: Vec<Value>, with_callback: bool) -> Vec<Arg<Callback>> {
    let mut args: Vec<Arg<Callback>> = args.into_iter().map(Arg::Value).collect();
    if !with_callback {
        return args;
    }
    let position = operations::find(name)
        .and_then(|def| {
            def.schemas()
                .iter()
                .position(|s| matches!(s.kind, SchemaKind::Callback))
        })
        .unwrap_or(args.len());
    while args.len() < position {
        args.push(Arg::Value(Value::Null));
    }
    let operation = name.to_string();
    let cb = callback(move |value| {
        let payload = value.map_or_else(|| "none".to_string(), |v| v.to_string());
        info!(operation = %operation, payload = %payload, "callback invoked");
    });
    if position < args.len() {
        args[position] = Arg::Function(cb);
    } else {
        args.push(Arg::Function(cb));
    }
    args
}
