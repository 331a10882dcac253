use serde::{Deserialize, Serialize};

use hostbridge_protocol::MAX_PAYLOAD_BYTES;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostbridgeConfig {
    pub bridge: BridgeConfig,
    pub logging: LoggingConfig,
}

/// Correlation settings for one bridge context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// First request id handed out by a new context.
    pub first_request_id: u64,
    /// Upper bound on a serialized argument payload. `None` disables the check.
    pub max_payload_bytes: Option<usize>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            first_request_id: 0,
            max_payload_bytes: Some(MAX_PAYLOAD_BYTES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}

impl HostbridgeConfig {
    /// The subset of settings consumed by the runtime.
    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            first_request_id: self.bridge.first_request_id,
            max_payload_bytes: self.bridge.max_payload_bytes,
        }
    }
}

/// Settings the runtime reads when a context is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub first_request_id: u64,
    pub max_payload_bytes: Option<usize>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        HostbridgeConfig::default().runtime_options()
    }
}
