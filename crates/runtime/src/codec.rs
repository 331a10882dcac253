use serde_json::Value;

use crate::error::Result;

/// Text encoding used on the native boundary.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String>;
    fn decode(&self, raw: &str) -> Result<Value>;
}

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> Result<Value> {
        Ok(serde_json::from_str(raw)?)
    }
}
