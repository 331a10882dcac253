use hostbridge_protocol::RequestId;

/// Error type returned by completion callbacks and event listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("callback for request {request_id} ({operation}) failed: {source}")]
    CallbackFailed {
        request_id: RequestId,
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("request {request_id} was retired without a response")]
    ResponseDropped { request_id: RequestId },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn callback_failure_keeps_source() {
        let err = Error::CallbackFailed {
            request_id: RequestId(9),
            operation: "tabs.get".into(),
            source: "tab vanished".into(),
        };
        assert_eq!(
            err.to_string(),
            "callback for request 9 (tabs.get) failed: tab vanished"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
