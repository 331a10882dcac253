//! Metric names and facade re-exports for the host bridge.
//!
//! Recording goes through the `metrics` facade, so without an installed
//! recorder every call is a no-op. Exporters are the embedder's business.

pub use metrics::{counter, gauge};

/// Request/response correlation.
pub mod bridge {
    /// Native calls issued by the dispatcher.
    pub const REQUESTS_DISPATCHED_TOTAL: &str = "hostbridge_requests_dispatched_total";
    /// Responses delivered by the host, labelled by `outcome`.
    pub const RESPONSES_TOTAL: &str = "hostbridge_responses_total";
    /// Requests currently waiting for a response.
    pub const PENDING_REQUESTS: &str = "hostbridge_pending_requests";
}

/// Host-push notifications.
pub mod events {
    /// Notifications published, labelled by `channel`.
    pub const PUBLISHED_TOTAL: &str = "hostbridge_events_published_total";
    /// Listener invocations that failed or panicked.
    pub const LISTENER_FAILURES_TOTAL: &str = "hostbridge_listener_failures_total";
}

/// Values for the `outcome` label of [`bridge::RESPONSES_TOTAL`].
pub mod outcome {
    pub const DELIVERED: &str = "delivered";
    pub const NO_CALLBACK: &str = "no_callback";
    pub const HOST_ERROR: &str = "host_error";
    pub const CALLBACK_ERROR: &str = "callback_error";
    pub const DECODE_ERROR: &str = "decode_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_share_the_crate_prefix() {
        for name in [
            bridge::REQUESTS_DISPATCHED_TOTAL,
            bridge::RESPONSES_TOTAL,
            bridge::PENDING_REQUESTS,
            events::PUBLISHED_TOTAL,
            events::LISTENER_FAILURES_TOTAL,
        ] {
            assert!(name.starts_with("hostbridge_"), "{name}");
        }
    }

    #[test]
    fn recording_without_a_recorder_is_a_no_op() {
        counter!(bridge::REQUESTS_DISPATCHED_TOTAL).increment(1);
        gauge!(bridge::PENDING_REQUESTS).set(0.0);
    }
}
