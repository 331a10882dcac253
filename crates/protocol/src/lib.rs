//! Host bridge wire definitions.
//!
//! Everything that crosses the native boundary as data is defined here. The
//! script side sends native calls, the host answers with response frames and
//! pushes event frames:
//!
//! - `NativeCallFrame`: script → host call of a native entry point
//! - `ResponseFrame`: host → script completion of a previous call
//! - `EventFrame`: host → script notification on a named channel

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const MAX_PAYLOAD_BYTES: usize = 524_288; // 512 KB

/// Reported when the host fails a request without saying why.
pub const UNKNOWN_ERROR: &str = "Unknown error.";

// ── Request ids ──────────────────────────────────────────────────────────────

/// Correlation id of one outstanding native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// A call of a native entry point, as seen on the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCallFrame {
    /// Native entry point name, e.g. `GetWindow`.
    pub entry: String,
    /// Serialized argument payload.
    pub args: String,
    #[serde(rename = "requestId")]
    pub request_id: RequestId,
    #[serde(rename = "hasCallback")]
    pub has_callback: bool,
}

/// Host → script completion of a previously dispatched call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFrame {
    #[serde(rename = "requestId")]
    pub request_id: RequestId,
    /// Operation name, used for diagnostics only.
    pub name: String,
    pub success: bool,
    /// Serialized result, present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Error message, present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseFrame {
    pub fn ok(request_id: RequestId, name: impl Into<String>, response: Option<String>) -> Self {
        Self {
            request_id,
            name: name.into(),
            success: true,
            response,
            error: None,
        }
    }

    pub fn err(request_id: RequestId, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            request_id,
            name: name.into(),
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }

    /// The error message the host reported, or [`UNKNOWN_ERROR`].
    pub fn error_message(&self) -> &str {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(UNKNOWN_ERROR)
    }
}

/// Host → script notification. Not correlated to any request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    /// Channel name, see [`channels`].
    pub event: String,
    /// Positional payload values; the shape is owned by the channel.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, args: Vec<serde_json::Value>) -> Self {
        Self {
            event: event.into(),
            args,
        }
    }
}

/// Discriminated union of everything the host can send to the script side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostFrame {
    #[serde(rename = "response")]
    Response(ResponseFrame),
    #[serde(rename = "event")]
    Event(EventFrame),
}

// ── Known channels ───────────────────────────────────────────────────────────

pub mod channels {
    /// Sends `(windowId)`. Followed by `tab-attached` and then
    /// `tab-selection-changed`.
    pub const WINDOW_CREATED: &str = "window-created";
    /// Sends `(windowId)`. Preceded by `tab-removed` and
    /// `tab-selection-changed` for each tab the window contained.
    pub const WINDOW_REMOVED: &str = "window-removed";
    /// Sends `(windowId)`.
    pub const WINDOW_FOCUS_CHANGED: &str = "window-focus-changed";

    /// Sends `({Tab})`. Never followed by `tab-attached`.
    pub const TAB_CREATED: &str = "tab-created";
    /// Sends `(tabId, {changedProps})`.
    pub const TAB_UPDATED: &str = "tab-updated";
    /// Sends `(tabId, {windowId, fromIndex, toIndex})`.
    pub const TAB_MOVED: &str = "tab-moved";
    /// Sends `(tabId, {windowId})`.
    pub const TAB_SELECTION_CHANGED: &str = "tab-selection-changed";
    /// Sends `(tabId, {newWindowId, newPosition})`.
    pub const TAB_ATTACHED: &str = "tab-attached";
    /// Sends `(tabId, {oldWindowId, oldPosition})`.
    pub const TAB_DETACHED: &str = "tab-detached";
    /// Sends `(tabId)`.
    pub const TAB_REMOVED: &str = "tab-removed";

    /// Sends `({pageActionId, tabId, tabUrl})`.
    pub const PAGE_ACTION_EXECUTED: &str = "page-action-executed";

    /// Sends `({id, title, url, parentId, index})`.
    pub const BOOKMARK_ADDED: &str = "bookmark-added";
    /// Sends `({parentId, index})`.
    pub const BOOKMARK_REMOVED: &str = "bookmark-removed";
    /// Sends `(id, {title})`.
    pub const BOOKMARK_CHANGED: &str = "bookmark-changed";
    /// Sends `({id, parentId, index, oldParentId, oldIndex})`.
    pub const BOOKMARK_MOVED: &str = "bookmark-moved";
    /// Sends `(id, [childrenIds])`.
    pub const BOOKMARK_CHILDREN_REORDERED: &str = "bookmark-children-reordered";

    pub const CHANNEL_CONNECT: &str = "channel-connect";
}

pub const KNOWN_CHANNELS: &[&str] = &[
    channels::WINDOW_CREATED,
    channels::WINDOW_REMOVED,
    channels::WINDOW_FOCUS_CHANGED,
    channels::TAB_CREATED,
    channels::TAB_UPDATED,
    channels::TAB_MOVED,
    channels::TAB_SELECTION_CHANGED,
    channels::TAB_ATTACHED,
    channels::TAB_DETACHED,
    channels::TAB_REMOVED,
    channels::PAGE_ACTION_EXECUTED,
    channels::BOOKMARK_ADDED,
    channels::BOOKMARK_REMOVED,
    channels::BOOKMARK_CHANGED,
    channels::BOOKMARK_MOVED,
    channels::BOOKMARK_CHILDREN_REORDERED,
    channels::CHANNEL_CONNECT,
];

// ── Schema discovery ─────────────────────────────────────────────────────────

/// Describes one operation of the API surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Script-facing name, e.g. `tabs.get`.
    pub name: String,
    /// Native entry point the operation dispatches to.
    pub native: String,
    /// One rendered schema per positional parameter.
    #[serde(rename = "paramsSchema")]
    pub params_schema: Vec<serde_json::Value>,
}

/// Describes one host-push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ── Response frames ────────────────────────────────────────────────

    #[test]
    fn response_frame_ok_omits_error() {
        let frame = ResponseFrame::ok(RequestId(7), "tabs.get", Some("{\"id\":1}".into()));
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["requestId"], 7);
        assert_eq!(json["success"], true);
        assert!(!json.as_object().unwrap().contains_key("error"));
    }

    #[test]
    fn response_frame_err_omits_response() {
        let frame = ResponseFrame::err(RequestId(3), "windows.remove", "No window with id: 9.");
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No window with id: 9.");
        assert!(!json.as_object().unwrap().contains_key("response"));
    }

    #[test]
    fn error_message_defaults_when_missing_or_empty() {
        let mut frame = ResponseFrame::err(RequestId(1), "tabs.move", "");
        assert_eq!(frame.error_message(), UNKNOWN_ERROR);
        frame.error = None;
        assert_eq!(frame.error_message(), UNKNOWN_ERROR);
        frame.error = Some("boom".into());
        assert_eq!(frame.error_message(), "boom");
    }

    #[test]
    fn native_call_frame_uses_camel_case() {
        let frame = NativeCallFrame {
            entry: "GetTab".into(),
            args: "5".into(),
            request_id: RequestId(12),
            has_callback: true,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["requestId"], 12);
        assert_eq!(json["hasCallback"], true);
    }

    // ── Host frames ────────────────────────────────────────────────────

    #[test]
    fn host_frame_parses_response() {
        let json = r#"{"type":"response","requestId":4,"name":"tabs.get","success":true,"response":"{}"}"#;
        let frame: HostFrame = serde_json::from_str(json).unwrap();
        match frame {
            HostFrame::Response(inner) => {
                assert_eq!(inner.request_id, RequestId(4));
                assert!(inner.success);
                assert_eq!(inner.response.as_deref(), Some("{}"));
            },
            _ => panic!("expected Response frame"),
        }
    }

    #[test]
    fn host_frame_parses_event_without_args() {
        let json = r#"{"type":"event","event":"window-created"}"#;
        let frame: HostFrame = serde_json::from_str(json).unwrap();
        match frame {
            HostFrame::Event(inner) => {
                assert_eq!(inner.event, channels::WINDOW_CREATED);
                assert!(inner.args.is_empty());
            },
            _ => panic!("expected Event frame"),
        }
    }

    // ── Channels ───────────────────────────────────────────────────────

    #[test]
    fn known_channels_are_unique() {
        let mut names = KNOWN_CHANNELS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), KNOWN_CHANNELS.len());
    }
}
