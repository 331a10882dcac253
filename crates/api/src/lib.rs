//! The script-facing API surface: windows, tabs, page actions and
//! bookmarks, each bound to a native entry point.
//!
//! Feature flags:
//! - `metrics`: forwards to `hostbridge-runtime/metrics`

pub mod error;
pub mod events;
pub mod operations;
pub mod surface;

pub use {
    error::{Error, Result},
    events::{CHANNELS, describe_channels},
    operations::{OPERATIONS, OperationDef, Payload},
    surface::ApiSurface,
};
