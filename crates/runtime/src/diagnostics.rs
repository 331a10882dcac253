//! Write-only channel for failures nobody else gets to see.
//!
//! Host-reported errors, undecodable payloads and failing listeners have no
//! caller to return to, so they are reported here.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use {
    hostbridge_protocol::RequestId,
    tracing::{error, warn},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The host completed a request with `success = false`.
    HostError,
    /// A success payload could not be decoded.
    DecodeFailed,
    /// An event listener returned an error or panicked.
    ListenerFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Operation name or channel name.
    pub subject: String,
    pub request_id: Option<RequestId>,
    pub message: String,
}

impl Diagnostic {
    pub fn host_error(request_id: RequestId, operation: &str, error: &str) -> Self {
        Self {
            kind: DiagnosticKind::HostError,
            subject: operation.to_string(),
            request_id: Some(request_id),
            message: format!("Error during {operation}: {error}"),
        }
    }

    pub fn decode_failed(request_id: RequestId, operation: &str, error: &dyn fmt::Display) -> Self {
        Self {
            kind: DiagnosticKind::DecodeFailed,
            subject: operation.to_string(),
            request_id: Some(request_id),
            message: format!("Error decoding response for {operation}: {error}"),
        }
    }

    pub fn listener_failed(channel: &str, error: &dyn fmt::Display) -> Self {
        Self {
            kind: DiagnosticKind::ListenerFailed,
            subject: channel.to_string(),
            request_id: None,
            message: format!("Error in event handler for {channel}: {error}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        let request_id = diagnostic.request_id.map(RequestId::get);
        match diagnostic.kind {
            DiagnosticKind::ListenerFailed => {
                warn!(channel = %diagnostic.subject, "{}", diagnostic.message);
            },
            DiagnosticKind::HostError | DiagnosticKind::DecodeFailed => {
                error!(
                    operation = %diagnostic.subject,
                    request_id,
                    "{}",
                    diagnostic.message
                );
            },
        }
    }
}

/// Collects diagnostics in memory; also forwards them to `tracing`.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|d| d.message).collect()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        TracingDiagnostics.report(diagnostic);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}
