//! The shared fault value for failed gateway calls.
//!
//! Knowledge-base and conversation operations return faults as values
//! (`Result<T, Fault>`) rather than panicking or converting them into a
//! lossy string; callers branch on the shape of the result. The connector
//! execute path folds faults into its outcome instead and uses
//! [`Fault::diagnostic`] to assemble the human-readable error text.

use thiserror::Error;

/// A failed gateway call.
///
/// Preserves whatever diagnostics the underlying failure carried: the
/// transport error text, the HTTP status code and decoded body message,
/// or the fact that the caller cancelled the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The request never produced an HTTP response.
    #[error("transport fault: {0}")]
    Transport(String),

    /// The gateway answered with a non-success HTTP status.
    #[error("gateway returned HTTP {status}")]
    Status {
        status: u16,
        /// The `message` field of the error body, or the raw body text
        /// when it was non-empty but not the expected JSON shape.
        message: Option<String>,
    },

    /// The response arrived but its body could not be decoded.
    #[error("failed to decode gateway response: {0}")]
    Decode(String),

    /// The caller cancelled the call before it completed.
    #[error("call cancelled")]
    Cancelled,
}

impl Fault {
    /// Best available human-readable text for this fault.
    ///
    /// Prefers the body message attached to a status fault over the bare
    /// status line.
    pub fn diagnostic(&self) -> String {
        match self {
            Fault::Transport(message) => message.clone(),
            Fault::Status { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("HTTP {status}")),
            Fault::Decode(message) => message.clone(),
            Fault::Cancelled => "the call was cancelled".to_string(),
        }
    }

    /// Status code of a [`Fault::Status`], if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Fault::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
