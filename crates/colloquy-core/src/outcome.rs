//! The dual buffered/streamed result of a connector execute call.
//!
//! The two delivery modes are enum variants rather than a flag pair, so a
//! result can never carry both a terminal string and a live stream. The
//! error flag stays orthogonal: either variant may be an error.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use colloquy_types::action::TraceData;
use colloquy_types::fault::Fault;

/// Live handle over the gateway's response bytes.
///
/// Ownership transfers fully to the caller, who reads it to completion or
/// drops it; the client keeps no buffer and does no cleanup after hand-off.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Fault>> + Send + 'static>>;

/// Result of a connector execute call. Never an `Err` -- every failure mode
/// folds into the `error` flag of one of the variants.
pub enum ExecuteOutcome {
    /// Terminal string payload, plus trace identifiers when the gateway
    /// reported both of them.
    Buffered {
        text: String,
        error: bool,
        trace: Option<TraceData>,
    },
    /// Incremental byte delivery.
    Streamed { stream: ByteStream, error: bool },
}

impl ExecuteOutcome {
    pub fn buffered_ok(text: impl Into<String>, trace: Option<TraceData>) -> Self {
        ExecuteOutcome::Buffered {
            text: text.into(),
            error: false,
            trace,
        }
    }

    pub fn buffered_error(text: impl Into<String>) -> Self {
        ExecuteOutcome::Buffered {
            text: text.into(),
            error: true,
            trace: None,
        }
    }

    pub fn streamed(stream: ByteStream) -> Self {
        ExecuteOutcome::Streamed {
            stream,
            error: false,
        }
    }

    /// A stream recovered from a failed exchange -- the caller still gets
    /// incremental bytes, but they describe the failure.
    pub fn streamed_error(stream: ByteStream) -> Self {
        ExecuteOutcome::Streamed {
            stream,
            error: true,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ExecuteOutcome::Streamed { .. })
    }

    pub fn is_error(&self) -> bool {
        match self {
            ExecuteOutcome::Buffered { error, .. } => *error,
            ExecuteOutcome::Streamed { error, .. } => *error,
        }
    }

    /// Buffered payload text, if this outcome is buffered.
    pub fn text(&self) -> Option<&str> {
        match self {
            ExecuteOutcome::Buffered { text, .. } => Some(text),
            ExecuteOutcome::Streamed { .. } => None,
        }
    }

    /// Trace identifiers, if the buffered response carried both.
    pub fn trace(&self) -> Option<&TraceData> {
        match self {
            ExecuteOutcome::Buffered { trace, .. } => trace.as_ref(),
            ExecuteOutcome::Streamed { .. } => None,
        }
    }

    /// Consume a streamed outcome, handing the stream to the caller.
    pub fn into_stream(self) -> Option<ByteStream> {
        match self {
            ExecuteOutcome::Streamed { stream, .. } => Some(stream),
            ExecuteOutcome::Buffered { .. } => None,
        }
    }
}

// Manual Debug: the stream handle is opaque.
impl fmt::Debug for ExecuteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteOutcome::Buffered { text, error, trace } => f
                .debug_struct("Buffered")
                .field("text", text)
                .field("error", error)
                .field("trace", trace)
                .finish(),
            ExecuteOutcome::Streamed { error, .. } => f
                .debug_struct("Streamed")
                .field("error", error)
                .finish_non_exhaustive(),
        }
    }
}
