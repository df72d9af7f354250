//! Envelope-to-outcome normalization for buffered execute responses.
//!
//! The rules, in order:
//! 1. `status != "ok"` or missing/empty `data` is a failure.
//! 2. A failure prefers `service_message` as its text, appended to the
//!    generic marker; otherwise the marker stands alone.
//! 3. Trace identifiers are surfaced only when the envelope carries both
//!    the trace id and the transaction id.

use colloquy_types::action::{ExecuteEnvelope, TraceData};
use colloquy_types::fault::Fault;

use crate::outcome::ExecuteOutcome;

/// Generic marker prepended to every execute error text.
pub const EXECUTE_ERROR: &str = "An error occurred while sending your message.";

/// Error text for a failed exchange, combining the marker with the fault's
/// best diagnostic.
pub fn fault_error_text(fault: &Fault) -> String {
    format!("{EXECUTE_ERROR}\n\n{}", fault.diagnostic())
}

/// Error text for a streaming call whose response had no bytes to read.
pub fn missing_reader_text() -> String {
    format!("{EXECUTE_ERROR}\n\nCould not get a reader over the response stream")
}

/// Fold a buffered envelope into an outcome.
pub fn outcome_from_envelope(envelope: ExecuteEnvelope) -> ExecuteOutcome {
    let data = envelope.data.as_deref().filter(|d| !d.is_empty());

    match (envelope.status.as_str(), data) {
        ("ok", Some(data)) => {
            let trace = envelope.trace_data.and_then(|t| match (t.trace_id, t.transaction_id) {
                (Some(trace_id), Some(transaction_id)) => Some(TraceData {
                    trace_id,
                    transaction_id,
                }),
                _ => None,
            });
            ExecuteOutcome::buffered_ok(data, trace)
        }
        _ => match envelope.service_message {
            Some(message) => {
                ExecuteOutcome::buffered_error(format!("{EXECUTE_ERROR}\n\n{message}"))
            }
            None => ExecuteOutcome::buffered_error(EXECUTE_ERROR),
        },
    }
}
