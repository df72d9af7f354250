//! Response-body-to-ByteStream adapter.

use futures_util::StreamExt;

use colloquy_core::outcome::ByteStream;
use colloquy_types::fault::Fault;

/// Hand the response body to the caller as a [`ByteStream`].
///
/// No buffering: each chunk is passed through as it arrives, with transport
/// errors mapped into [`Fault::Transport`] items.
pub(crate) fn response_byte_stream(response: reqwest::Response) -> ByteStream {
    Box::pin(
        response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| Fault::Transport(err.to_string()))),
    )
}
