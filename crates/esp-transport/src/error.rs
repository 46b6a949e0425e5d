// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transport-level error type.

use thiserror::Error;

/// Failure reported by [`crate::Transport`] operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A frame failed to decode or the stream faulted.
    #[error(transparent)]
    Codec(#[from] esp_codec::CodecError),

    /// A semantic protocol violation (unknown request id, unhandled type).
    #[error(transparent)]
    Protocol(#[from] esp_error::ProtocolError),

    /// The transport was closed while a request was in flight, or before a
    /// reply could be sent.
    #[error("transport closed")]
    Closed,

    /// `start` was called a second time on the same transport.
    #[error("transport already started")]
    AlreadyStarted,
}
