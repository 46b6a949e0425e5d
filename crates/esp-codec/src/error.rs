// SPDX-License-Identifier: MIT OR Apache-2.0
//! Codec-level error type: either a malformed frame or an I/O fault.

use thiserror::Error;

/// Failure while decoding or encoding a single frame.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame was malformed; non-fatal, the caller should discard it and
    /// keep reading (`spec.md` §4.5).
    #[error(transparent)]
    Decode(#[from] esp_error::DecodeError),

    /// The underlying stream faulted; fatal, the caller should close the
    /// transport (`spec.md` §4.2 "Failure semantics").
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
