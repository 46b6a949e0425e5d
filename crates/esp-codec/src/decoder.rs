// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streaming frame decoder over an async byte source.

use crate::convert::frame_to_message;
use crate::error::CodecError;
use esp_core::Message;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Frames larger than this are treated as a stream fault rather than being
/// buffered indefinitely.
const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Reads one `[type_code, body_map]` frame at a time from an
/// [`AsyncRead`] source, buffering partial reads until a complete
/// MessagePack value is available (`spec.md` §4.1, §4.2).
pub struct Decoder<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> Decoder<R> {
    /// Wrap a byte source in a frame decoder.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// Read and decode the next frame, or `Ok(None)` on a clean end-of-stream
    /// (no bytes buffered and the source reports EOF).
    ///
    /// A [`CodecError::Decode`] is non-fatal: the offending bytes are already
    /// consumed, and the caller may keep calling `decode` to read the next
    /// frame. A [`CodecError::Io`] is fatal; the caller should close the
    /// transport (`spec.md` §4.2 "Failure semantics").
    pub async fn decode(&mut self) -> Result<Option<Message>, CodecError> {
        loop {
            if !self.buf.is_empty() {
                let mut cursor = std::io::Cursor::new(self.buf.as_slice());
                match rmpv::decode::read_value(&mut cursor) {
                    Ok(value) => {
                        let consumed = cursor.position() as usize;
                        self.buf.drain(0..consumed);
                        return frame_to_message(value).map(Some).map_err(CodecError::from);
                    }
                    Err(_) if self.buf.len() >= MAX_FRAME_BYTES => {
                        return Err(CodecError::Io(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            "frame exceeds maximum buffered size",
                        )));
                    }
                    Err(_) => {
                        // Incomplete value; fall through and read more bytes.
                    }
                }
            }

            let mut chunk = [0u8; 8192];
            let n = self.inner.read(&mut chunk).await?;
            if n == 0 {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Err(CodecError::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "stream closed mid-frame",
                    )))
                };
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}
