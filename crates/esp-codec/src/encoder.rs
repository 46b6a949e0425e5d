// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame encoder over an async byte sink.

use crate::convert::message_to_frame;
use crate::error::CodecError;
use esp_core::Message;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes one `[type_code, body_map]` frame at a time to an [`AsyncWrite`]
/// sink, flushing after every frame (`spec.md` §4.1 "Encoder contract").
pub struct Encoder<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> Encoder<W> {
    /// Wrap a byte sink in a frame encoder.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Serialize and write `msg`, then flush.
    pub async fn encode(&mut self, msg: &Message) -> Result<(), CodecError> {
        let frame = message_to_frame(msg).map_err(|e| {
            esp_error::DecodeError::InvalidBody {
                message: msg.type_name(),
                reason: e.to_string(),
            }
        })?;
        let mut bytes = Vec::new();
        rmpv::encode::write_value(&mut bytes, &frame).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await?;
        Ok(())
    }
}
