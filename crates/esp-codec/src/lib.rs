// SPDX-License-Identifier: MIT OR Apache-2.0
//! esp-codec
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! MessagePack frame codec for the Evaluator Server Protocol.
//! Current transport: `[type_code, body_map]` frames over an async byte stream.

mod convert;
mod decoder;
mod encoder;
mod error;

pub use convert::{frame_to_message, message_to_frame};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::CodecError;
