// SPDX-License-Identifier: MIT OR Apache-2.0
//! esp-transport
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Full-duplex transport for the Evaluator Server Protocol: demultiplexes
//! one-ways, inbound requests, and correlated responses over a decoder+
//! encoder pair, or an in-memory twin for tests and embedded hosts.

mod error;
mod transport;
mod twin;

pub use error::TransportError;
pub use transport::{ErrorHandler, OneWayHandler, RequestHandler, Transport};
pub use twin::{pair, TwinTransport};
