// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared serde adapters for `std::time::Duration`, encoded as whole seconds.
//!
//! ESP's `timeoutSeconds` field is an integer number of seconds on the wire
//! (`spec.md` §3), not milliseconds, so these adapters round to the nearest
//! second rather than truncating sub-second precision silently.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Serde helpers for encoding `Duration` values as integer seconds.
pub mod duration_seconds {
    use super::*;

    /// Serialize a duration as whole seconds (`u64`).
    pub fn serialize<S: Serializer>(val: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        val.as_secs().serialize(ser)
    }

    /// Deserialize a duration from whole seconds (`u64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs: u64 = u64::deserialize(de)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Serde helpers for encoding `Option<Duration>` values as integer seconds.
///
/// `None` is omitted entirely under ESP's nullable-as-absent convention
/// (`spec.md` §9); this module still emits an explicit `null` when used
/// outside a `#[skip_serializing_none]`-annotated struct (e.g. plain JSON
/// config), matching the teacher's `option_duration_millis`.
pub mod option_duration_seconds {
    use super::*;

    /// Serialize an optional duration as optional whole seconds (`Option<u64>`).
    pub fn serialize<S: Serializer>(val: &Option<Duration>, ser: S) -> Result<S::Ok, S::Error> {
        match val {
            Some(d) => d.as_secs().serialize(ser),
            None => ser.serialize_none(),
        }
    }

    /// Deserialize an optional duration from optional whole seconds (`Option<u64>`).
    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(de)?;
        Ok(opt.map(Duration::from_secs))
    }
}
