// SPDX-License-Identifier: MIT OR Apache-2.0
//! esp-cli
//!
//! Library half of the `esp-cli` binary, split out so its flag-resolution
//! logic can be exercised without spawning the process.

pub mod config;
