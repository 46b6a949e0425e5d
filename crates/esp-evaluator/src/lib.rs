// SPDX-License-Identifier: MIT OR Apache-2.0
//! esp-evaluator
#![warn(missing_docs)]
//!
//! Evaluator lifecycle for the Evaluator Server Protocol: binds
//! `CreateEvaluatorRequest`s to running evaluator identities, dispatches
//! `EvaluateRequest`s to a pluggable evaluation engine, enforces per-
//! evaluation timeouts, and routes the engine's module/resource read
//! callbacks back over the transport (`spec.md` §4.3).

mod callbacks;
mod context;
mod cycle;
mod engine;
mod host;
mod lifecycle;
mod registry;

pub use callbacks::TransportReadCallbacks;
pub use context::EvaluatorContext;
pub use cycle::find_cycle;
pub use engine::{EvaluationEngine, ReadCallbacks, UnimplementedEngine};
pub use host::EvaluatorHost;
pub use lifecycle::{EvaluatorLifecycle, EvaluatorState, LifecycleError, LifecycleTransition};
pub use registry::EvaluatorRegistry;
