// SPDX-License-Identifier: MIT OR Apache-2.0
//! The boundary between this crate and the Pkl language itself.
//!
//! `spec.md` §1 treats "the Pkl language itself (lexer, parser CST, type
//! checker, VM)" as an opaque engine behind the `Evaluate` operation; this
//! module is that boundary. [`EvaluationEngine`] is the trait a real Pkl VM
//! implements; everything else in this crate — lifecycle, registry, request
//! dispatch, timeout enforcement, cycle detection — is the part of ESP that
//! is in scope, and works against any engine satisfying this trait.

use crate::context::EvaluatorContext;
use async_trait::async_trait;
use esp_core::{EvaluateRequest, PathElement};

/// Callbacks an [`EvaluationEngine`] uses to resolve module imports and
/// resource reads back through the client, during one `evaluate` call.
///
/// Implementations issue `Read*Request`/`List*Request` messages over the
/// transport and await the correlated response; the engine itself never
/// touches the transport directly.
#[async_trait]
pub trait ReadCallbacks: Send + Sync {
    /// Read a resource URI served by one of the client's registered
    /// resource readers.
    async fn read_resource(&self, uri: &str) -> Result<Vec<u8>, String>;

    /// Read the source text of a module URI served by one of the client's
    /// registered module readers.
    async fn read_module(&self, uri: &str) -> Result<String, String>;

    /// List the direct children of a resource directory URI.
    async fn list_resources(&self, uri: &str) -> Result<Vec<PathElement>, String>;

    /// List the direct children of a module directory URI.
    async fn list_modules(&self, uri: &str) -> Result<Vec<PathElement>, String>;
}

/// The pluggable evaluation boundary. A real implementation parses, type
/// checks, and runs Pkl source; this crate ships none, only the contract
/// and the protocol plumbing around it.
#[async_trait]
pub trait EvaluationEngine: Send + Sync {
    /// Evaluate `request` against `ctx`'s configuration, using `callbacks`
    /// for any module import or resource read the evaluation needs.
    /// Returns the rendered result bytes, or the text of an evaluator-level
    /// error (parse error, type error, uncaught exception) — not a protocol
    /// fault, which is reported separately.
    async fn evaluate(
        &self,
        ctx: &EvaluatorContext,
        request: &EvaluateRequest,
        callbacks: &(dyn ReadCallbacks + Send + Sync),
    ) -> Result<Vec<u8>, String>;
}

/// The engine installed when a host hasn't wired in a real one. Every
/// evaluation fails with a stable message, so a server that forgot to
/// configure an engine fails loudly rather than fabricating results.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedEngine;

#[async_trait]
impl EvaluationEngine for UnimplementedEngine {
    async fn evaluate(
        &self,
        _ctx: &EvaluatorContext,
        _request: &EvaluateRequest,
        _callbacks: &(dyn ReadCallbacks + Send + Sync),
    ) -> Result<Vec<u8>, String> {
        Err("evaluationEngineNotConfigured".to_string())
    }
}
