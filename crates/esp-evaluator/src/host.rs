// SPDX-License-Identifier: MIT OR Apache-2.0
//! The server side of the transport: dispatches `CreateEvaluatorRequest`,
//! `EvaluateRequest`, and `CloseEvaluator` to the evaluator registry, and
//! enforces per-evaluation timeouts (`spec.md` §4.3).
//!
//! Reverse-direction traffic — `ReadResourceRequest`/`ReadModuleRequest`/
//! `ListResourcesRequest`/`ListModulesRequest` issued by this host, and their
//! client-side responses — needs no dispatch logic here: `Transport`
//! already demultiplexes responses by `request_id` (see
//! [`esp_transport::Transport::send_request`]), so [`TransportReadCallbacks`]
//! uses that machinery directly instead of this module re-implementing it.

use crate::callbacks::TransportReadCallbacks;
use crate::context::EvaluatorContext;
use crate::cycle::find_cycle;
use crate::engine::EvaluationEngine;
use crate::lifecycle::EvaluatorState;
use crate::registry::EvaluatorRegistry;
use esp_core::{CloseEvaluator, CreateEvaluatorRequest, CreateEvaluatorResponse, EvaluateRequest, EvaluateResponse, Message};
use esp_error::{ErrorMessage, ProtocolError};
use esp_resolver::{DiskCachedResolver, InMemoryResolver, PackageResolver};
use esp_transport::{Transport, TransportError};
use serde_bytes::ByteBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

struct Inner<R, W> {
    transport: Transport<R, W>,
    registry: EvaluatorRegistry,
    engine: Arc<dyn EvaluationEngine>,
    next_request_id: Arc<AtomicU64>,
}

/// Wires a [`Transport`] to the evaluator registry and a pluggable
/// [`EvaluationEngine`]. Cloning is cheap; all clones share the same
/// registry and transport.
pub struct EvaluatorHost<R, W> {
    inner: Arc<Inner<R, W>>,
}

impl<R, W> Clone for EvaluatorHost<R, W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, W> EvaluatorHost<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Build a host bound to `transport`, dispatching evaluations to
    /// `engine`. Call [`EvaluatorHost::start`] to begin serving.
    #[must_use]
    pub fn new(transport: Transport<R, W>, engine: Arc<dyn EvaluationEngine>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                registry: EvaluatorRegistry::new(),
                engine,
                next_request_id: Arc::new(AtomicU64::new(1)),
            }),
        }
    }

    /// Install the transport's inbound handlers and begin serving. See
    /// [`Transport::start`] for re-entrancy rules.
    pub fn start(&self) -> Result<(), TransportError> {
        let one_way_host = self.clone();
        let request_host = self.clone();
        self.inner.transport.start(
            Box::new(move |msg| {
                let host = one_way_host.clone();
                tokio::spawn(async move { host.handle_one_way(msg).await });
            }),
            Box::new(move |msg| {
                let host = request_host.clone();
                tokio::spawn(async move { host.handle_request(msg).await });
            }),
        )
    }

    /// Ids of all currently live evaluators.
    pub async fn evaluator_ids(&self) -> Vec<i64> {
        self.inner.registry.ids().await
    }

    async fn handle_one_way(&self, msg: Message) {
        if let Message::CloseEvaluator(CloseEvaluator { evaluator_id }) = msg {
            self.inner.registry.remove(evaluator_id).await;
        }
    }

    async fn handle_request(&self, msg: Message) {
        match msg {
            Message::CreateEvaluatorRequest(req) => self.handle_create(req).await,
            Message::EvaluateRequest(req) => self.handle_evaluate(req).await,
            other => {
                warn!(
                    target: "esp_evaluator",
                    variant = other.type_name(),
                    "request variant is not handled by the evaluator host"
                );
            }
        }
    }

    async fn handle_create(&self, req: CreateEvaluatorRequest) {
        let response = match self.accept(&req).await {
            Ok(context) => {
                let evaluator_id = self.inner.registry.insert(context).await;
                CreateEvaluatorResponse {
                    request_id: req.request_id,
                    evaluator_id: Some(evaluator_id),
                    error: None,
                }
            }
            Err(message_name) => CreateEvaluatorResponse {
                request_id: req.request_id,
                evaluator_id: None,
                error: Some(message_name),
            },
        };
        let _ = self
            .inner
            .transport
            .send_response(Message::CreateEvaluatorResponse(response))
            .await;
    }

    async fn accept(&self, req: &CreateEvaluatorRequest) -> Result<EvaluatorContext, String> {
        if let Some(project) = &req.project {
            if let Some(cycle) = find_cycle(project) {
                let violation = ProtocolError::Violation(format!(
                    "cyclic project dependency: {}",
                    cycle.join(" -> ")
                ));
                let message: ErrorMessage = (&violation).into();
                return Err(message.to_string());
            }
        }

        let resolver: Option<Arc<dyn PackageResolver>> = match &req.cache_dir {
            Some(cache_dir) => Some(Arc::new(
                DiskCachedResolver::new(cache_dir.clone())
                    .await
                    .map_err(|e| e.to_string())?,
            )),
            None => Some(Arc::new(InMemoryResolver::new())),
        };

        Ok(EvaluatorContext::new(req, resolver))
    }

    async fn handle_evaluate(&self, req: EvaluateRequest) {
        let Some(context) = self.inner.registry.get(req.evaluator_id).await else {
            let _ = self
                .inner
                .transport
                .send_response(Message::EvaluateResponse(EvaluateResponse {
                    request_id: req.request_id,
                    evaluator_id: req.evaluator_id,
                    result: None,
                    error: Some("unknown evaluator".to_string()),
                }))
                .await;
            return;
        };

        if context.transition(EvaluatorState::Evaluating).await.is_err() {
            let _ = self
                .inner
                .transport
                .send_response(Message::EvaluateResponse(EvaluateResponse {
                    request_id: req.request_id,
                    evaluator_id: req.evaluator_id,
                    result: None,
                    error: Some("evaluator is busy with a concurrent evaluation".to_string()),
                }))
                .await;
            return;
        }

        let callbacks = TransportReadCallbacks::new(
            self.inner.transport.clone(),
            req.evaluator_id,
            Arc::clone(&self.inner.next_request_id),
        );

        let evaluation = self.inner.engine.evaluate(&context, &req, &callbacks);
        let outcome = match context.timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, evaluation).await {
                Ok(result) => result,
                Err(_elapsed) => Err("timed out".to_string()),
            },
            None => evaluation.await,
        };

        let _ = context.transition(EvaluatorState::Ready).await;

        let response = match outcome {
            Ok(bytes) => EvaluateResponse {
                request_id: req.request_id,
                evaluator_id: req.evaluator_id,
                result: Some(ByteBuf::from(bytes)),
                error: None,
            },
            Err(error) => EvaluateResponse {
                request_id: req.request_id,
                evaluator_id: req.evaluator_id,
                result: None,
                error: Some(error),
            },
        };
        let _ = self
            .inner
            .transport
            .send_response(Message::EvaluateResponse(response))
            .await;
    }
}
