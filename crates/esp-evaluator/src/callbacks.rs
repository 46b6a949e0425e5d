// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ReadCallbacks`] wired to a live [`Transport`]: issues the four
//! server→client read/list requests and unwraps their correlated responses
//! (`spec.md` §4.3).

use crate::engine::ReadCallbacks;
use async_trait::async_trait;
use esp_core::{
    ListModulesRequest, ListResourcesRequest, Message, PathElement, ReadModuleRequest,
    ReadResourceRequest,
};
use esp_transport::Transport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// Issues `Read*`/`List*` requests for one `EvaluateRequest` and correlates
/// their responses. Request ids are drawn from a counter shared across the
/// host's lifetime; uniqueness only needs to hold while a request is
/// in-flight (`spec.md` §3 "Request" lifecycle).
pub struct TransportReadCallbacks<R, W> {
    transport: Transport<R, W>,
    evaluator_id: i64,
    next_request_id: Arc<AtomicU64>,
}

impl<R, W> TransportReadCallbacks<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Build callbacks scoped to one evaluator, drawing request ids from
    /// `next_request_id`.
    #[must_use]
    pub fn new(
        transport: Transport<R, W>,
        evaluator_id: i64,
        next_request_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            transport,
            evaluator_id,
            next_request_id,
        }
    }

    fn allocate_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl<R, W> ReadCallbacks for TransportReadCallbacks<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn read_resource(&self, uri: &str) -> Result<Vec<u8>, String> {
        let request_id = self.allocate_request_id();
        let response = self
            .transport
            .send_request(Message::ReadResourceRequest(ReadResourceRequest {
                request_id,
                evaluator_id: self.evaluator_id,
                uri: uri.to_string(),
            }))
            .await
            .map_err(|e| e.to_string())?;
        match response {
            Message::ReadResourceResponse(r) => match (r.contents, r.error) {
                (Some(bytes), _) => Ok(bytes.into_vec()),
                (None, Some(error)) => Err(error),
                (None, None) => Err("readResourceResponse carried neither contents nor error".into()),
            },
            other => Err(format!("unexpected response variant: {}", other.type_name())),
        }
    }

    async fn read_module(&self, uri: &str) -> Result<String, String> {
        let request_id = self.allocate_request_id();
        let response = self
            .transport
            .send_request(Message::ReadModuleRequest(ReadModuleRequest {
                request_id,
                evaluator_id: self.evaluator_id,
                uri: uri.to_string(),
            }))
            .await
            .map_err(|e| e.to_string())?;
        match response {
            Message::ReadModuleResponse(r) => match (r.contents, r.error) {
                (Some(text), _) => Ok(text),
                (None, Some(error)) => Err(error),
                (None, None) => Err("readModuleResponse carried neither contents nor error".into()),
            },
            other => Err(format!("unexpected response variant: {}", other.type_name())),
        }
    }

    async fn list_resources(&self, uri: &str) -> Result<Vec<PathElement>, String> {
        let request_id = self.allocate_request_id();
        let response = self
            .transport
            .send_request(Message::ListResourcesRequest(ListResourcesRequest {
                request_id,
                evaluator_id: self.evaluator_id,
                uri: uri.to_string(),
            }))
            .await
            .map_err(|e| e.to_string())?;
        match response {
            Message::ListResourcesResponse(r) => match (r.path_elements, r.error) {
                (Some(elements), _) => Ok(elements),
                (None, Some(error)) => Err(error),
                (None, None) => {
                    Err("listResourcesResponse carried neither pathElements nor error".into())
                }
            },
            other => Err(format!("unexpected response variant: {}", other.type_name())),
        }
    }

    async fn list_modules(&self, uri: &str) -> Result<Vec<PathElement>, String> {
        let request_id = self.allocate_request_id();
        let response = self
            .transport
            .send_request(Message::ListModulesRequest(ListModulesRequest {
                request_id,
                evaluator_id: self.evaluator_id,
                uri: uri.to_string(),
            }))
            .await
            .map_err(|e| e.to_string())?;
        match response {
            Message::ListModulesResponse(r) => match (r.path_elements, r.error) {
                (Some(elements), _) => Ok(elements),
                (None, Some(error)) => Err(error),
                (None, None) => {
                    Err("listModulesResponse carried neither pathElements nor error".into())
                }
            },
            other => Err(format!("unexpected response variant: {}", other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_core::{Message, ReadResourceResponse};
    use esp_transport::pair;

    #[tokio::test]
    async fn read_resource_round_trips_through_the_twin_transport() {
        let (client, server) = pair();
        let client_for_handler = client.clone();
        client
            .start(
                Box::new(|_| {}),
                Box::new(move |msg| {
                    let client = client_for_handler.clone();
                    if let Message::ReadResourceRequest(req) = msg {
                        tokio::spawn(async move {
                            let _ = client
                                .send_response(Message::ReadResourceResponse(ReadResourceResponse {
                                    request_id: req.request_id,
                                    evaluator_id: req.evaluator_id,
                                    contents: Some(serde_bytes::ByteBuf::from(b"alice".to_vec())),
                                    error: None,
                                }))
                                .await;
                        });
                    }
                }),
            )
            .unwrap();
        server.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

        let callbacks = TransportReadCallbacks::new(server, 42, Arc::new(AtomicU64::new(1)));
        let bytes = callbacks.read_resource("env:USER").await.unwrap();
        assert_eq!(bytes, b"alice");
    }

    #[tokio::test]
    async fn read_resource_returns_the_declared_error() {
        let (client, server) = pair();
        let client_for_handler = client.clone();
        client
            .start(
                Box::new(|_| {}),
                Box::new(move |msg| {
                    let client = client_for_handler.clone();
                    if let Message::ReadResourceRequest(req) = msg {
                        tokio::spawn(async move {
                            let _ = client
                                .send_response(Message::ReadResourceResponse(ReadResourceResponse {
                                    request_id: req.request_id,
                                    evaluator_id: req.evaluator_id,
                                    contents: None,
                                    error: Some("notFound".into()),
                                }))
                                .await;
                        });
                    }
                }),
            )
            .unwrap();
        server.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

        let callbacks = TransportReadCallbacks::new(server, 42, Arc::new(AtomicU64::new(1)));
        let err = callbacks.read_resource("env:MISSING").await.unwrap_err();
        assert_eq!(err, "notFound");
    }
}
