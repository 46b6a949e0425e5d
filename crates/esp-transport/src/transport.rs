// SPDX-License-Identifier: MIT OR Apache-2.0
//! The full-duplex [`Transport`]: a decoder+encoder pair plus request/response
//! correlation, or an in-memory twin for tests and in-process hosts
//! (`spec.md` §4.2).

use crate::error::TransportError;
use esp_codec::{CodecError, Decoder, Encoder};
use esp_core::message::Shape;
use esp_core::Message;
use esp_error::ProtocolError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Callback invoked for a protocol fault the receive loop can't route to any
/// caller on its own, such as a response whose `request_id` matches no
/// pending request (`spec.md` §4.2). Install one with [`Transport::on_error`]
/// to observe these; otherwise they are only logged. An `Arc` (not a `Box`,
/// unlike [`OneWayHandler`]/[`RequestHandler`]) so the receive loop can clone
/// it out of its slot before invoking it, without holding a lock across the
/// call.
pub type ErrorHandler = Arc<dyn Fn(ProtocolError) + Send + Sync>;

/// Callback invoked for every inbound one-way message (`CloseEvaluator`,
/// `LogMessage`).
pub type OneWayHandler = Box<dyn Fn(Message) + Send + Sync>;

/// Callback invoked for every inbound request the peer expects a correlated
/// response to. The handler is responsible for eventually calling
/// [`Transport::send_response`] with the same `request_id`.
pub type RequestHandler = Box<dyn Fn(Message) + Send + Sync>;

struct Inner<R, W> {
    decoder: StdMutex<Option<Decoder<R>>>,
    encoder: Mutex<Encoder<W>>,
    response_handlers: Mutex<HashMap<u64, oneshot::Sender<Message>>>,
    error_handler: StdMutex<Option<ErrorHandler>>,
    started: AtomicBool,
    reader_task: StdMutex<Option<JoinHandle<()>>>,
}

/// Owns a decoder+encoder pair (or an in-process twin, see
/// [`crate::twin::pair`]) and demultiplexes inbound frames to one of three
/// destinations: a one-way handler, an inbound-request handler, or a pending
/// response future registered by `request_id`.
///
/// Cloning a `Transport` is cheap; clones share the same encoder, response
/// map, and reader task, matching the "single reader task / mutex-guarded
/// writer" concurrency model (`spec.md` §5).
pub struct Transport<R, W> {
    inner: Arc<Inner<R, W>>,
}

impl<R, W> Clone for Transport<R, W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Build a transport from a decoder bound to an input stream and an
    /// encoder bound to an output stream. The receive loop does not start
    /// until [`Transport::start`] is called.
    #[must_use]
    pub fn new(decoder: Decoder<R>, encoder: Encoder<W>) -> Self {
        Self {
            inner: Arc::new(Inner {
                decoder: StdMutex::new(Some(decoder)),
                encoder: Mutex::new(encoder),
                response_handlers: Mutex::new(HashMap::new()),
                error_handler: StdMutex::new(None),
                started: AtomicBool::new(false),
                reader_task: StdMutex::new(None),
            }),
        }
    }

    /// Install a callback for protocol faults the receive loop observes but
    /// can't route to any specific caller (`spec.md` §4.2). Replaces any
    /// previously installed handler. Safe to call before or after
    /// [`Transport::start`].
    pub fn on_error(&self, handler: impl Fn(ProtocolError) + Send + Sync + 'static) {
        *self
            .inner
            .error_handler
            .lock()
            .expect("error_handler mutex poisoned") = Some(Arc::new(handler));
    }

    /// Install the inbound handlers and begin the receive loop. Re-entrant
    /// `start` is a programming error and returns
    /// [`TransportError::AlreadyStarted`] ( `spec.md` §4.2).
    pub fn start(
        &self,
        on_one_way: OneWayHandler,
        on_request: RequestHandler,
    ) -> Result<(), TransportError> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(TransportError::AlreadyStarted);
        }
        let mut decoder = self
            .inner
            .decoder
            .lock()
            .expect("decoder mutex poisoned")
            .take()
            .expect("start called exactly once after started flag check");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            loop {
                match decoder.decode().await {
                    Ok(Some(msg)) => dispatch(&inner, msg, &on_one_way, &on_request).await,
                    Ok(None) => {
                        debug!(target: "esp_transport", "peer closed the stream");
                        break;
                    }
                    Err(CodecError::Decode(e)) => {
                        warn!(target: "esp_transport", error = %e, "discarding malformed frame");
                    }
                    Err(CodecError::Io(e)) => {
                        warn!(target: "esp_transport", error = %e, "transport I/O fault, closing");
                        break;
                    }
                }
            }
            release_pending(&inner).await;
        });
        *self.inner.reader_task.lock().expect("reader_task mutex poisoned") = Some(task);
        Ok(())
    }

    /// Emit a one-way message (no reply expected).
    pub async fn send_one_way(&self, msg: Message) -> Result<(), TransportError> {
        self.inner.encoder.lock().await.encode(&msg).await?;
        Ok(())
    }

    /// Emit `request` and await its correlated response. Registers the
    /// `request_id` in the response map before writing the frame, so a
    /// reply that arrives before `send` returns is never missed.
    ///
    /// # Panics
    ///
    /// Panics if `request` is a one-way variant (has no `request_id`).
    pub async fn send_request(&self, request: Message) -> Result<Message, TransportError> {
        let request_id = request
            .request_id()
            .expect("send_request called with a one-way message");
        let (tx, rx) = oneshot::channel();
        self.inner
            .response_handlers
            .lock()
            .await
            .insert(request_id, tx);

        if let Err(e) = self.inner.encoder.lock().await.encode(&request).await {
            self.inner
                .response_handlers
                .lock()
                .await
                .remove(&request_id);
            return Err(e.into());
        }

        rx.await.map_err(|_| TransportError::Closed)
    }

    /// Emit a response for a request the peer originated; no bookkeeping is
    /// required since the `request_id` round-trips inside `response`.
    pub async fn send_response(&self, response: Message) -> Result<(), TransportError> {
        self.inner.encoder.lock().await.encode(&response).await?;
        Ok(())
    }

    /// Stop the receive loop and release all pending response handlers.
    /// Idempotent: calling `close` on an already-closed transport is a no-op.
    pub async fn close(&self) {
        let task = self
            .inner
            .reader_task
            .lock()
            .expect("reader_task mutex poisoned")
            .take();
        if let Some(task) = task {
            task.abort();
        }
        release_pending(&self.inner).await;
    }
}

async fn dispatch<R, W>(
    inner: &Arc<Inner<R, W>>,
    msg: Message,
    on_one_way: &OneWayHandler,
    on_request: &RequestHandler,
) {
    match msg.shape() {
        Shape::OneWay => on_one_way(msg),
        Shape::Request => on_request(msg),
        Shape::Response => {
            let request_id = msg.request_id().expect("response carries a request_id");
            let handler = inner.response_handlers.lock().await.remove(&request_id);
            match handler {
                Some(tx) => {
                    let _ = tx.send(msg);
                }
                None => {
                    let err = ProtocolError::UnknownRequestId { request_id };
                    warn!(target: "esp_transport", %request_id, %err, "unmatched response");
                    let handler = inner
                        .error_handler
                        .lock()
                        .expect("error_handler mutex poisoned")
                        .clone();
                    if let Some(handler) = handler {
                        handler(err);
                    }
                }
            }
        }
    }
}

async fn release_pending<R, W>(inner: &Arc<Inner<R, W>>) {
    inner.response_handlers.lock().await.clear();
}
