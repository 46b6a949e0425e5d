// SPDX-License-Identifier: MIT OR Apache-2.0
//! An in-memory transport twin for tests and hosts that embed the evaluator
//! without a pipe (`spec.md` §4.2).

use crate::Transport;
use esp_codec::{Decoder, Encoder};
use tokio::io::{split, DuplexStream, ReadHalf, WriteHalf};

/// Default buffer size for each direction of an in-memory twin pair.
const TWIN_BUF_SIZE: usize = 64 * 1024;

/// A [`Transport`] bound to one end of an in-process duplex pipe.
pub type TwinTransport = Transport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// Build two transports wired directly to each other in-process: frames
/// written to one side's encoder are read by the other side's decoder, and
/// vice versa. Used for tests and for hosts that embed the evaluator
/// in-process instead of spawning it as a child process.
#[must_use]
pub fn pair() -> (TwinTransport, TwinTransport) {
    let (a, b) = tokio::io::duplex(TWIN_BUF_SIZE);
    let (a_read, a_write) = split(a);
    let (b_read, b_write) = split(b);

    let side_a = Transport::new(Decoder::new(a_read), Encoder::new(a_write));
    let side_b = Transport::new(Decoder::new(b_read), Encoder::new(b_write));
    (side_a, side_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_core::{CreateEvaluatorRequest, CreateEvaluatorResponse, Message};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn twin_pair_round_trips_a_request_and_response() {
        let (client, server) = pair();
        let server_for_request = server.clone();

        server
            .start(
                Box::new(|_msg| {}),
                Box::new(move |msg| {
                    let server = server_for_request.clone();
                    if let Message::CreateEvaluatorRequest(req) = msg {
                        tokio::spawn(async move {
                            let _ = server
                                .send_response(Message::CreateEvaluatorResponse(
                                    CreateEvaluatorResponse {
                                        request_id: req.request_id,
                                        evaluator_id: Some(42),
                                        error: None,
                                    },
                                ))
                                .await;
                        });
                    }
                }),
            )
            .unwrap();
        client.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

        let response = client
            .send_request(Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
                request_id: 1,
                ..Default::default()
            }))
            .await
            .unwrap();

        match response {
            Message::CreateEvaluatorResponse(r) => {
                assert_eq!(r.request_id, 1);
                assert_eq!(r.evaluator_id, Some(42));
            }
            other => panic!("unexpected response variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn close_releases_a_pending_request_without_invoking_its_handler() {
        let (client, server) = pair();
        server.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();
        client.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

        let client_for_close = client.clone();
        let closer = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            client_for_close.close().await;
        });

        let result = client
            .send_request(Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
                request_id: 9,
                ..Default::default()
            }))
            .await;

        closer.await.unwrap();
        assert!(matches!(result, Err(crate::TransportError::Closed)));
    }

    #[tokio::test]
    async fn unmatched_response_surfaces_to_the_installed_error_handler() {
        let (client, server) = pair();
        server.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

        let observed: Arc<Mutex<Vec<esp_error::ProtocolError>>> = Arc::new(Mutex::new(Vec::new()));
        let observed_for_handler = Arc::clone(&observed);
        client.on_error(move |err| {
            observed_for_handler.lock().unwrap().push(err);
        });
        client.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

        // No request with id 7 was ever sent on the client side, so this
        // response can't be matched to a pending handler.
        server
            .send_response(Message::CreateEvaluatorResponse(CreateEvaluatorResponse {
                request_id: 7,
                evaluator_id: Some(1),
                error: None,
            }))
            .await
            .unwrap();

        for _ in 0..100 {
            if !observed.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let errors = observed.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            esp_error::ProtocolError::UnknownRequestId { request_id: 7 }
        ));
    }
}
