// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end scenario tests run over the in-memory transport twin,
//! covering the concrete scenarios from `spec.md` §8.

use async_trait::async_trait;
use esp_core::{
    CloseEvaluator, CreateEvaluatorRequest, CreateEvaluatorResponse, EvaluateRequest,
    EvaluateResponse, Message, ReadResourceResponse,
};
use esp_evaluator::{EvaluationEngine, EvaluatorContext, EvaluatorHost, ReadCallbacks};
use esp_transport::pair;
use std::sync::Arc;
use std::time::Duration;

/// A minimal stand-in for the real Pkl VM, exercising only what the
/// scenario tests below drive it through: a `read("prop:NAME")` /
/// `read("env:NAME")` call embedded verbatim in `module_text`. This is test
/// scaffolding, not a Pkl interpreter — the real language is out of scope
/// for this crate (`spec.md` §1).
struct ScriptedEngine;

#[async_trait]
impl EvaluationEngine for ScriptedEngine {
    async fn evaluate(
        &self,
        ctx: &EvaluatorContext,
        request: &EvaluateRequest,
        callbacks: &(dyn ReadCallbacks + Send + Sync),
    ) -> Result<Vec<u8>, String> {
        let source = request
            .module_text
            .as_deref()
            .ok_or_else(|| "no module_text supplied".to_string())?;

        if let Some(name) = source.strip_prefix("x = read(\"prop:").and_then(|s| s.strip_suffix("\")")) {
            let value = ctx
                .properties()
                .get(name)
                .cloned()
                .ok_or_else(|| format!("unknown property: {name}"))?;
            return Ok(format!("x = \"{value}\"").into_bytes());
        }

        if let Some(uri) = source.strip_prefix("x = read(\"").and_then(|s| s.strip_suffix("\")")) {
            let bytes = callbacks.read_resource(uri).await?;
            let value = String::from_utf8_lossy(&bytes);
            return Ok(format!("x = \"{value}\"").into_bytes());
        }

        if source == "sleep forever" {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            return Ok(Vec::new());
        }

        Err(format!("unsupported script: {source}"))
    }
}

async fn request_response(
    client: &esp_transport::TwinTransport,
    request: Message,
) -> Message {
    client.send_request(request).await.unwrap()
}

#[tokio::test]
async fn scenario_1_evaluator_roundtrip_then_unknown_evaluator_after_close() {
    let (client, server) = pair();
    let host = EvaluatorHost::new(server, Arc::new(ScriptedEngine));
    host.start().unwrap();
    client.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

    let mut properties = std::collections::BTreeMap::new();
    properties.insert("foo".to_string(), "bar".to_string());

    let create = request_response(
        &client,
        Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
            request_id: 1,
            properties: Some(properties),
            ..Default::default()
        }),
    )
    .await;
    let evaluator_id = match create {
        Message::CreateEvaluatorResponse(CreateEvaluatorResponse {
            request_id,
            evaluator_id: Some(id),
            error: None,
        }) => {
            assert_eq!(request_id, 1);
            id
        }
        other => panic!("unexpected response: {other:?}"),
    };

    let evaluate = request_response(
        &client,
        Message::EvaluateRequest(EvaluateRequest {
            request_id: 2,
            evaluator_id,
            module_uri: "pkl:base".into(),
            module_text: Some("x = read(\"prop:foo\")".into()),
            expr: None,
        }),
    )
    .await;
    match evaluate {
        Message::EvaluateResponse(EvaluateResponse {
            request_id,
            evaluator_id: id,
            result: Some(bytes),
            error: None,
        }) => {
            assert_eq!(request_id, 2);
            assert_eq!(id, evaluator_id);
            assert_eq!(bytes.into_vec(), b"x = \"bar\"");
        }
        other => panic!("unexpected response: {other:?}"),
    }

    client
        .send_one_way(Message::CloseEvaluator(CloseEvaluator { evaluator_id }))
        .await
        .unwrap();
    // Give the host's one-way handler task a chance to run before the next
    // request lands; CloseEvaluator itself carries no acknowledgement.
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let after_close = request_response(
        &client,
        Message::EvaluateRequest(EvaluateRequest {
            request_id: 3,
            evaluator_id,
            module_uri: "pkl:base".into(),
            module_text: Some("x = 1".into()),
            expr: None,
        }),
    )
    .await;
    match after_close {
        Message::EvaluateResponse(EvaluateResponse {
            request_id,
            result: None,
            error: Some(error),
            ..
        }) => {
            assert_eq!(request_id, 3);
            assert_eq!(error, "unknown evaluator");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn scenario_2_resource_callback_during_evaluation() {
    let (client, server) = pair();
    let host = EvaluatorHost::new(server, Arc::new(ScriptedEngine));
    host.start().unwrap();

    let client_for_handler = client.clone();
    client
        .start(
            Box::new(|_| {}),
            Box::new(move |msg| {
                let client = client_for_handler.clone();
                if let Message::ReadResourceRequest(req) = msg {
                    assert_eq!(req.uri, "env:USER");
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

    let create = request_response(
        &client,
        Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
            request_id: 1,
            ..Default::default()
        }),
    )
    .await;
    let evaluator_id = match create {
        Message::CreateEvaluatorResponse(r) => r.evaluator_id.unwrap(),
        other => panic!("unexpected response: {other:?}"),
    };

    let evaluate = request_response(
        &client,
        Message::EvaluateRequest(EvaluateRequest {
            request_id: 2,
            evaluator_id,
            module_uri: "pkl:base".into(),
            module_text: Some("x = read(\"env:USER\")".into()),
            expr: None,
        }),
    )
    .await;
    match evaluate {
        Message::EvaluateResponse(EvaluateResponse {
            result: Some(bytes),
            error: None,
            ..
        }) => assert_eq!(bytes.into_vec(), b"x = \"alice\""),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn evaluate_against_a_never_created_evaluator_is_unknown_evaluator() {
    let (client, server) = pair();
    let host = EvaluatorHost::new(server, Arc::new(ScriptedEngine));
    host.start().unwrap();
    client.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

    let response = request_response(
        &client,
        Message::EvaluateRequest(EvaluateRequest {
            request_id: 1,
            evaluator_id: 999,
            module_uri: "pkl:base".into(),
            module_text: Some("x = 1".into()),
            expr: None,
        }),
    )
    .await;
    match response {
        Message::EvaluateResponse(EvaluateResponse { error: Some(e), .. }) => {
            assert_eq!(e, "unknown evaluator");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn evaluation_exceeding_the_configured_timeout_is_reported_as_timed_out() {
    let (client, server) = pair();
    let host = EvaluatorHost::new(server, Arc::new(ScriptedEngine));
    host.start().unwrap();
    client.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

    let create = request_response(
        &client,
        Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
            request_id: 1,
            timeout_seconds: Some(Duration::from_millis(20)),
            ..Default::default()
        }),
    )
    .await;
    let evaluator_id = match create {
        Message::CreateEvaluatorResponse(r) => r.evaluator_id.unwrap(),
        other => panic!("unexpected response: {other:?}"),
    };

    let evaluate = request_response(
        &client,
        Message::EvaluateRequest(EvaluateRequest {
            request_id: 2,
            evaluator_id,
            module_uri: "pkl:base".into(),
            module_text: Some("sleep forever".into()),
            expr: None,
        }),
    )
    .await;
    match evaluate {
        Message::EvaluateResponse(EvaluateResponse { error: Some(e), .. }) => {
            assert_eq!(e, "timed out");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn create_evaluator_with_a_cyclic_project_is_rejected() {
    use esp_core::{Dependency, Project};
    use std::collections::BTreeMap;

    let (client, server) = pair();
    let host = EvaluatorHost::new(server, Arc::new(ScriptedEngine));
    host.start().unwrap();
    client.start(Box::new(|_| {}), Box::new(|_| {})).unwrap();

    let root_uri = "file:///work/root/PklProject";
    let mut back_to_root = BTreeMap::new();
    back_to_root.insert(
        "root".to_string(),
        Dependency::Local {
            project_file_uri: root_uri.into(),
            package_uri: None,
            dependencies: BTreeMap::new(),
        },
    );
    let mut root_deps = BTreeMap::new();
    root_deps.insert(
        "a".to_string(),
        Dependency::Local {
            project_file_uri: "file:///work/a/PklProject".into(),
            package_uri: None,
            dependencies: back_to_root,
        },
    );
    let project = Project {
        project_file_uri: root_uri.into(),
        package_uri: None,
        dependencies: root_deps,
    };

    let create = request_response(
        &client,
        Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
            request_id: 1,
            project: Some(project),
            ..Default::default()
        }),
    )
    .await;
    match create {
        Message::CreateEvaluatorResponse(CreateEvaluatorResponse {
            evaluator_id: None,
            error: Some(error),
            ..
        }) => {
            assert!(error.contains("cyclic project dependency"));
        }
        other => panic!("unexpected response: {other:?}"),
    }
}
