// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire-format snapshot tests: the canonical field order `message_to_frame`
//! puts on the wire for each body map (`spec.md` §4.1, §6).
//!
//! Snapshotting a `serde_json::to_value` of these types would defeat the
//! point, since `serde_json::Value`'s map reorders keys alphabetically.
//! Instead these snapshot the field *names*, in declaration order, as they
//! actually appear in the `rmpv::Value::Map` `message_to_frame` produces.

use esp_codec::message_to_frame;
use esp_core::{
    CreateEvaluatorRequest, InitializeModuleReaderResponse, Message, ModuleReaderSpec,
};
use rmpv::Value;

fn field_names(frame: &Value) -> Vec<String> {
    let Value::Array(items) = frame else {
        panic!("frame is not a two-element array");
    };
    let Value::Map(entries) = &items[1] else {
        panic!("frame body is not a map");
    };
    entries
        .iter()
        .map(|(k, _)| k.as_str().expect("map key is a string").to_string())
        .collect()
}

#[test]
fn module_reader_spec_field_order_is_canonical() {
    let msg = Message::InitializeModuleReaderResponse(InitializeModuleReaderResponse {
        request_id: 1,
        spec: Some(ModuleReaderSpec {
            scheme: "customfs".into(),
            has_hierarchical_uris: true,
            is_local: false,
            is_globbable: true,
        }),
    });
    let frame = message_to_frame(&msg).unwrap();
    let Value::Array(items) = &frame else {
        panic!("frame is not a two-element array");
    };
    let Value::Map(body) = &items[1] else {
        panic!("frame body is not a map");
    };
    let spec_value = body
        .iter()
        .find(|(k, _)| k.as_str() == Some("spec"))
        .map(|(_, v)| v)
        .expect("response carries a spec field");
    let Value::Map(spec_entries) = spec_value else {
        panic!("spec is not a map");
    };
    let names: Vec<String> = spec_entries
        .iter()
        .map(|(k, _)| k.as_str().expect("map key is a string").to_string())
        .collect();

    insta::assert_debug_snapshot!(names, @r###"
    [
        "scheme",
        "hasHierarchicalUris",
        "isLocal",
        "isGlobbable",
    ]
    "###);
}

#[test]
fn create_evaluator_request_field_order_is_canonical() {
    let msg = Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
        request_id: 1,
        output_format: Some("json".into()),
        ..Default::default()
    });
    let frame = message_to_frame(&msg).unwrap();
    let names = field_names(&frame);

    insta::assert_debug_snapshot!(names, @r###"
    [
        "requestId",
        "outputFormat",
    ]
    "###);
}
