// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for the `[type_code, body_map]` wire codec.
//!
//! Covers frame roundtrips, type-code/variant correlation, and that
//! malformed input is rejected rather than panicking.

use esp_codec::{frame_to_message, message_to_frame, Decoder};
use esp_core::{
    CreateEvaluatorRequest, CreateEvaluatorResponse, EvaluateRequest, EvaluateResponse,
    InitializeModuleReaderResponse, LogMessage, Message, ModuleReaderSpec, ReadModuleResponse,
};
use proptest::prelude::*;

// ── Leaf strategies ─────────────────────────────────────────────────────

fn arb_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./:-]{0,24}"
}

fn arb_opt_string() -> impl Strategy<Value = Option<String>> {
    prop::option::of(arb_string())
}

fn arb_module_reader_spec() -> impl Strategy<Value = ModuleReaderSpec> {
    (arb_string(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(scheme, has_hierarchical_uris, is_local, is_globbable)| ModuleReaderSpec {
            scheme,
            has_hierarchical_uris,
            is_local,
            is_globbable,
        },
    )
}

// ── Message-variant strategies ──────────────────────────────────────────

fn arb_create_evaluator_request() -> impl Strategy<Value = Message> {
    (any::<u64>(), arb_opt_string()).prop_map(|(request_id, output_format)| {
        Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
            request_id,
            output_format,
            ..Default::default()
        })
    })
}

fn arb_create_evaluator_response() -> impl Strategy<Value = Message> {
    (any::<u64>(), prop::option::of(any::<i64>()), arb_opt_string()).prop_map(
        |(request_id, evaluator_id, error)| {
            Message::CreateEvaluatorResponse(CreateEvaluatorResponse {
                request_id,
                evaluator_id,
                error,
            })
        },
    )
}

fn arb_evaluate_request() -> impl Strategy<Value = Message> {
    (
        any::<u64>(),
        any::<i64>(),
        arb_string(),
        arb_opt_string(),
        arb_opt_string(),
    )
        .prop_map(|(request_id, evaluator_id, module_uri, module_text, expr)| {
            Message::EvaluateRequest(EvaluateRequest {
                request_id,
                evaluator_id,
                module_uri,
                module_text,
                expr,
            })
        })
}

fn arb_evaluate_response() -> impl Strategy<Value = Message> {
    (
        any::<u64>(),
        any::<i64>(),
        prop::option::of(prop::collection::vec(any::<u8>(), 0..32)),
        arb_opt_string(),
    )
        .prop_map(|(request_id, evaluator_id, result, error)| {
            Message::EvaluateResponse(EvaluateResponse {
                request_id,
                evaluator_id,
                result: result.map(serde_bytes::ByteBuf::from),
                error,
            })
        })
}

fn arb_log_message() -> impl Strategy<Value = Message> {
    (any::<i64>(), any::<i64>(), arb_string(), arb_string()).prop_map(
        |(evaluator_id, level, message, frame_uri)| {
            Message::LogMessage(LogMessage {
                evaluator_id,
                level,
                message,
                frame_uri,
            })
        },
    )
}

fn arb_read_module_response() -> impl Strategy<Value = Message> {
    (any::<u64>(), any::<i64>(), arb_opt_string(), arb_opt_string()).prop_map(
        |(request_id, evaluator_id, contents, error)| {
            Message::ReadModuleResponse(ReadModuleResponse {
                request_id,
                evaluator_id,
                contents,
                error,
            })
        },
    )
}

fn arb_initialize_module_reader_response() -> impl Strategy<Value = Message> {
    (any::<u64>(), prop::option::of(arb_module_reader_spec())).prop_map(|(request_id, spec)| {
        Message::InitializeModuleReaderResponse(InitializeModuleReaderResponse {
            request_id,
            spec,
        })
    })
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        arb_create_evaluator_request(),
        arb_create_evaluator_response(),
        arb_evaluate_request(),
        arb_evaluate_response(),
        arb_log_message(),
        arb_read_module_response(),
        arb_initialize_module_reader_response(),
    ]
}

fn encode_to_bytes(msg: &Message) -> Vec<u8> {
    let frame = message_to_frame(msg).unwrap();
    let mut bytes = Vec::new();
    rmpv::encode::write_value(&mut bytes, &frame).unwrap();
    bytes
}

// ── Properties ───────────────────────────────────────────────────────────

proptest! {
    /// Any message survives `message_to_frame` + `frame_to_message` unchanged.
    #[test]
    fn message_frame_roundtrip(msg in arb_message()) {
        let frame = message_to_frame(&msg).unwrap();
        let decoded = frame_to_message(frame).unwrap();
        prop_assert_eq!(decoded, msg);
    }

    /// `type_code` is stable across the frame roundtrip: decoding never
    /// produces a different variant than the one encoded.
    #[test]
    fn type_code_is_preserved_across_the_wire(msg in arb_message()) {
        let code_before = msg.type_code();
        let bytes = encode_to_bytes(&msg);
        let mut decoder = Decoder::new(bytes.as_slice());
        let decoded = block_on_decode(&mut decoder);
        prop_assert_eq!(decoded.type_code(), code_before);
    }

    /// Any message written through [`Encoder`] and read back through
    /// [`Decoder`] round-trips byte-for-byte in meaning, including back to
    /// back frames sharing one buffer.
    #[test]
    fn two_messages_decode_in_write_order(a in arb_message(), b in arb_message()) {
        let mut bytes = encode_to_bytes(&a);
        bytes.extend(encode_to_bytes(&b));

        let mut decoder = Decoder::new(bytes.as_slice());
        let first = block_on_decode(&mut decoder);
        let second = block_on_decode(&mut decoder);
        prop_assert_eq!(first, a);
        prop_assert_eq!(second, b);
    }

    /// Arbitrary, likely-malformed byte soup is never a panic: the decoder
    /// either decodes it, rejects it with a [`esp_codec::CodecError`], or
    /// reports a clean/unexpected EOF.
    #[test]
    fn arbitrary_bytes_never_panic_the_decoder(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut decoder = Decoder::new(bytes.as_slice());
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let _ = rt.block_on(decoder.decode());
    }
}

fn block_on_decode(decoder: &mut Decoder<&[u8]>) -> Message {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    rt.block_on(decoder.decode()).unwrap().unwrap()
}
