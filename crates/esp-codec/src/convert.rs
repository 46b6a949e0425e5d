// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion between [`Message`] and the `[type_code, body_map]` frame shape.

use esp_core::{message::type_code, Message};
use esp_error::DecodeError;
use rmpv::Value;

/// Convert a typed [`Message`] into the two-element frame `Value` the wire
/// actually carries: `[type_code, body_map]`.
///
/// Field order inside `body_map` follows each struct's declaration order
/// (`spec.md` §6's canonical order table), since `serde`'s struct derive
/// preserves declaration order and `rmpv::ext::to_value` serializes structs
/// as maps in that order.
pub fn message_to_frame(msg: &Message) -> Result<Value, rmpv::ext::Error> {
    let code = msg.type_code();
    let body = match msg {
        Message::CreateEvaluatorRequest(m) => rmpv::ext::to_value(m)?,
        Message::CreateEvaluatorResponse(m) => rmpv::ext::to_value(m)?,
        Message::CloseEvaluator(m) => rmpv::ext::to_value(m)?,
        Message::EvaluateRequest(m) => rmpv::ext::to_value(m)?,
        Message::EvaluateResponse(m) => rmpv::ext::to_value(m)?,
        Message::LogMessage(m) => rmpv::ext::to_value(m)?,
        Message::ReadResourceRequest(m) => rmpv::ext::to_value(m)?,
        Message::ReadResourceResponse(m) => rmpv::ext::to_value(m)?,
        Message::ReadModuleRequest(m) => rmpv::ext::to_value(m)?,
        Message::ReadModuleResponse(m) => rmpv::ext::to_value(m)?,
        Message::ListResourcesRequest(m) => rmpv::ext::to_value(m)?,
        Message::ListResourcesResponse(m) => rmpv::ext::to_value(m)?,
        Message::ListModulesRequest(m) => rmpv::ext::to_value(m)?,
        Message::ListModulesResponse(m) => rmpv::ext::to_value(m)?,
        Message::InitializeModuleReaderRequest(m) => rmpv::ext::to_value(m)?,
        Message::InitializeModuleReaderResponse(m) => rmpv::ext::to_value(m)?,
        Message::InitializeResourceReaderRequest(m) => rmpv::ext::to_value(m)?,
        Message::InitializeResourceReaderResponse(m) => rmpv::ext::to_value(m)?,
    };
    Ok(Value::Array(vec![Value::from(code), body]))
}

/// Parse a decoded frame `Value` into a typed [`Message`], validating the
/// outer shape and type code before attempting to convert the body.
pub fn frame_to_message(frame: Value) -> Result<Message, DecodeError> {
    let items = match frame {
        Value::Array(items) => items,
        other => {
            return Err(DecodeError::MalformedHeaderLength {
                len: array_len_of(&other),
            });
        }
    };
    if items.len() != 2 {
        return Err(DecodeError::MalformedHeaderLength { len: items.len() });
    }
    let mut items = items.into_iter();
    let code_val = items.next().expect("len checked above");
    let body_val = items.next().expect("len checked above");

    let code = code_val
        .as_u64()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| DecodeError::UnrecognizedTypeCode {
            code: code_val.as_u64().unwrap_or(0xff) as u8,
        })?;

    macro_rules! decode_body {
        ($message_name:literal, $variant:ident) => {
            rmpv::ext::from_value(body_val)
                .map(Message::$variant)
                .map_err(|e| DecodeError::InvalidBody {
                    message: $message_name,
                    reason: e.to_string(),
                })
        };
    }

    match code {
        type_code::CREATE_EVALUATOR_REQUEST => {
            decode_body!("CreateEvaluatorRequest", CreateEvaluatorRequest)
        }
        type_code::CREATE_EVALUATOR_RESPONSE => {
            decode_body!("CreateEvaluatorResponse", CreateEvaluatorResponse)
        }
        type_code::CLOSE_EVALUATOR => decode_body!("CloseEvaluator", CloseEvaluator),
        type_code::EVALUATE_REQUEST => decode_body!("EvaluateRequest", EvaluateRequest),
        type_code::EVALUATE_RESPONSE => decode_body!("EvaluateResponse", EvaluateResponse),
        type_code::LOG_MESSAGE => decode_body!("LogMessage", LogMessage),
        type_code::READ_RESOURCE_REQUEST => {
            decode_body!("ReadResourceRequest", ReadResourceRequest)
        }
        type_code::READ_RESOURCE_RESPONSE => {
            decode_body!("ReadResourceResponse", ReadResourceResponse)
        }
        type_code::READ_MODULE_REQUEST => decode_body!("ReadModuleRequest", ReadModuleRequest),
        type_code::READ_MODULE_RESPONSE => {
            decode_body!("ReadModuleResponse", ReadModuleResponse)
        }
        type_code::LIST_RESOURCES_REQUEST => {
            decode_body!("ListResourcesRequest", ListResourcesRequest)
        }
        type_code::LIST_RESOURCES_RESPONSE => {
            decode_body!("ListResourcesResponse", ListResourcesResponse)
        }
        type_code::LIST_MODULES_REQUEST => {
            decode_body!("ListModulesRequest", ListModulesRequest)
        }
        type_code::LIST_MODULES_RESPONSE => {
            decode_body!("ListModulesResponse", ListModulesResponse)
        }
        type_code::INITIALIZE_MODULE_READER_REQUEST => decode_body!(
            "InitializeModuleReaderRequest",
            InitializeModuleReaderRequest
        ),
        type_code::INITIALIZE_MODULE_READER_RESPONSE => decode_body!(
            "InitializeModuleReaderResponse",
            InitializeModuleReaderResponse
        ),
        type_code::INITIALIZE_RESOURCE_READER_REQUEST => decode_body!(
            "InitializeResourceReaderRequest",
            InitializeResourceReaderRequest
        ),
        type_code::INITIALIZE_RESOURCE_READER_RESPONSE => decode_body!(
            "InitializeResourceReaderResponse",
            InitializeResourceReaderResponse
        ),
        code => Err(DecodeError::UnrecognizedTypeCode { code }),
    }
}

fn array_len_of(v: &Value) -> usize {
    match v {
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_core::CreateEvaluatorRequest;

    #[test]
    fn roundtrips_create_evaluator_request() {
        let msg = Message::CreateEvaluatorRequest(CreateEvaluatorRequest {
            request_id: 1,
            ..Default::default()
        });
        let frame = message_to_frame(&msg).unwrap();
        let decoded = frame_to_message(frame).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn rejects_wrong_outer_length() {
        let frame = Value::Array(vec![Value::from(5), Value::from(6), Value::from(7)]);
        let err = frame_to_message(frame).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeaderLength { len: 3 }));
    }

    #[test]
    fn rejects_unrecognized_type_code() {
        let frame = Value::Array(vec![Value::from(0xffu64), Value::Map(vec![])]);
        let err = frame_to_message(frame).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnrecognizedTypeCode { code: 0xff }
        ));
    }
}
