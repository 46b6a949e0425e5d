// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `Message` tagged union and its sixteen wire variants.
//!
//! The wire cares only about the numeric [`Type`] code and each variant's
//! directionality; there is no class hierarchy here, just a flat enum
//! (`spec.md` §9, "Deep inheritance in the message hierarchy").

use crate::types::{Http, PathElement, Project};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable wire-level type codes, one per [`Message`] variant.
#[allow(missing_docs)]
pub mod type_code {
    pub const CREATE_EVALUATOR_REQUEST: u8 = 0x20;
    pub const CREATE_EVALUATOR_RESPONSE: u8 = 0x21;
    pub const CLOSE_EVALUATOR: u8 = 0x22;
    pub const EVALUATE_REQUEST: u8 = 0x23;
    pub const EVALUATE_RESPONSE: u8 = 0x24;
    pub const LOG_MESSAGE: u8 = 0x25;
    pub const READ_RESOURCE_REQUEST: u8 = 0x26;
    pub const READ_RESOURCE_RESPONSE: u8 = 0x27;
    pub const READ_MODULE_REQUEST: u8 = 0x28;
    pub const READ_MODULE_RESPONSE: u8 = 0x29;
    pub const LIST_RESOURCES_REQUEST: u8 = 0x2a;
    pub const LIST_RESOURCES_RESPONSE: u8 = 0x2b;
    pub const LIST_MODULES_REQUEST: u8 = 0x2c;
    pub const LIST_MODULES_RESPONSE: u8 = 0x2d;
    pub const INITIALIZE_MODULE_READER_REQUEST: u8 = 0x2e;
    pub const INITIALIZE_MODULE_READER_RESPONSE: u8 = 0x2f;
    pub const INITIALIZE_RESOURCE_READER_REQUEST: u8 = 0x30;
    pub const INITIALIZE_RESOURCE_READER_RESPONSE: u8 = 0x31;
}

/// Which side of the transport originates a given [`Message`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client (host) → server (evaluator process).
    ClientToServer,
    /// Server (evaluator process) → client (host).
    ServerToClient,
}

/// Whether a variant expects a correlated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// No reply is expected.
    OneWay,
    /// Expects exactly one correlated response, matched by `request_id`.
    Request,
    /// Is itself the reply to a `Request`, matched by `request_id`.
    Response,
}

/// A reader capability a client advertises up front in `CreateEvaluatorRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReaderSpec {
    /// URI scheme this reader serves.
    pub scheme: String,
    /// Whether paths under this scheme form a hierarchy.
    pub has_hierarchical_uris: bool,
    /// Whether module URIs resolve relative to the local file system.
    pub is_local: bool,
    /// Whether glob module imports are supported for this scheme.
    pub is_globbable: bool,
}

/// A reader capability a client advertises up front in `CreateEvaluatorRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReaderSpec {
    /// URI scheme this reader serves.
    pub scheme: String,
    /// Whether paths under this scheme form a hierarchy.
    pub has_hierarchical_uris: bool,
    /// Whether glob resource reads are supported for this scheme.
    pub is_globbable: bool,
}

/// `CreateEvaluatorRequest` — client→server. Requests a new evaluator with
/// the given configuration; carries no `evaluator_id` (one doesn't exist yet).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvaluatorRequest {
    /// Correlation id for the matching `CreateEvaluatorResponse`.
    pub request_id: u64,
    /// Source strings of regex patterns allowed for module imports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_modules: Option<Vec<String>>,
    /// Source strings of regex patterns allowed for resource reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_resources: Option<Vec<String>>,
    /// Module reader capabilities the client will serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_module_readers: Option<Vec<ModuleReaderSpec>>,
    /// Resource reader capabilities the client will serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_resource_readers: Option<Vec<ResourceReaderSpec>>,
    /// Extra module search path roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_paths: Option<Vec<String>>,
    /// Environment variables visible to `read("env:...")`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    /// External properties visible to `read("prop:...")`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
    /// Per-evaluation timeout, in whole seconds on the wire.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "esp_serde_duration::option_duration_seconds"
    )]
    pub timeout_seconds: Option<std::time::Duration>,
    /// Root directory module URIs are resolved relative to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    /// Package resolver cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    /// Default evaluation output format (e.g. `"pcf"`, `"json"`, `"yaml"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    /// Project descriptor, if this evaluator is scoped to a Pkl project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    /// HTTP configuration for the package resolver's outbound fetches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<Http>,
}

/// `CreateEvaluatorResponse` — server→client. Exactly one of `evaluator_id`
/// or `error` is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvaluatorResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Freshly allocated evaluator id, unique for the transport's lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator_id: Option<i64>,
    /// Message-name describing why evaluator creation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `CloseEvaluator` — client→server, one-way. Destroys the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseEvaluator {
    /// Evaluator to destroy.
    pub evaluator_id: i64,
}

/// `EvaluateRequest` — client→server. Evaluates either `module_text` (an
/// inline module body) or the module found at `module_uri`, optionally
/// restricted to a sub-`expr`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    /// Correlation id for the matching `EvaluateResponse`.
    pub request_id: u64,
    /// Target evaluator.
    pub evaluator_id: i64,
    /// Module URI to evaluate (used for reader/import resolution even when
    /// `module_text` is present).
    pub module_uri: String,
    /// Inline module source, overriding a file/reader-backed read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_text: Option<String>,
    /// Sub-expression to evaluate within the module, if not the whole module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

/// `EvaluateResponse` — server→client. Exactly one of `result` or `error` is
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Target evaluator.
    pub evaluator_id: i64,
    /// Rendered evaluation output, in the evaluator's configured format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_bytes::ByteBuf>,
    /// Message-name describing why evaluation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `LogMessage` — server→client, one-way. Emitted during evaluation for
/// `trace`/`warn` statements in Pkl source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMessage {
    /// Evaluator this log line originated from.
    pub evaluator_id: i64,
    /// `0` for `trace`, `1` for `warn`, by convention of the source language;
    /// the wire itself does not constrain this value.
    pub level: i64,
    /// Log text.
    pub message: String,
    /// URI of the module frame that produced this log line.
    pub frame_uri: String,
}

/// `ReadResourceRequest` — server→client. Asks the client to read a resource
/// URI served by one of its registered resource readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResourceRequest {
    /// Correlation id for the matching `ReadResourceResponse`.
    pub request_id: u64,
    /// Evaluator on whose behalf this read is issued.
    pub evaluator_id: i64,
    /// Resource URI to read.
    pub uri: String,
}

/// `ReadResourceResponse` — client→server. Exactly one of `contents` or
/// `error` is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResourceResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Evaluator this read was issued for.
    pub evaluator_id: i64,
    /// Raw resource bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<serde_bytes::ByteBuf>,
    /// Message-name describing why the read failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `ReadModuleRequest` — server→client. Asks the client to read the source
/// text of a module URI served by one of its registered module readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadModuleRequest {
    /// Correlation id for the matching `ReadModuleResponse`.
    pub request_id: u64,
    /// Evaluator on whose behalf this read is issued.
    pub evaluator_id: i64,
    /// Module URI to read.
    pub uri: String,
}

/// `ReadModuleResponse` — client→server. Exactly one of `contents` or
/// `error` is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadModuleResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Evaluator this read was issued for.
    pub evaluator_id: i64,
    /// Module source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    /// Message-name describing why the read failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `ListResourcesRequest` — server→client. Asks the client to list the
/// directory at `uri` served by one of its registered resource readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesRequest {
    /// Correlation id for the matching `ListResourcesResponse`.
    pub request_id: u64,
    /// Evaluator on whose behalf this listing is issued.
    pub evaluator_id: i64,
    /// Directory URI to list.
    pub uri: String,
}

/// `ListResourcesResponse` — client→server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Evaluator this listing was issued for.
    pub evaluator_id: i64,
    /// Directory entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_elements: Option<Vec<PathElement>>,
    /// Message-name describing why the listing failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `ListModulesRequest` — server→client. Asks the client to list the
/// directory at `uri` served by one of its registered module readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModulesRequest {
    /// Correlation id for the matching `ListModulesResponse`.
    pub request_id: u64,
    /// Evaluator on whose behalf this listing is issued.
    pub evaluator_id: i64,
    /// Directory URI to list.
    pub uri: String,
}

/// `ListModulesResponse` — client→server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModulesResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Evaluator this listing was issued for.
    pub evaluator_id: i64,
    /// Directory entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_elements: Option<Vec<PathElement>>,
    /// Message-name describing why the listing failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `InitializeModuleReaderRequest` — server→client. Asks the client to
/// prepare a previously advertised, globbable module reader for a scheme
/// before the first glob import against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeModuleReaderRequest {
    /// Correlation id for the matching response.
    pub request_id: u64,
    /// Scheme to initialize, matching a `ModuleReaderSpec.scheme` from
    /// the originating `CreateEvaluatorRequest`.
    pub scheme: String,
}

/// `InitializeModuleReaderResponse` — client→server. `spec` is `None` if the
/// client declines to initialize the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeModuleReaderResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Confirmed reader capabilities, if initialization succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ModuleReaderSpec>,
}

/// `InitializeResourceReaderRequest` — server→client. Asks the client to
/// prepare a previously advertised, globbable resource reader for a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResourceReaderRequest {
    /// Correlation id for the matching response.
    pub request_id: u64,
    /// Scheme to initialize, matching a `ResourceReaderSpec.scheme` from
    /// the originating `CreateEvaluatorRequest`.
    pub scheme: String,
}

/// `InitializeResourceReaderResponse` — client→server. `spec` is `None` if
/// the client declines to initialize the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResourceReaderResponse {
    /// Echoes the request's `request_id`.
    pub request_id: u64,
    /// Confirmed reader capabilities, if initialization succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ResourceReaderSpec>,
}

/// The flat tagged union of all sixteen ESP message variants.
///
/// Each variant's body is decoded/encoded as a MessagePack map by
/// `esp-codec`, which is responsible for the `[type_code, body_map]` outer
/// framing; this enum carries no `#[serde]` attributes of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// See [`CreateEvaluatorRequest`].
    CreateEvaluatorRequest(CreateEvaluatorRequest),
    /// See [`CreateEvaluatorResponse`].
    CreateEvaluatorResponse(CreateEvaluatorResponse),
    /// See [`CloseEvaluator`].
    CloseEvaluator(CloseEvaluator),
    /// See [`EvaluateRequest`].
    EvaluateRequest(EvaluateRequest),
    /// See [`EvaluateResponse`].
    EvaluateResponse(EvaluateResponse),
    /// See [`LogMessage`].
    LogMessage(LogMessage),
    /// See [`ReadResourceRequest`].
    ReadResourceRequest(ReadResourceRequest),
    /// See [`ReadResourceResponse`].
    ReadResourceResponse(ReadResourceResponse),
    /// See [`ReadModuleRequest`].
    ReadModuleRequest(ReadModuleRequest),
    /// See [`ReadModuleResponse`].
    ReadModuleResponse(ReadModuleResponse),
    /// See [`ListResourcesRequest`].
    ListResourcesRequest(ListResourcesRequest),
    /// See [`ListResourcesResponse`].
    ListResourcesResponse(ListResourcesResponse),
    /// See [`ListModulesRequest`].
    ListModulesRequest(ListModulesRequest),
    /// See [`ListModulesResponse`].
    ListModulesResponse(ListModulesResponse),
    /// See [`InitializeModuleReaderRequest`].
    InitializeModuleReaderRequest(InitializeModuleReaderRequest),
    /// See [`InitializeModuleReaderResponse`].
    InitializeModuleReaderResponse(InitializeModuleReaderResponse),
    /// See [`InitializeResourceReaderRequest`].
    InitializeResourceReaderRequest(InitializeResourceReaderRequest),
    /// See [`InitializeResourceReaderResponse`].
    InitializeResourceReaderResponse(InitializeResourceReaderResponse),
}

impl Message {
    /// The stable wire type code for this message's variant.
    #[must_use]
    pub fn type_code(&self) -> u8 {
        use type_code::*;
        match self {
            Self::CreateEvaluatorRequest(_) => CREATE_EVALUATOR_REQUEST,
            Self::CreateEvaluatorResponse(_) => CREATE_EVALUATOR_RESPONSE,
            Self::CloseEvaluator(_) => CLOSE_EVALUATOR,
            Self::EvaluateRequest(_) => EVALUATE_REQUEST,
            Self::EvaluateResponse(_) => EVALUATE_RESPONSE,
            Self::LogMessage(_) => LOG_MESSAGE,
            Self::ReadResourceRequest(_) => READ_RESOURCE_REQUEST,
            Self::ReadResourceResponse(_) => READ_RESOURCE_RESPONSE,
            Self::ReadModuleRequest(_) => READ_MODULE_REQUEST,
            Self::ReadModuleResponse(_) => READ_MODULE_RESPONSE,
            Self::ListResourcesRequest(_) => LIST_RESOURCES_REQUEST,
            Self::ListResourcesResponse(_) => LIST_RESOURCES_RESPONSE,
            Self::ListModulesRequest(_) => LIST_MODULES_REQUEST,
            Self::ListModulesResponse(_) => LIST_MODULES_RESPONSE,
            Self::InitializeModuleReaderRequest(_) => INITIALIZE_MODULE_READER_REQUEST,
            Self::InitializeModuleReaderResponse(_) => INITIALIZE_MODULE_READER_RESPONSE,
            Self::InitializeResourceReaderRequest(_) => INITIALIZE_RESOURCE_READER_REQUEST,
            Self::InitializeResourceReaderResponse(_) => INITIALIZE_RESOURCE_READER_RESPONSE,
        }
    }

    /// A short, stable name for this variant, used in error messages and logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateEvaluatorRequest(_) => "CreateEvaluatorRequest",
            Self::CreateEvaluatorResponse(_) => "CreateEvaluatorResponse",
            Self::CloseEvaluator(_) => "CloseEvaluator",
            Self::EvaluateRequest(_) => "EvaluateRequest",
            Self::EvaluateResponse(_) => "EvaluateResponse",
            Self::LogMessage(_) => "LogMessage",
            Self::ReadResourceRequest(_) => "ReadResourceRequest",
            Self::ReadResourceResponse(_) => "ReadResourceResponse",
            Self::ReadModuleRequest(_) => "ReadModuleRequest",
            Self::ReadModuleResponse(_) => "ReadModuleResponse",
            Self::ListResourcesRequest(_) => "ListResourcesRequest",
            Self::ListResourcesResponse(_) => "ListResourcesResponse",
            Self::ListModulesRequest(_) => "ListModulesRequest",
            Self::ListModulesResponse(_) => "ListModulesResponse",
            Self::InitializeModuleReaderRequest(_) => "InitializeModuleReaderRequest",
            Self::InitializeModuleReaderResponse(_) => "InitializeModuleReaderResponse",
            Self::InitializeResourceReaderRequest(_) => "InitializeResourceReaderRequest",
            Self::InitializeResourceReaderResponse(_) => "InitializeResourceReaderResponse",
        }
    }

    /// Which side of the transport this variant originates from.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::CreateEvaluatorRequest(_)
            | Self::CloseEvaluator(_)
            | Self::EvaluateRequest(_)
            | Self::ReadResourceResponse(_)
            | Self::ReadModuleResponse(_)
            | Self::ListResourcesResponse(_)
            | Self::ListModulesResponse(_)
            | Self::InitializeModuleReaderResponse(_)
            | Self::InitializeResourceReaderResponse(_) => Direction::ClientToServer,
            Self::CreateEvaluatorResponse(_)
            | Self::EvaluateResponse(_)
            | Self::LogMessage(_)
            | Self::ReadResourceRequest(_)
            | Self::ReadModuleRequest(_)
            | Self::ListResourcesRequest(_)
            | Self::ListModulesRequest(_)
            | Self::InitializeModuleReaderRequest(_)
            | Self::InitializeResourceReaderRequest(_) => Direction::ServerToClient,
        }
    }

    /// Whether this variant expects a reply, is itself a reply, or neither.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::CloseEvaluator(_) | Self::LogMessage(_) => Shape::OneWay,
            Self::CreateEvaluatorRequest(_)
            | Self::EvaluateRequest(_)
            | Self::ReadResourceRequest(_)
            | Self::ReadModuleRequest(_)
            | Self::ListResourcesRequest(_)
            | Self::ListModulesRequest(_)
            | Self::InitializeModuleReaderRequest(_)
            | Self::InitializeResourceReaderRequest(_) => Shape::Request,
            Self::CreateEvaluatorResponse(_)
            | Self::EvaluateResponse(_)
            | Self::ReadResourceResponse(_)
            | Self::ReadModuleResponse(_)
            | Self::ListResourcesResponse(_)
            | Self::ListModulesResponse(_)
            | Self::InitializeModuleReaderResponse(_)
            | Self::InitializeResourceReaderResponse(_) => Shape::Response,
        }
    }

    /// `request_id` carried by this variant. Every variant carries one
    /// except `CloseEvaluator` and `LogMessage`, the two one-ways.
    #[must_use]
    pub fn request_id(&self) -> Option<u64> {
        match self {
            Self::CreateEvaluatorRequest(m) => Some(m.request_id),
            Self::CreateEvaluatorResponse(m) => Some(m.request_id),
            Self::CloseEvaluator(_) => None,
            Self::EvaluateRequest(m) => Some(m.request_id),
            Self::EvaluateResponse(m) => Some(m.request_id),
            Self::LogMessage(_) => None,
            Self::ReadResourceRequest(m) => Some(m.request_id),
            Self::ReadResourceResponse(m) => Some(m.request_id),
            Self::ReadModuleRequest(m) => Some(m.request_id),
            Self::ReadModuleResponse(m) => Some(m.request_id),
            Self::ListResourcesRequest(m) => Some(m.request_id),
            Self::ListResourcesResponse(m) => Some(m.request_id),
            Self::ListModulesRequest(m) => Some(m.request_id),
            Self::ListModulesResponse(m) => Some(m.request_id),
            Self::InitializeModuleReaderRequest(m) => Some(m.request_id),
            Self::InitializeModuleReaderResponse(m) => Some(m.request_id),
            Self::InitializeResourceReaderRequest(m) => Some(m.request_id),
            Self::InitializeResourceReaderResponse(m) => Some(m.request_id),
        }
    }

    /// `evaluator_id` carried by this variant. `CreateEvaluatorRequest`/
    /// `Response` carry none, since no evaluator exists until the response.
    #[must_use]
    pub fn evaluator_id(&self) -> Option<i64> {
        match self {
            Self::CreateEvaluatorRequest(_) => None,
            Self::CreateEvaluatorResponse(m) => m.evaluator_id,
            Self::CloseEvaluator(m) => Some(m.evaluator_id),
            Self::EvaluateRequest(m) => Some(m.evaluator_id),
            Self::EvaluateResponse(m) => Some(m.evaluator_id),
            Self::LogMessage(m) => Some(m.evaluator_id),
            Self::ReadResourceRequest(m) => Some(m.evaluator_id),
            Self::ReadResourceResponse(m) => Some(m.evaluator_id),
            Self::ReadModuleRequest(m) => Some(m.evaluator_id),
            Self::ReadModuleResponse(m) => Some(m.evaluator_id),
            Self::ListResourcesRequest(m) => Some(m.evaluator_id),
            Self::ListResourcesResponse(m) => Some(m.evaluator_id),
            Self::ListModulesRequest(m) => Some(m.evaluator_id),
            Self::ListModulesResponse(m) => Some(m.evaluator_id),
            Self::InitializeModuleReaderRequest(_) => None,
            Self::InitializeModuleReaderResponse(_) => None,
            Self::InitializeResourceReaderRequest(_) => None,
            Self::InitializeResourceReaderResponse(_) => None,
        }
    }
}
