// SPDX-License-Identifier: MIT OR Apache-2.0
//! esp-core
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Message model and shared data types for the Evaluator Server Protocol.
//! Current transport: MessagePack frames over a full-duplex byte stream.

pub mod message;
pub mod types;

pub use message::{
    CloseEvaluator, CreateEvaluatorRequest, CreateEvaluatorResponse, Direction, EvaluateRequest,
    EvaluateResponse, InitializeModuleReaderRequest, InitializeModuleReaderResponse,
    InitializeResourceReaderRequest, InitializeResourceReaderResponse, ListModulesRequest,
    ListModulesResponse, ListResourcesRequest, ListResourcesResponse, LogMessage, Message,
    ModuleReaderSpec, ReadModuleRequest, ReadModuleResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceReaderSpec, Shape, type_code,
};
pub use types::{Checksums, Dependency, Http, PathElement, Project, Proxy};

/// Protocol version string this crate implements, for diagnostics and logs.
pub const PROTOCOL_VERSION: &str = "esp/v1";
