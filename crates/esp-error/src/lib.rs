// SPDX-License-Identifier: MIT OR Apache-2.0
//! esp-error
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Error taxonomy for the Evaluator Server Protocol (ESP).
//!
//! Every error surfaced by this protocol carries a stable, locale-independent
//! `message_name` plus positional `args` for the embedding host to localize,
//! never baked-in English text as the sole representation (see `spec.md` §7).
//! There are three distinguished kinds: [`DecodeError`] (malformed frames,
//! non-fatal to the transport), [`ProtocolError`] (semantically invalid but
//! well-formed traffic, non-fatal), and [`PackageLoadError`] (package
//! resolver faults).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, locale-independent error identifier plus its positional
/// arguments, the indirection `spec.md` §7 mandates in place of baked-in
/// error text.
pub trait MessageName {
    /// Stable identifier for this error, e.g. `"malformedMessageHeaderLength"`.
    fn message_name(&self) -> &'static str;

    /// Positional arguments for the message, in the order a localized
    /// template would substitute them.
    fn args(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// A frame could not be decoded: wrong outer shape, unrecognized type code,
/// a missing required field, or a field whose dynamic type didn't match the
/// expected static type.
///
/// Non-fatal to the transport: only the offending frame is discarded
/// (`spec.md` §4.5, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The outer MessagePack array did not have exactly two elements.
    #[error("malformed message header: expected array of length 2, got {len}")]
    MalformedHeaderLength {
        /// Observed outer array length.
        len: usize,
    },

    /// The type code in the first array slot is not one of the 16
    /// recognized `Message` variants.
    #[error("malformed message header: unrecognized type code 0x{code:02x}")]
    UnrecognizedTypeCode {
        /// The unrecognized byte.
        code: u8,
    },

    /// A field required by the variant's schema was absent from the body map.
    #[error("message '{message}' is missing required field '{field}'")]
    MissingRequiredField {
        /// Variant name the field was expected on.
        message: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A field was present but its dynamic MessagePack type didn't match
    /// what the variant's schema expects.
    #[error(
        "message '{message}' field '{field}' has the wrong type: expected {expected}, got {actual}"
    )]
    FieldTypeMismatch {
        /// Variant name the field belongs to.
        message: &'static str,
        /// Name of the mistyped field.
        field: &'static str,
        /// Expected MessagePack type family.
        expected: &'static str,
        /// Observed MessagePack type family.
        actual: &'static str,
    },

    /// The body map failed to convert into the variant's typed struct: a
    /// missing field, a type mismatch, or an otherwise malformed value that
    /// the underlying (de)serializer reports in its own words rather than as
    /// a statically-known field name.
    #[error("message '{message}' has an invalid body: {reason}")]
    InvalidBody {
        /// Variant name the body belongs to.
        message: &'static str,
        /// Underlying (de)serializer error text.
        reason: String,
    },
}

impl MessageName for DecodeError {
    fn message_name(&self) -> &'static str {
        match self {
            Self::MalformedHeaderLength { .. } => "malformedMessageHeaderLength",
            Self::UnrecognizedTypeCode { .. } => "malformedMessageHeaderUnrecognizedCode",
            Self::MissingRequiredField { .. } => "missingRequiredField",
            Self::FieldTypeMismatch { .. } => "fieldTypeMismatch",
            Self::InvalidBody { .. } => "invalidMessageBody",
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            Self::MalformedHeaderLength { len } => vec![len.to_string()],
            Self::UnrecognizedTypeCode { code } => vec![format!("{code:02x}")],
            Self::MissingRequiredField { message, field } => {
                vec![(*message).to_string(), (*field).to_string()]
            }
            Self::FieldTypeMismatch {
                message,
                field,
                expected,
                actual,
            } => vec![
                (*message).to_string(),
                (*field).to_string(),
                (*expected).to_string(),
                (*actual).to_string(),
            ],
            Self::InvalidBody { message, reason } => {
                vec![(*message).to_string(), reason.clone()]
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ProtocolError
// ---------------------------------------------------------------------------

/// A message was syntactically well-formed but semantically invalid:
/// an unhandled message code, a response with an unknown `request_id`, or
/// an attempt to encode a variant the encoder doesn't expect at this point.
///
/// Non-fatal to the transport (`spec.md` §4.5, §9 Open Question).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// An inbound response's `request_id` has no registered handler.
    #[error("unknown request id: {request_id}")]
    UnknownRequestId {
        /// The unmatched request id.
        request_id: u64,
    },

    /// A message referenced an `evaluator_id` that does not exist (never
    /// created, or already closed).
    #[error("unknown evaluator id: {evaluator_id}")]
    UnknownEvaluatorId {
        /// The unmatched evaluator id.
        evaluator_id: i64,
    },

    /// The encoder was asked to emit a variant that is not valid to send
    /// in this direction.
    #[error("unhandled message type for encoding: {type_name}")]
    UnhandledMessageType {
        /// Name of the offending variant.
        type_name: &'static str,
    },

    /// A structural invariant of the protocol was violated (e.g. a cyclic
    /// project dependency graph).
    #[error("protocol violation: {0}")]
    Violation(String),
}

impl MessageName for ProtocolError {
    fn message_name(&self) -> &'static str {
        match self {
            Self::UnknownRequestId { .. } => "unknownRequestId",
            Self::UnknownEvaluatorId { .. } => "unknownEvaluatorId",
            Self::UnhandledMessageType { .. } => "unhandledMessageType",
            Self::Violation(_) => "protocolViolation",
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            Self::UnknownRequestId { request_id } => vec![request_id.to_string()],
            Self::UnknownEvaluatorId { evaluator_id } => vec![evaluator_id.to_string()],
            Self::UnhandledMessageType { type_name } => vec![(*type_name).to_string()],
            Self::Violation(msg) => vec![msg.clone()],
        }
    }
}

// ---------------------------------------------------------------------------
// PackageLoadError
// ---------------------------------------------------------------------------

/// Package-layer faults raised by the resolver (`spec.md` §4.4, §4.5).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackageLoadError {
    /// The `DependencyMetadata` JSON document was malformed or missing a
    /// required key.
    #[error("invalid dependency metadata for {display_name}: {reason}")]
    InvalidDependencyMetadata {
        /// Human-readable package identifier the metadata was fetched for.
        display_name: String,
        /// Why the document was rejected.
        reason: String,
    },

    /// `DependencyMetadata.packageZipUrl` was not an `https:` URL.
    #[error("invalid package zip url: {url}")]
    InvalidPackageZipUrl {
        /// The offending URL.
        url: String,
    },

    /// The downloaded zip archive's SHA-256 digest did not match
    /// `packageZipChecksums.sha256`.
    #[error(
        "invalid package zip checksum for {display_name}: expected {expected}, got {actual} (from {url})"
    )]
    InvalidPackageZipChecksum {
        /// Human-readable package identifier.
        display_name: String,
        /// Digest actually observed.
        actual: String,
        /// Digest declared by the metadata or the `PackageURI` checksum tail.
        expected: String,
        /// URL the zip was fetched from.
        url: String,
    },

    /// The downloaded metadata document's SHA-256 digest did not match the
    /// checksum tail carried by the requested `PackageURI`.
    #[error(
        "invalid package metadata checksum for {display_name}: expected {expected}, got {actual} (from {url})"
    )]
    InvalidPackageMetadataChecksum {
        /// Human-readable package identifier.
        display_name: String,
        /// Digest actually observed.
        actual: String,
        /// Digest declared by the `PackageURI` checksum tail.
        expected: String,
        /// URL the metadata was fetched from.
        url: String,
    },

    /// An HTTP fetch returned a non-2xx status.
    #[error("bad HTTP status code {status} fetching {url}")]
    BadHttpStatusCode {
        /// URL that was requested.
        url: String,
        /// Observed HTTP status code.
        status: u16,
    },

    /// The underlying HTTP client reported a transport-level I/O failure.
    #[error("I/O error making HTTP GET to {url}: {source}")]
    IoErrorMakingHttpGet {
        /// URL that was requested.
        url: String,
        /// Underlying error text.
        source: String,
    },

    /// The resolver implementation does not support this operation
    /// (e.g. `download_package` on the in-memory resolver).
    #[error("operation not supported by this resolver: {operation}")]
    OperationNotSupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },

    /// `get_bytes` was called with `allow_directory = false` on an asset
    /// path that is a directory.
    #[error("asset is a directory: {asset}")]
    FileIsADirectory {
        /// The asset fragment path.
        asset: String,
    },

    /// The requested asset does not exist in the package.
    #[error("asset not found: {asset}")]
    NotFound {
        /// The asset fragment path.
        asset: String,
    },
}

impl MessageName for PackageLoadError {
    fn message_name(&self) -> &'static str {
        match self {
            Self::InvalidDependencyMetadata { .. } => "invalidDependencyMetadata",
            Self::InvalidPackageZipUrl { .. } => "invalidPackageZipUrl",
            Self::InvalidPackageZipChecksum { .. } => "invalidPackageZipChecksum",
            Self::InvalidPackageMetadataChecksum { .. } => "invalidPackageMetadataChecksum",
            Self::BadHttpStatusCode { .. } => "badHttpStatusCode",
            Self::IoErrorMakingHttpGet { .. } => "ioErrorMakingHttpGet",
            Self::OperationNotSupported { .. } => "operationNotSupported",
            Self::FileIsADirectory { .. } => "fileIsADirectory",
            Self::NotFound { .. } => "notFound",
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            Self::InvalidDependencyMetadata {
                display_name,
                reason,
            } => vec![display_name.clone(), reason.clone()],
            Self::InvalidPackageZipUrl { url } => vec![url.clone()],
            Self::InvalidPackageZipChecksum {
                display_name,
                actual,
                expected,
                url,
            }
            | Self::InvalidPackageMetadataChecksum {
                display_name,
                actual,
                expected,
                url,
            } => vec![
                display_name.clone(),
                actual.clone(),
                expected.clone(),
                url.clone(),
            ],
            Self::BadHttpStatusCode { url, status } => vec![url.clone(), status.to_string()],
            Self::IoErrorMakingHttpGet { url, source } => vec![url.clone(), source.clone()],
            Self::OperationNotSupported { operation } => vec![(*operation).to_string()],
            Self::FileIsADirectory { asset } | Self::NotFound { asset } => vec![asset.clone()],
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization support — a wire-safe snapshot of any of the above
// ---------------------------------------------------------------------------

/// Serializable `{message_name, args}` snapshot suitable for embedding in an
/// `EvaluateResponse.error` string or logging as structured JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Stable identifier, e.g. `"invalidPackageZipChecksum"`.
    pub message_name: String,
    /// Positional arguments.
    pub args: Vec<String>,
}

impl<E: MessageName> From<&E> for ErrorMessage {
    fn from(err: &E) -> Self {
        Self {
            message_name: err.message_name().to_string(),
            args: err.args(),
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message_name)?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

use thiserror::Error;
