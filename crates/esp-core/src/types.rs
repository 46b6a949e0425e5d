// SPDX-License-Identifier: MIT OR Apache-2.0
//! Supporting data types shared across message variants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a directory listing: a name plus whether it is itself a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathElement {
    /// Final path segment.
    pub name: String,
    /// Whether this element is a directory (and so itself listable).
    pub is_directory: bool,
}

/// SHA-256 checksum of a fetched artifact, carried alongside package references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checksums {
    /// Lowercase hex-encoded SHA-256 digest.
    pub sha256: String,
}

/// Proxy configuration for outbound HTTPS fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    /// Proxy address, e.g. `"http://localhost:8080"`. `None` disables proxying.
    pub address: Option<String>,
    /// Hosts that bypass the proxy.
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

/// HTTP configuration for an evaluator's outbound package-resolver fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Http {
    /// PEM-encoded CA certificate bundle, replacing the system trust store.
    pub ca_certificates: Option<Vec<u8>>,
    /// Proxy configuration, if any.
    pub proxy: Option<Proxy>,
}

/// A declared dependency of a [`Project`]: either another local project nested
/// in the source tree, or a remote package reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Dependency {
    /// A dependency resolved to a project directory on disk.
    Local {
        /// `file:` URI of the nested project's `PklProject` file.
        project_file_uri: String,
        /// URI of the package this local project corresponds to, if packaged.
        package_uri: Option<String>,
        /// This project's own declared dependencies, keyed by name.
        dependencies: BTreeMap<String, Dependency>,
    },
    /// A dependency resolved to a remote package.
    Remote {
        /// `PackageURI` string of the dependency.
        package_uri: Option<String>,
        /// Expected checksum of the dependency's metadata/zip, if pinned.
        checksums: Option<Checksums>,
    },
}

/// A project descriptor: the root of a dependency tree rooted at a
/// `PklProject` file, carried by [`crate::message::CreateEvaluatorRequest`].
///
/// Dependencies form a tree in the wire format but are not guaranteed to be
/// acyclic by construction; cycle detection is the caller's responsibility
/// (see `esp-evaluator`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// `file:` URI of this project's `PklProject` file.
    pub project_file_uri: String,
    /// URI of the package this project corresponds to, if it is itself packaged.
    pub package_uri: Option<String>,
    /// Declared dependencies, keyed by the name they are imported under.
    pub dependencies: BTreeMap<String, Dependency>,
}
