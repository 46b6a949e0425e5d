// SPDX-License-Identifier: MIT OR Apache-2.0
//! `DependencyMetadata`: the JSON document fetched from a package's
//! `metadataRequestUri` (`spec.md` §6).

use esp_core::Checksums;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of `DependencyMetadata.dependencies`: a pinned reference to
/// another package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRef {
    /// `PackageURI` string of the dependency.
    pub uri: String,
    /// Checksums for the dependency's own metadata/zip, if pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksums: Option<Checksums>,
}

/// The metadata document describing a single package version, served at
/// `PackageUri::metadata_request_uri()`. Field order matches the canonical
/// JSON key order from `spec.md` §6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMetadata {
    /// Package name (last path segment, without version).
    pub name: String,
    /// Full `PackageURI` string identifying this package version.
    pub package_uri: String,
    /// Semantic version string.
    pub version: String,
    /// `https:` URL of the package's zip archive.
    pub package_zip_url: String,
    /// Checksum of the zip archive at `package_zip_url`.
    pub package_zip_checksums: Checksums,
    /// This package's own declared dependencies, keyed by import name.
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyRef>,

    /// Scheme used to address source files inside the archive, e.g.
    /// `"https://github.com/owner/repo/blob/%{revision}/%{path}"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code_url_scheme: Option<String>,
    /// Source repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    /// Documentation site URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// SPDX license identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Full license text, when not expressible as an SPDX identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_text: Option<String>,
    /// Package authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    /// Issue tracker URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_tracker: Option<String>,
    /// Human-readable package description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form extension data, written only when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<serde_json::Value>,
}
