// SPDX-License-Identifier: MIT OR Apache-2.0
//! The contract both resolver implementations satisfy (`spec.md` §4.4).

use async_trait::async_trait;
use esp_core::{Checksums, PathElement};
use esp_error::PackageLoadError;
use esp_package::{DependencyMetadata, PackageAssetUri, PackageUri};

/// Read-only package operations the evaluator engine calls against a
/// resolver. Both the in-memory and disk-cached implementations satisfy
/// this contract; callers should depend on the trait, not a concrete type.
#[async_trait]
pub trait PackageResolver: Send + Sync {
    /// Fetch (or return cached) `DependencyMetadata` for `pkg`. If `pkg`
    /// carries a checksum tail, the metadata document's digest is verified
    /// against it.
    async fn get_dependency_metadata(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
    ) -> Result<DependencyMetadata, PackageLoadError>;

    /// Download `pkg`'s zip archive (and, if `transitive`, every
    /// dependency's archive, recursively) so later reads are served without
    /// network access. Unsupported by the in-memory resolver.
    async fn download_package(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
        transitive: bool,
    ) -> Result<(), PackageLoadError>;

    /// Read the bytes of a single asset. Raises
    /// [`PackageLoadError::FileIsADirectory`] if `asset` names a directory
    /// and `allow_directory` is `false`, or
    /// [`PackageLoadError::NotFound`] if it names neither a file nor a
    /// directory.
    async fn get_bytes(
        &self,
        asset: &PackageAssetUri,
        allow_directory: bool,
        checksums: Option<&Checksums>,
    ) -> Result<Vec<u8>, PackageLoadError>;

    /// List the direct children of a directory asset.
    async fn list_elements(
        &self,
        asset: &PackageAssetUri,
        checksums: Option<&Checksums>,
    ) -> Result<Vec<PathElement>, PackageLoadError>;

    /// Whether `asset` names any element (file or directory) in the package.
    async fn has_element(
        &self,
        asset: &PackageAssetUri,
        checksums: Option<&Checksums>,
    ) -> Result<bool, PackageLoadError>;

    /// Release cached archives and file-system handles held by this
    /// resolver. Idempotent.
    async fn close(&self);
}
