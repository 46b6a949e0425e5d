// SPDX-License-Identifier: MIT OR Apache-2.0
//! The in-memory package resolver: fetches metadata and zip archives over
//! HTTPS, verifies checksums, and serves reads from RAM (`spec.md` §4.4).

use crate::checksum::Verifier;
use crate::http;
use crate::retry::{retry_async, RetryConfig};
use crate::resolver::PackageResolver;
use crate::state::{LookupState, LookupTracker};
use crate::zipfs::ZipIndex;
use async_trait::async_trait;
use esp_core::{Checksums, PathElement};
use esp_error::PackageLoadError;
use esp_package::{DependencyMetadata, PackageAssetUri, PackageUri};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fetches package metadata and zip archives over HTTPS and serves reads
/// entirely from RAM. `download_package` is unsupported — see `spec.md`
/// §4.4.
pub struct InMemoryResolver {
    client: Client,
    retry_config: RetryConfig,
    verifier: Verifier,
    cached_metadata: Mutex<HashMap<String, DependencyMetadata>>,
    cached_entries: Mutex<HashMap<String, Arc<ZipIndex>>>,
    lookup_state: Mutex<HashMap<String, LookupTracker>>,
}

impl InMemoryResolver {
    /// Build a resolver with default retry and checksum-verification
    /// settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            retry_config: RetryConfig::default(),
            verifier: Verifier::new(),
            cached_metadata: Mutex::new(HashMap::new()),
            cached_entries: Mutex::new(HashMap::new()),
            lookup_state: Mutex::new(HashMap::new()),
        }
    }

    /// Build a resolver that honors the `$skipChecksumVerification`
    /// sentinel. Exists only for the test harness; unreachable from a
    /// production dependent (`spec.md` §9).
    #[cfg(test)]
    #[must_use]
    pub fn with_test_mode() -> Self {
        Self {
            verifier: Verifier::with_test_mode(),
            ..Self::new()
        }
    }

    fn cache_key(pkg: &PackageUri) -> String {
        pkg.metadata_request_uri()
    }

    /// Drive `key`'s lookup state machine to `to` (`spec.md` §4.4). A
    /// rejected transition indicates a bug in the fetch paths below, not a
    /// caller error, so it's logged rather than surfaced.
    async fn transition(&self, key: &str, to: LookupState) {
        let mut states = self.lookup_state.lock().await;
        let tracker = states.entry(key.to_string()).or_default();
        if !tracker.transition(to) {
            warn!(
                target: "esp_resolver",
                key, from = %tracker.state(), to = %to,
                "rejected lookup state transition"
            );
        }
    }

    /// Bring `key`'s tracker to `MetadataVerified` if it hasn't been there
    /// yet, for lookups served from a cache that predates this call.
    async fn ensure_metadata_verified_state(&self, key: &str) {
        let at_idle = {
            let states = self.lookup_state.lock().await;
            states
                .get(key)
                .map_or(true, |t| t.state() == LookupState::Idle)
        };
        if at_idle {
            self.transition(key, LookupState::MetadataFetching).await;
            self.transition(key, LookupState::MetadataVerified).await;
        }
    }

    async fn ensure_metadata(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
    ) -> Result<DependencyMetadata, PackageLoadError> {
        let key = Self::cache_key(pkg);
        if let Some(cached) = self.cached_metadata.lock().await.get(&key) {
            let cached = cached.clone();
            self.ensure_metadata_verified_state(&key).await;
            return Ok(cached);
        }

        self.transition(&key, LookupState::MetadataFetching).await;

        let url = pkg.metadata_request_uri();
        let (body, digest) =
            retry_async(&self.retry_config, || http::fetch(&self.client, &url)).await?;

        let expected = checksums
            .map(|c| c.sha256.as_str())
            .or_else(|| pkg.checksum_sha256());
        if let Some(expected) = expected {
            if !self.verifier.matches(expected, &digest) {
                return Err(PackageLoadError::InvalidPackageMetadataChecksum {
                    display_name: pkg.to_string(),
                    actual: digest,
                    expected: expected.to_string(),
                    url,
                });
            }
        }

        let metadata: DependencyMetadata =
            serde_json::from_slice(&body).map_err(|e| PackageLoadError::InvalidDependencyMetadata {
                display_name: pkg.to_string(),
                reason: e.to_string(),
            })?;

        if !metadata.package_zip_url.starts_with("https://") {
            return Err(PackageLoadError::InvalidPackageZipUrl {
                url: metadata.package_zip_url.clone(),
            });
        }

        self.transition(&key, LookupState::MetadataVerified).await;

        self.cached_metadata
            .lock()
            .await
            .entry(key)
            .or_insert_with(|| metadata.clone());
        Ok(metadata)
    }

    async fn ensure_zip(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
    ) -> Result<Arc<ZipIndex>, PackageLoadError> {
        let key = Self::cache_key(pkg);
        // Locking for the whole fetch keeps concurrent lookups for the same
        // URI from racing (`spec.md` §5).
        let mut entries = self.cached_entries.lock().await;
        if let Some(index) = entries.get(&key) {
            return Ok(Arc::clone(index));
        }

        let metadata = self.ensure_metadata(pkg, checksums).await?;
        self.transition(&key, LookupState::ZipFetching).await;
        debug!(target: "esp_resolver", url = %metadata.package_zip_url, "fetching package zip");
        let (body, digest) = retry_async(&self.retry_config, || {
            http::fetch(&self.client, &metadata.package_zip_url)
        })
        .await?;

        if !self
            .verifier
            .matches(&metadata.package_zip_checksums.sha256, &digest)
        {
            return Err(PackageLoadError::InvalidPackageZipChecksum {
                display_name: pkg.to_string(),
                actual: digest,
                expected: metadata.package_zip_checksums.sha256.clone(),
                url: metadata.package_zip_url.clone(),
            });
        }

        let index = Arc::new(ZipIndex::build(&body, &pkg.to_string())?);
        self.transition(&key, LookupState::ZipOpen).await;
        entries.insert(key, Arc::clone(&index));
        Ok(index)
    }
}

impl Default for InMemoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageResolver for InMemoryResolver {
    async fn get_dependency_metadata(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
    ) -> Result<DependencyMetadata, PackageLoadError> {
        self.ensure_metadata(pkg, checksums).await
    }

    async fn download_package(
        &self,
        _pkg: &PackageUri,
        _checksums: Option<&Checksums>,
        _transitive: bool,
    ) -> Result<(), PackageLoadError> {
        Err(PackageLoadError::OperationNotSupported {
            operation: "downloadPackage",
        })
    }

    async fn get_bytes(
        &self,
        asset: &PackageAssetUri,
        allow_directory: bool,
        checksums: Option<&Checksums>,
    ) -> Result<Vec<u8>, PackageLoadError> {
        let index = self.ensure_zip(asset.package(), checksums).await?;
        let fragment = asset.fragment();
        if index.is_directory(fragment) {
            if allow_directory {
                return Ok(Vec::new());
            }
            return Err(PackageLoadError::FileIsADirectory {
                asset: fragment.to_string(),
            });
        }
        index
            .file_bytes(fragment)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| PackageLoadError::NotFound {
                asset: fragment.to_string(),
            })
    }

    async fn list_elements(
        &self,
        asset: &PackageAssetUri,
        checksums: Option<&Checksums>,
    ) -> Result<Vec<PathElement>, PackageLoadError> {
        let index = self.ensure_zip(asset.package(), checksums).await?;
        index
            .list_elements(asset.fragment())
            .map(<[PathElement]>::to_vec)
            .ok_or_else(|| PackageLoadError::NotFound {
                asset: asset.fragment().to_string(),
            })
    }

    async fn has_element(
        &self,
        asset: &PackageAssetUri,
        checksums: Option<&Checksums>,
    ) -> Result<bool, PackageLoadError> {
        let index = self.ensure_zip(asset.package(), checksums).await?;
        Ok(index.has_element(asset.fragment()))
    }

    async fn close(&self) {
        self.cached_metadata.lock().await.clear();
        self.cached_entries.lock().await.clear();
        self.lookup_state.lock().await.clear();
    }
}
