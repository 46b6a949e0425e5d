// SPDX-License-Identifier: MIT OR Apache-2.0
//! The disk-cached package resolver: persists fetched metadata and zip
//! archives under a cache directory, skipping the network entirely on a
//! cache hit (`spec.md` §4.4, §6).

use crate::checksum::Verifier;
use crate::http;
use crate::resolver::PackageResolver;
use crate::retry::{retry_async, RetryConfig};
use crate::state::{LookupState, LookupTracker};
use crate::zipfs::ZipIndex;
use async_trait::async_trait;
use esp_core::{Checksums, PathElement};
use esp_error::PackageLoadError;
use esp_package::{DependencyMetadata, PackageAssetUri, PackageUri};
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File permissions cache files are created with: owner, group, and other
/// read, no write — `spec.md` §6.
#[cfg(unix)]
const CACHE_FILE_MODE: u32 = 0o444;

/// Fetches package metadata and zip archives over HTTPS into a persistent
/// on-disk cache laid out as `<cacheDir>/package-1/<authority>/
/// <pathWithoutVersion>/<lastSegment>@<version>.{json,zip}`. Cache hits skip
/// the network entirely.
pub struct DiskCachedResolver {
    cache_dir: PathBuf,
    client: Client,
    retry_config: RetryConfig,
    verifier: Verifier,
    cached_metadata: Mutex<HashMap<String, DependencyMetadata>>,
    file_systems: Mutex<HashMap<String, Arc<ZipIndex>>>,
    lookup_state: Mutex<HashMap<String, LookupTracker>>,
}

impl DiskCachedResolver {
    /// Build a resolver rooted at `cache_dir`, creating it (and its `tmp/`
    /// staging subdirectory) if absent.
    pub async fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, PackageLoadError> {
        let cache_dir = cache_dir.into();
        let tmp_dir = cache_dir.join("tmp");
        tokio::fs::create_dir_all(&tmp_dir)
            .await
            .map_err(|e| io_error(&tmp_dir, &e))?;
        Ok(Self {
            cache_dir,
            client: Client::new(),
            retry_config: RetryConfig::default(),
            verifier: Verifier::new(),
            cached_metadata: Mutex::new(HashMap::new()),
            file_systems: Mutex::new(HashMap::new()),
            lookup_state: Mutex::new(HashMap::new()),
        })
    }

    /// Build a resolver that honors the `$skipChecksumVerification`
    /// sentinel. Exists only for the test harness; unreachable from a
    /// production dependent (`spec.md` §9).
    #[cfg(test)]
    pub async fn with_test_mode(cache_dir: impl Into<PathBuf>) -> Result<Self, PackageLoadError> {
        let mut resolver = Self::new(cache_dir).await?;
        resolver.verifier = Verifier::with_test_mode();
        Ok(resolver)
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

    fn entry_dir(&self, pkg: &PackageUri) -> PathBuf {
        self.cache_dir
            .join("package-1")
            .join(pkg.authority())
            .join(pkg.path_without_version())
    }

    fn entry_stem(pkg: &PackageUri) -> String {
        format!("{}@{}", pkg.last_path_segment(), pkg.version())
    }

    fn metadata_path(&self, pkg: &PackageUri) -> PathBuf {
        self.entry_dir(pkg)
            .join(format!("{}.json", Self::entry_stem(pkg)))
    }

    fn zip_path(&self, pkg: &PackageUri) -> PathBuf {
        self.entry_dir(pkg)
            .join(format!("{}.zip", Self::entry_stem(pkg)))
    }

    fn tmp_path(&self) -> PathBuf {
        self.cache_dir.join("tmp").join(uuid::Uuid::new_v4().to_string())
    }

    /// Write `bytes` to a fresh file under `tmp/`, then atomically move it
    /// into `dest` and mark it read-only (`spec.md` §6).
    async fn stage_and_commit(&self, bytes: &[u8], dest: &Path) -> Result<(), PackageLoadError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_error(&tmp, &e))?;
        tokio::fs::rename(&tmp, dest)
            .await
            .map_err(|e| io_error(dest, &e))?;
        set_read_only(dest).await?;
        Ok(())
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

        let metadata_path = self.metadata_path(pkg);
        if let Ok(bytes) = tokio::fs::read(&metadata_path).await {
            debug!(target: "esp_resolver", path = %metadata_path.display(), "metadata cache hit");
            let metadata: DependencyMetadata = serde_json::from_slice(&bytes).map_err(|e| {
                PackageLoadError::InvalidDependencyMetadata {
                    display_name: pkg.to_string(),
                    reason: e.to_string(),
                }
            })?;
            self.ensure_metadata_verified_state(&key).await;
            self.cached_metadata
                .lock()
                .await
                .insert(key, metadata.clone());
            return Ok(metadata);
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
        self.stage_and_commit(&body, &metadata_path).await?;
        self.cached_metadata
            .lock()
            .await
            .insert(key, metadata.clone());
        Ok(metadata)
    }

    async fn ensure_zip(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
    ) -> Result<Arc<ZipIndex>, PackageLoadError> {
        let key = Self::cache_key(pkg);
        let mut file_systems = self.file_systems.lock().await;
        if let Some(index) = file_systems.get(&key) {
            return Ok(Arc::clone(index));
        }

        let metadata = self.ensure_metadata(pkg, checksums).await?;
        self.transition(&key, LookupState::ZipFetching).await;
        let zip_path = self.zip_path(pkg);

        let body = if let Ok(bytes) = tokio::fs::read(&zip_path).await {
            debug!(target: "esp_resolver", path = %zip_path.display(), "zip cache hit");
            bytes
        } else {
            let (body, digest) = retry_async(&self.retry_config, || {
                http::fetch(&self.client, &metadata.package_zip_url)
            })
            .await?;

            if !self
                .verifier
                .matches(&metadata.package_zip_checksums.sha256, &digest)
            {
                let tmp = self.tmp_path();
                let _ = tokio::fs::remove_file(&tmp).await;
                return Err(PackageLoadError::InvalidPackageZipChecksum {
                    display_name: pkg.to_string(),
                    actual: digest,
                    expected: metadata.package_zip_checksums.sha256.clone(),
                    url: metadata.package_zip_url.clone(),
                });
            }

            self.stage_and_commit(&body, &zip_path).await?;
            body
        };

        let index = Arc::new(ZipIndex::build(&body, &pkg.to_string())?);
        self.transition(&key, LookupState::ZipOpen).await;
        file_systems.insert(key, Arc::clone(&index));
        Ok(index)
    }

    async fn download_one(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
    ) -> Result<DependencyMetadata, PackageLoadError> {
        self.ensure_zip(pkg, checksums).await?;
        self.ensure_metadata(pkg, checksums).await
    }
}

#[cfg(unix)]
async fn set_read_only(path: &Path) -> Result<(), PackageLoadError> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(CACHE_FILE_MODE);
    tokio::fs::set_permissions(path, perms)
        .await
        .map_err(|e| io_error(path, &e))
}

#[cfg(not(unix))]
async fn set_read_only(path: &Path) -> Result<(), PackageLoadError> {
    let mut perms = tokio::fs::metadata(path)
        .await
        .map_err(|e| io_error(path, &e))?
        .permissions();
    perms.set_readonly(true);
    tokio::fs::set_permissions(path, perms)
        .await
        .map_err(|e| io_error(path, &e))
}

fn io_error(path: &Path, err: &std::io::Error) -> PackageLoadError {
    PackageLoadError::IoErrorMakingHttpGet {
        url: path.display().to_string(),
        source: err.to_string(),
    }
}

#[async_trait]
impl PackageResolver for DiskCachedResolver {
    async fn get_dependency_metadata(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
    ) -> Result<DependencyMetadata, PackageLoadError> {
        self.ensure_metadata(pkg, checksums).await
    }

    async fn download_package(
        &self,
        pkg: &PackageUri,
        checksums: Option<&Checksums>,
        transitive: bool,
    ) -> Result<(), PackageLoadError> {
        let metadata = self.download_one(pkg, checksums).await?;
        if !transitive {
            return Ok(());
        }

        let mut stack: Vec<(PackageUri, Option<Checksums>)> = metadata
            .dependencies
            .values()
            .filter_map(|dep| {
                PackageUri::parse(&dep.uri)
                    .ok()
                    .map(|uri| (uri, dep.checksums.clone()))
            })
            .collect();

        while let Some((dep_pkg, dep_checksums)) = stack.pop() {
            let dep_metadata = self
                .download_one(&dep_pkg, dep_checksums.as_ref())
                .await?;
            for dep in dep_metadata.dependencies.values() {
                if let Ok(uri) = PackageUri::parse(&dep.uri) {
                    stack.push((uri, dep.checksums.clone()));
                }
            }
        }
        Ok(())
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
        self.file_systems.lock().await.clear();
        self.lookup_state.lock().await.clear();
    }
}
