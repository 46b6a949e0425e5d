// SPDX-License-Identifier: MIT OR Apache-2.0
//! `PackageURI` and `PackageAssetURI` parsing and rendering (`spec.md` §3, §6).

use std::fmt;
use thiserror::Error;

/// The two schemes a [`PackageUri`] may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `package:` — an external, already-resolved package reference.
    Package,
    /// `projectpackage:` — a package reference scoped to a project.
    ProjectPackage,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::ProjectPackage => "projectpackage",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "package" => Some(Self::Package),
            "projectpackage" => Some(Self::ProjectPackage),
            _ => None,
        }
    }
}

/// A parse failure for a [`PackageUri`] or [`PackageAssetUri`] string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UriParseError {
    /// The scheme was neither `package` nor `projectpackage`.
    #[error("unrecognized package URI scheme: {0}")]
    UnrecognizedScheme(String),

    /// The URI was missing the `scheme://authority/...` separator.
    #[error("missing authority in package URI: {0}")]
    MissingAuthority(String),

    /// The path component contained no `@version` suffix.
    #[error("package URI path has no @version: {0}")]
    MissingVersion(String),

    /// A `::algorithm:checksum` tail was present but `algorithm` was not `sha256`.
    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedChecksumAlgorithm(String),

    /// A `PackageAssetUri` was parsed with no fragment, or a fragment not
    /// starting with `/`.
    #[error("package asset URI fragment must start with '/': {0}")]
    InvalidFragment(String),
}

/// `scheme://authority/pathWithoutVersion@version[::sha256:checksum]`.
///
/// Two `PackageUri`s are equal iff their normalized string forms (without a
/// fragment, which this type never carries) are equal — plain structural
/// equality over every field, including the checksum tail (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageUri {
    scheme: SchemeRepr,
    authority: String,
    path_without_version: String,
    version: String,
    checksum_sha256: Option<String>,
}

// Stored separately from the public `Scheme` enum so `Hash`/`Eq` derive cleanly
// without re-deriving them by hand on `Scheme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SchemeRepr {
    Package,
    ProjectPackage,
}

impl From<Scheme> for SchemeRepr {
    fn from(s: Scheme) -> Self {
        match s {
            Scheme::Package => Self::Package,
            Scheme::ProjectPackage => Self::ProjectPackage,
        }
    }
}

impl From<SchemeRepr> for Scheme {
    fn from(s: SchemeRepr) -> Self {
        match s {
            SchemeRepr::Package => Self::Package,
            SchemeRepr::ProjectPackage => Self::ProjectPackage,
        }
    }
}

impl PackageUri {
    /// Parse a `PackageURI` string. Rejects a trailing `#fragment`; use
    /// [`PackageAssetUri::parse`] for asset URIs.
    pub fn parse(s: &str) -> Result<Self, UriParseError> {
        if s.contains('#') {
            return Err(UriParseError::MissingVersion(s.to_string()));
        }
        let (scheme_str, rest) = s
            .split_once("://")
            .ok_or_else(|| UriParseError::MissingAuthority(s.to_string()))?;
        let scheme = Scheme::parse(scheme_str)
            .ok_or_else(|| UriParseError::UnrecognizedScheme(scheme_str.to_string()))?;

        let (authority, path_and_checksum) = rest
            .split_once('/')
            .ok_or_else(|| UriParseError::MissingAuthority(s.to_string()))?;

        let (path_and_version, checksum_sha256) = match path_and_checksum.split_once("::") {
            Some((path, tail)) => {
                let (algorithm, hex) = tail
                    .split_once(':')
                    .ok_or_else(|| UriParseError::UnsupportedChecksumAlgorithm(tail.to_string()))?;
                if algorithm != "sha256" {
                    return Err(UriParseError::UnsupportedChecksumAlgorithm(
                        algorithm.to_string(),
                    ));
                }
                (path, Some(hex.to_string()))
            }
            None => (path_and_checksum, None),
        };

        let (path_without_version, version) = path_and_version
            .rsplit_once('@')
            .ok_or_else(|| UriParseError::MissingVersion(s.to_string()))?;

        Ok(Self {
            scheme: scheme.into(),
            authority: authority.to_string(),
            path_without_version: path_without_version.to_string(),
            version: version.to_string(),
            checksum_sha256,
        })
    }

    /// The URI scheme (`package` or `projectpackage`).
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme.into()
    }

    /// Authority (host) component.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Path prefix before the last `@`.
    #[must_use]
    pub fn path_without_version(&self) -> &str {
        &self.path_without_version
    }

    /// Version string after the last `@`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// SHA-256 checksum tail, if the URI carried one.
    #[must_use]
    pub fn checksum_sha256(&self) -> Option<&str> {
        self.checksum_sha256.as_deref()
    }

    /// The last path segment before `@version`, used to name cache files.
    #[must_use]
    pub fn last_path_segment(&self) -> &str {
        self.path_without_version
            .rsplit('/')
            .next()
            .unwrap_or(&self.path_without_version)
    }

    /// Rewrite a `projectpackage:` URI to the equivalent `package:` URI.
    /// A no-op on an already-external URI.
    #[must_use]
    pub fn to_external_package_uri(&self) -> Self {
        Self {
            scheme: SchemeRepr::Package,
            ..self.clone()
        }
    }

    /// Rewrite a `package:` URI to the equivalent `projectpackage:` URI.
    /// A no-op on an already-project-scoped URI.
    #[must_use]
    pub fn to_project_package_uri(&self) -> Self {
        Self {
            scheme: SchemeRepr::ProjectPackage,
            ..self.clone()
        }
    }

    /// The `https:` URI this package's `DependencyMetadata` document is
    /// fetched from: same authority/path, no checksum tail.
    #[must_use]
    pub fn metadata_request_uri(&self) -> String {
        format!(
            "https://{}/{}@{}",
            self.authority, self.path_without_version, self.version
        )
    }
}

impl fmt::Display for PackageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/{}@{}",
            Scheme::from(self.scheme).as_str(),
            self.authority,
            self.path_without_version,
            self.version
        )?;
        if let Some(hex) = &self.checksum_sha256 {
            write!(f, "::sha256:{hex}")?;
        }
        Ok(())
    }
}

/// A [`PackageUri`] plus a non-empty fragment beginning with `/`, addressing
/// one asset inside the package (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageAssetUri {
    package: PackageUri,
    fragment: String,
}

impl PackageAssetUri {
    /// Parse a `PackageAssetURI` string; requires a `#fragment` that starts
    /// with `/`.
    pub fn parse(s: &str) -> Result<Self, UriParseError> {
        let (base, fragment) = s
            .split_once('#')
            .ok_or_else(|| UriParseError::InvalidFragment(s.to_string()))?;
        if !fragment.starts_with('/') {
            return Err(UriParseError::InvalidFragment(s.to_string()));
        }
        let package = PackageUri::parse(base)?;
        Ok(Self {
            package,
            fragment: fragment.to_string(),
        })
    }

    /// The package this asset lives in.
    #[must_use]
    pub fn package(&self) -> &PackageUri {
        &self.package
    }

    /// The asset's path within the package, always starting with `/`.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Join a relative asset path onto this one, applying standard
    /// `.`/`..` path normalization (`spec.md` §3).
    #[must_use]
    pub fn join(&self, relative: &str) -> Self {
        let base_dir = self.fragment.rsplit_once('/').map_or("", |(dir, _)| dir);
        let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
        for part in relative.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                seg => segments.push(seg),
            }
        }
        Self {
            package: self.package.clone(),
            fragment: format!("/{}", segments.join("/")),
        }
    }
}

impl fmt::Display for PackageAssetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.package, self.fragment)
    }
}
