// SPDX-License-Identifier: MIT OR Apache-2.0
//! esp-package
#![warn(missing_docs)]
//!
//! Package identity (`PackageURI`/`PackageAssetURI`) and the
//! `DependencyMetadata` document format used by the package resolver
//! (`spec.md` §3, §6).

mod metadata;
mod uri;

pub use metadata::{DependencyMetadata, DependencyRef};
pub use uri::{PackageAssetUri, PackageUri, Scheme, UriParseError};
