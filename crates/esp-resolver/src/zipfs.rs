// SPDX-License-Identifier: MIT OR Apache-2.0
//! Indexes a package zip archive into a directory tree plus a flat
//! `asset_path → bytes` map, shared by the in-memory and disk-cached
//! resolvers (`spec.md` §4.4).

use esp_core::PathElement;
use esp_error::PackageLoadError;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

/// An indexed package archive: every file's bytes keyed by its
/// slash-prefixed fragment path, plus the directory listing for every
/// directory fragment (including `"/"`, the root).
#[derive(Debug, Clone)]
pub struct ZipIndex {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeMap<String, Vec<PathElement>>,
}

impl ZipIndex {
    /// Parse `bytes` as a zip archive and build the file/directory index.
    /// `display_name` is used only to contextualize error messages.
    pub fn build(bytes: &[u8], display_name: &str) -> Result<Self, PackageLoadError> {
        let reader = Cursor::new(bytes);
        let mut archive = zip::ZipArchive::new(reader).map_err(|e| {
            PackageLoadError::InvalidDependencyMetadata {
                display_name: display_name.to_string(),
                reason: format!("not a valid zip archive: {e}"),
            }
        })?;

        let mut files = BTreeMap::new();
        let mut dir_children: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| {
                PackageLoadError::InvalidDependencyMetadata {
                    display_name: display_name.to_string(),
                    reason: format!("corrupt zip entry: {e}"),
                }
            })?;
            let raw_name = entry.name().to_string();
            let is_dir = entry.is_dir() || raw_name.ends_with('/');
            let fragment = format!("/{}", raw_name.trim_end_matches('/'));

            register_ancestors(&mut dir_children, &fragment, is_dir);

            if !is_dir {
                let mut buf = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut buf).map_err(|e| {
                    PackageLoadError::InvalidDependencyMetadata {
                        display_name: display_name.to_string(),
                        reason: format!("failed reading entry '{raw_name}': {e}"),
                    }
                })?;
                files.insert(fragment, buf);
            }
        }

        let directories = dir_children
            .into_iter()
            .map(|(dir, children)| {
                let mut elements: Vec<PathElement> = children
                    .into_iter()
                    .map(|(name, is_directory)| PathElement { name, is_directory })
                    .collect();
                elements.sort_by(|a, b| a.name.cmp(&b.name));
                (dir, elements)
            })
            .collect();

        Ok(Self { files, directories })
    }

    /// Bytes for a file fragment path. `None` if the fragment doesn't name
    /// a file (either absent, or a directory).
    #[must_use]
    pub fn file_bytes(&self, fragment: &str) -> Option<&[u8]> {
        self.files.get(fragment).map(Vec::as_slice)
    }

    /// Whether `fragment` names a directory in this archive.
    #[must_use]
    pub fn is_directory(&self, fragment: &str) -> bool {
        self.directories.contains_key(fragment)
    }

    /// Whether `fragment` names either a file or a directory in this archive.
    #[must_use]
    pub fn has_element(&self, fragment: &str) -> bool {
        self.files.contains_key(fragment) || self.directories.contains_key(fragment)
    }

    /// Directory listing for `fragment`. `None` if it isn't a known directory.
    #[must_use]
    pub fn list_elements(&self, fragment: &str) -> Option<&[PathElement]> {
        self.directories.get(fragment).map(Vec::as_slice)
    }
}

/// Record `fragment` (and every ancestor directory up to `"/"`) as a child
/// of its parent, so a directory listing exists even for directories with
/// no explicit zip entry (only inferred from file paths).
fn register_ancestors(
    dir_children: &mut BTreeMap<String, BTreeMap<String, bool>>,
    fragment: &str,
    is_dir: bool,
) {
    let segments: Vec<&str> = fragment.trim_start_matches('/').split('/').collect();
    dir_children.entry("/".to_string()).or_default();

    let mut parent = String::from("/");
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        let is_leaf = i == segments.len() - 1;
        let segment_is_dir = if is_leaf { is_dir } else { true };
        dir_children
            .entry(parent.clone())
            .or_default()
            .entry((*segment).to_string())
            .or_insert(segment_is_dir);

        parent = if parent == "/" {
            format!("/{segment}")
        } else {
            format!("{parent}/{segment}")
        };
        if segment_is_dir {
            dir_children.entry(parent.clone()).or_default();
        }
    }
}
