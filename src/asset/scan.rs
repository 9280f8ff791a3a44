//! File discovery and glob matching over served directories (pure, no
//! side effects).
//!
//! ```text
//! /js  → app/js          /js/app.js            → app/js/app.js
//!        ├── app.js      /js/vendor/jquery.js  → app/js/vendor/jquery.js
//!        ├── _draft.js   (ignored)
//!        └── vendor/
//!            └── jquery.js
//! ```
//!
//! Nothing is cached: every call walks the filesystem again, so results
//! always reflect the current registry and directory contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use jwalk::WalkDir;
use rustc_hash::FxHashSet;

use crate::error::{AssetError, Result};

use super::registry::{AssetRegistry, ServedMapping};
use super::translate::to_public_uri;
use super::AssetFile;

/// `*` crosses `/`, so `/js/*.js` also matches `/js/vendor/jquery.js`.
const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Public URI → local path for every discoverable file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex(BTreeMap<String, PathBuf>);

impl FileIndex {
    pub fn get(&self, uri: &str) -> Option<&Path> {
        self.0.get(uri).map(PathBuf::as_path)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.0.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries sorted by URI.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(u, p)| (u.as_str(), p.as_path()))
    }

    /// Files matching `patterns`, grouped by pattern in order.
    ///
    /// Matches are sorted within each pattern. A URI matched by several
    /// patterns appears once per pattern.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed pattern.
    pub fn glob<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<AssetFile>> {
        let mut matches = Vec::new();
        for spec in patterns {
            let spec = spec.as_ref();
            let pattern = Pattern::new(spec)
                .map_err(|e| AssetError::invalid(format!("glob '{spec}': {e}")))?;
            // BTreeMap iteration is already lexicographic
            matches.extend(
                self.0
                    .iter()
                    .filter(|(uri, _)| pattern.matches_with(uri, MATCH))
                    .map(|(uri, source)| AssetFile::new(uri.clone(), source.clone())),
            );
        }
        Ok(matches)
    }
}

impl FromIterator<(String, PathBuf)> for FileIndex {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Glob queries against a registry.
#[derive(Debug, Clone, Copy)]
pub struct GlobEngine<'a> {
    registry: &'a AssetRegistry,
}

impl<'a> GlobEngine<'a> {
    pub fn new(registry: &'a AssetRegistry) -> Self {
        Self { registry }
    }

    /// Walk every served directory and index its files by public URI.
    ///
    /// Mappings are walked in registration order, so on a URI collision the
    /// later mapping's file wins.
    pub fn all_files(&self) -> FileIndex {
        let mut index = BTreeMap::new();
        for mapping in self.registry.mappings() {
            for file in self.scan_mapping(mapping) {
                index.insert(file.uri, file.source);
            }
        }
        FileIndex(index)
    }

    /// Files under one mapping, sorted by path.
    pub fn scan_mapping(&self, mapping: &ServedMapping) -> Vec<AssetFile> {
        if !mapping.dir.is_dir() {
            return vec![];
        }

        let mut files: Vec<_> = WalkDir::new(&mapping.dir)
            .skip_hidden(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| {
                let relative = path.strip_prefix(&mapping.dir).unwrap_or(path.as_path());
                !self.registry.is_ignored(relative)
            })
            .collect();
        files.sort();

        files
            .into_iter()
            .filter_map(|path| {
                let uri = to_public_uri(
                    &path,
                    &mapping.prefix,
                    &mapping.dir,
                    self.registry.extensions(),
                )
                .ok()?;
                Some(AssetFile::new(uri, path))
            })
            .collect()
    }

    /// See [`FileIndex::glob`]; walks the filesystem once.
    pub fn glob<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<AssetFile>> {
        self.all_files().glob(patterns)
    }
}

/// Keep the first occurrence of each URI, preserving order.
///
/// Used where a file must load once (bundles, tags) while its position is
/// still decided by the earliest pattern that matched it.
pub fn dedup_first(files: Vec<AssetFile>) -> Vec<AssetFile> {
    let mut seen = FxHashSet::default();
    files
        .into_iter()
        .filter(|f| seen.insert(f.uri.clone()))
        .collect()
}
