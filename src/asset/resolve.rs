//! Public URI → local file resolution.
//!
//! Prefix matching is literal and order-dependent: the first registered
//! mapping whose prefix starts the URI wins, even if a later mapping has a
//! longer (more specific) prefix. Register specific prefixes first when
//! they overlap.

use std::path::{Path, PathBuf};

use crate::core::uri;

use super::buster::{strip_extension, strip_token, trailing_token};
use super::registry::{AssetRegistry, ServedMapping};

/// Read-only lookups against a registry and the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct FileResolver<'a> {
    registry: &'a AssetRegistry,
}

impl<'a> FileResolver<'a> {
    pub fn new(registry: &'a AssetRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `uri` to an existing file by literal path.
    pub fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let uri = uri::squeeze_slashes(uri);
        let mapping = self.mapping_for(&uri)?;
        let relative = relative_to(&uri, mapping)?;
        let path = mapping.dir.join(relative);
        path.is_file().then_some(path)
    }

    /// Resolve a URI whose backing file has a different extension or whose
    /// name carries a cache-buster token.
    ///
    /// The final extension is stripped first, then a trailing numeric token,
    /// then the remaining base name is matched with any extension inside
    /// `local_dir` (relative to the application root). Reversing the first
    /// two steps would miss `app.28389.css` backed by `app.sass`. A token
    /// appended to an extensionless name (`LICENSE.28389`) maps to that
    /// name.
    pub fn resolve_dynamic(&self, uri: &str, local_dir: &Path) -> Option<PathBuf> {
        let uri = uri::squeeze_slashes(uri);
        let dir = self.registry.root().join(local_dir);

        let mapping = self
            .registry
            .mappings()
            .iter()
            .find(|m| m.dir == dir && uri.starts_with(&m.prefix))
            .or_else(|| self.mapping_for(&uri));
        let relative = match mapping {
            Some(mapping) => relative_to(&uri, mapping)?,
            None if uri::has_parent_segment(&uri) => return None,
            None => uri.trim_start_matches('/'),
        };

        let (stem, ext) = strip_extension(relative);
        if ext.is_some_and(|ext| trailing_token(stem, ext).is_some()) {
            let path = dir.join(stem);
            if path.is_file() {
                return Some(path);
            }
        }
        let (base, _token) = strip_token(stem);
        if base.is_empty() {
            return None;
        }

        let pattern = format!(
            "{}.*",
            glob::Pattern::escape(&dir.join(base).to_string_lossy())
        );
        glob::glob(&pattern)
            .ok()?
            .filter_map(Result::ok)
            .find(|path| path.is_file())
    }

    /// Resolve by literal path, falling back to dynamic lookup in the
    /// matching mapping's directory.
    pub fn lookup(&self, uri: &str) -> Option<PathBuf> {
        if let Some(path) = self.resolve(uri) {
            return Some(path);
        }
        let mapping = self.mapping_for(&uri::squeeze_slashes(uri))?;
        self.resolve_dynamic(uri, &mapping.from)
    }

    /// Check whether `uri` is backed by any file.
    pub fn exists(&self, uri: &str) -> bool {
        self.lookup(uri).is_some()
    }

    /// First mapping whose prefix starts `uri`, in registration order.
    pub fn mapping_for(&self, uri: &str) -> Option<&'a ServedMapping> {
        self.registry
            .mappings()
            .iter()
            .find(|m| uri.starts_with(&m.prefix))
    }
}

/// Path of `uri` below `mapping`, refusing `..` segments.
fn relative_to<'u>(uri: &'u str, mapping: &ServedMapping) -> Option<&'u str> {
    let rest = uri.strip_prefix(&mapping.prefix)?;
    if uri::has_parent_segment(rest) {
        return None;
    }
    Some(rest.trim_start_matches('/'))
}
