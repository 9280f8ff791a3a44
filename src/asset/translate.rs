//! Local path → public URI translation.
//!
//! ```text
//! app/css/site/main.sass  (root: app/css, prefix: /css, sass → css)
//!   → /css/site/main.css
//! ```

use std::path::{Component, Path};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::uri;
use crate::error::{AssetError, Result};

/// Compile-source extension → served extension table.
///
/// Populated by whichever compile integrations are installed. Lookups are
/// by bare extension (`"sass"`, not `".sass"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionMap(FxHashMap<String, String>);

impl ExtensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the common stylesheet and script preprocessors.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for ext in ["sass", "scss", "less", "styl"] {
            map.insert(ext, "css");
        }
        for ext in ["coffee", "ts"] {
            map.insert(ext, "js");
        }
        map
    }

    /// Register `source` files as served under `target`.
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        let source = source.into().trim_start_matches('.').to_string();
        let target = target.into().trim_start_matches('.').to_string();
        self.0.insert(source, target);
    }

    /// Served extension for a source extension.
    pub fn target(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rewrite the extension of `uri` if it has a mapping.
    pub fn map_uri(&self, uri: &str) -> String {
        match uri::extension(uri).and_then(|ext| self.target(ext).map(|t| (ext, t))) {
            Some((ext, target)) => {
                let stem = &uri[..uri.len() - ext.len()];
                format!("{stem}{target}")
            }
            None => uri.to_string(),
        }
    }

    /// Merge another table, its entries win.
    pub fn extend(&mut self, other: &ExtensionMap) {
        for (source, target) in &other.0 {
            self.0.insert(source.clone(), target.clone());
        }
    }
}

/// Compute the public URI of `local_file` served from `local_root` under
/// `url_prefix`, applying any extension remap.
///
/// # Errors
///
/// `InvalidArgument` if the prefix or root is empty, or if `local_file` is
/// not inside `local_root`.
pub fn to_public_uri(
    local_file: &Path,
    url_prefix: &str,
    local_root: &Path,
    extensions: &ExtensionMap,
) -> Result<String> {
    if url_prefix.is_empty() {
        return Err(AssetError::invalid("url prefix must not be empty"));
    }
    if local_root.as_os_str().is_empty() {
        return Err(AssetError::invalid("local directory must not be empty"));
    }

    let relative = local_file.strip_prefix(local_root).map_err(|_| {
        AssetError::invalid(format!(
            "'{}' is not inside '{}'",
            local_file.display(),
            local_root.display()
        ))
    })?;

    // Forward slashes regardless of platform
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();

    let public = uri::join(url_prefix, &segments.join("/"));
    Ok(extensions.map_uri(&public))
}
