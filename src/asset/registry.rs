//! Served directories and packages.
//!
//! The registry is a plain value owned by the caller. It records what is
//! served and bundled; file discovery and resolution happen on demand in
//! [`GlobEngine`](super::GlobEngine) and [`FileResolver`](super::FileResolver)
//! against whatever the filesystem holds at query time.

use std::path::{Component, Path, PathBuf};

use glob::Pattern;

use crate::core::uri;
use crate::debug;
use crate::error::{AssetError, Result};

use super::{AssetFile, ExtensionMap, GlobEngine, MediaType};

/// Path component patterns excluded from discovery unless overridden:
/// dotfiles and `_partials`.
pub const DEFAULT_IGNORE: &[&str] = &[".*", "_*"];

/// Mappings registered by [`AssetRegistry::with_defaults`].
pub const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    ("/js", "app/js"),
    ("/css", "app/css"),
    ("/images", "app/images"),
];

/// A URL prefix served from a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedMapping {
    /// Normalized prefix, e.g. `/js`.
    pub prefix: String,
    /// Directory as configured, relative to the application root.
    pub from: PathBuf,
    /// Absolute directory (`root/from`).
    pub dir: PathBuf,
}

/// Options for [`AssetRegistry::serve`].
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Source directory relative to the application root. Required.
    pub from: Option<PathBuf>,
}

impl ServeOptions {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            from: Some(dir.into()),
        }
    }
}

/// A named bundle of files of one media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub kind: MediaType,
    /// URL directory the built package lives under, e.g. `/js`.
    pub url_path: String,
    /// Ordered glob patterns over public URIs.
    pub specs: Vec<String>,
}

impl Package {
    /// Identity key, e.g. `app.js`.
    pub fn key(&self) -> String {
        package_key(&self.name, self.kind)
    }

    /// Public URI of the built package, e.g. `/js/app.js`.
    pub fn path(&self) -> String {
        uri::join(&self.url_path, &self.key())
    }

    /// Member files in spec order, duplicates kept.
    pub fn files(&self, engine: &GlobEngine<'_>) -> Result<Vec<AssetFile>> {
        engine.glob(&self.specs)
    }
}

fn package_key(name: &str, kind: MediaType) -> String {
    format!("{name}.{}", kind.extension())
}

/// Registry of served mappings and packages.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    root: PathBuf,
    mappings: Vec<ServedMapping>,
    packages: Vec<Package>,
    ignored: Vec<Pattern>,
    extensions: ExtensionMap,
}

impl AssetRegistry {
    /// Empty registry resolving directories against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mappings: Vec::new(),
            packages: Vec::new(),
            ignored: default_ignores(),
            extensions: ExtensionMap::new(),
        }
    }

    /// Registry with the conventional script, style and image mappings.
    ///
    /// Directories that don't exist are skipped like any other `serve`.
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        let mut registry = Self::new(root);
        registry.register_defaults();
        registry
    }

    /// Register [`DEFAULT_MAPPINGS`].
    pub fn register_defaults(&mut self) {
        for (prefix, from) in DEFAULT_MAPPINGS {
            self.add_mapping(prefix, Path::new(from));
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Serve `opts.from` under `prefix`.
    ///
    /// A missing `from` is an error; a `from` directory that doesn't exist
    /// under the root is silently skipped so optional asset folders don't
    /// break configuration. Re-serving a prefix replaces its directory.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `prefix` is empty or `opts.from` is `None`.
    pub fn serve(&mut self, prefix: &str, opts: ServeOptions) -> Result<()> {
        if prefix.trim().is_empty() {
            return Err(AssetError::invalid("serve: prefix must not be empty"));
        }
        let Some(from) = opts.from else {
            return Err(AssetError::invalid(format!(
                "serve '{prefix}': missing source directory (`from`)"
            )));
        };
        self.add_mapping(prefix, &from);
        Ok(())
    }

    fn add_mapping(&mut self, prefix: &str, from: &Path) {
        let dir = self.root.join(from);
        if !dir.is_dir() {
            debug!("assets"; "skip {} (no directory {})", prefix, dir.display());
            return;
        }

        let mapping = ServedMapping {
            prefix: normalize_prefix(prefix),
            from: from.to_path_buf(),
            dir,
        };
        match self.mappings.iter_mut().find(|m| m.prefix == mapping.prefix) {
            Some(existing) => *existing = mapping,
            None => self.mappings.push(mapping),
        }
    }

    /// Define a package; an existing package with the same key is replaced.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `name` is empty or contains `/`.
    pub fn add_package<S: Into<String>>(
        &mut self,
        name: &str,
        kind: MediaType,
        url_path: &str,
        specs: impl IntoIterator<Item = S>,
    ) -> Result<()> {
        if name.is_empty() || name.contains('/') {
            return Err(AssetError::invalid(format!(
                "package name '{name}' must be non-empty and contain no '/'"
            )));
        }

        let package = Package {
            name: name.to_string(),
            kind,
            url_path: normalize_prefix(url_path),
            specs: specs.into_iter().map(Into::into).collect(),
        };
        let key = package.key();
        match self.packages.iter_mut().find(|p| p.key() == key) {
            Some(existing) => *existing = package,
            None => self.packages.push(package),
        }
        Ok(())
    }

    /// Exclude files with a path component matching `pattern` from discovery.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `pattern` is not a valid glob.
    pub fn ignore(&mut self, pattern: &str) -> Result<()> {
        let pattern = Pattern::new(pattern)
            .map_err(|e| AssetError::invalid(format!("ignore '{pattern}': {e}")))?;
        self.ignored.push(pattern);
        Ok(())
    }

    /// Drop all ignore patterns, including the defaults.
    pub fn clear_ignores(&mut self) {
        self.ignored.clear();
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionMap {
        &mut self.extensions
    }

    /// Clear mappings and packages, and restore default ignore patterns.
    ///
    /// The root and extension table are kept.
    pub fn reset(&mut self) {
        let extensions = std::mem::take(&mut self.extensions);
        *self = Self::new(std::mem::take(&mut self.root));
        self.extensions = extensions;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Mappings in registration order.
    pub fn mappings(&self) -> &[ServedMapping] {
        &self.mappings
    }

    /// Packages in definition order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Look up a package by key (`app.js`).
    pub fn package(&self, key: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.key() == key)
    }

    /// Look up a package by its built URI (`/js/app.js`).
    pub fn package_at(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path() == path)
    }

    pub fn extensions(&self) -> &ExtensionMap {
        &self.extensions
    }

    /// Check whether discovery should skip `relative`, a path relative to
    /// its served directory. Any matching component excludes the file, so an
    /// ignored directory hides everything below it.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        relative.components().any(|c| match c {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                self.ignored.iter().any(|p| p.matches(&name))
            }
            _ => false,
        })
    }
}

fn default_ignores() -> Vec<Pattern> {
    DEFAULT_IGNORE
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

/// `js//vendor/` → `/js/vendor`; `/` stays `/`.
fn normalize_prefix(prefix: &str) -> String {
    let squeezed = uri::squeeze_slashes(&format!("/{}", prefix.trim()));
    if squeezed.len() > 1 {
        squeezed.trim_end_matches('/').to_string()
    } else {
        squeezed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn app() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app/js")).unwrap();
        fs::create_dir_all(dir.path().join("app/css")).unwrap();
        dir
    }

    #[test]
    fn test_serve_existing_dir() {
        let dir = app();
        let mut registry = AssetRegistry::new(dir.path());
        registry.serve("/js", ServeOptions::from_dir("app/js")).unwrap();

        assert_eq!(registry.mappings().len(), 1);
        assert_eq!(registry.mappings()[0].prefix, "/js");
        assert_eq!(registry.mappings()[0].dir, dir.path().join("app/js"));
    }

    #[test]
    fn test_serve_missing_dir_is_skipped() {
        let dir = app();
        let mut registry = AssetRegistry::new(dir.path());
        registry.serve("/js", ServeOptions::from_dir("app/js")).unwrap();
        let before = registry.mappings().to_vec();

        registry
            .serve("/css", ServeOptions::from_dir("nonexistent/dir"))
            .unwrap();
        assert_eq!(registry.mappings(), before.as_slice());
    }

    #[test]
    fn test_serve_without_from_fails() {
        let dir = app();
        let mut registry = AssetRegistry::new(dir.path());
        let err = registry.serve("/css", ServeOptions::default()).unwrap_err();
        assert!(matches!(err, AssetError::InvalidArgument(_)));
        assert!(registry.serve("", ServeOptions::from_dir("app/css")).is_err());
    }

    #[test]
    fn test_serve_same_prefix_overwrites_in_place() {
        let dir = app();
        let mut registry = AssetRegistry::new(dir.path());
        registry.serve("/js", ServeOptions::from_dir("app/js")).unwrap();
        registry.serve("/css", ServeOptions::from_dir("app/css")).unwrap();
        registry.serve("js/", ServeOptions::from_dir("app/css")).unwrap();

        let prefixes: Vec<_> = registry.mappings().iter().map(|m| m.prefix.as_str()).collect();
        assert_eq!(prefixes, ["/js", "/css"]);
        assert_eq!(registry.mappings()[0].from, PathBuf::from("app/css"));
    }

    #[test]
    fn test_defaults_skip_missing_images() {
        let dir = app();
        let registry = AssetRegistry::with_defaults(dir.path());
        let prefixes: Vec<_> = registry.mappings().iter().map(|m| m.prefix.as_str()).collect();
        assert_eq!(prefixes, ["/js", "/css"]);
    }

    #[test]
    fn test_package_redefinition_replaces() {
        let dir = app();
        let mut registry = AssetRegistry::new(dir.path());
        registry
            .add_package("app", MediaType::Script, "/js", ["/js/app.js"])
            .unwrap();
        registry
            .add_package("app", MediaType::Style, "/css", ["/css/*.css"])
            .unwrap();
        registry
            .add_package("app", MediaType::Script, "/js", ["/js/other.js"])
            .unwrap();

        assert_eq!(registry.packages().len(), 2);
        let app = registry.package("app.js").unwrap();
        assert_eq!(app.specs, ["/js/other.js"]);
        assert_eq!(app.path(), "/js/app.js");
        assert_eq!(registry.package_at("/css/app.css").unwrap().kind, MediaType::Style);
    }

    #[test]
    fn test_package_name_validated() {
        let mut registry = AssetRegistry::new("/app");
        assert!(registry.add_package("", MediaType::Script, "/js", ["/js/*.js"]).is_err());
        assert!(registry.add_package("a/b", MediaType::Script, "/js", ["/js/*.js"]).is_err());
    }

    #[test]
    fn test_reset() {
        let dir = app();
        let mut registry = AssetRegistry::with_defaults(dir.path());
        registry
            .add_package("app", MediaType::Script, "/js", ["/js/*.js"])
            .unwrap();
        registry.clear_ignores();

        registry.reset();
        assert!(registry.mappings().is_empty());
        assert!(registry.packages().is_empty());
        assert!(registry.is_ignored(Path::new("_partial.sass")));
        assert_eq!(registry.root(), dir.path());
    }

    #[test]
    fn test_ignore_patterns() {
        let mut registry = AssetRegistry::new("/app");
        assert!(registry.is_ignored(Path::new(".DS_Store")));
        assert!(registry.is_ignored(Path::new("_drafts/app.js")));
        assert!(!registry.is_ignored(Path::new("vendor/app.js")));

        registry.ignore("*.map").unwrap();
        assert!(registry.is_ignored(Path::new("app.js.map")));
        assert!(registry.ignore("[").is_err());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("js"), "/js");
        assert_eq!(normalize_prefix("//js//vendor/"), "/js/vendor");
        assert_eq!(normalize_prefix("/"), "/");
    }
}
