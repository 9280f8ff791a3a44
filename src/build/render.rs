//! Rendering: public URI → bytes to serve or write.
//!
//! The builder only sees the [`Renderer`] trait. [`PackRenderer`] is the
//! default: it reads static files, hands preprocessor sources to a
//! registered [`Compiler`], and concatenates packages. With minification on,
//! each member is minified separately; `*.min.*` members pass through as is.
//! [`RenderCache`] is a caller-owned cache that can sit in front of any
//! renderer; invalidation is a full clear.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use crate::asset::{
    AssetFile, AssetRegistry, FileResolver, GlobEngine, Package, dedup_first, minify,
    strip_buster,
};
use crate::core::uri;
use crate::error::RenderError;

/// Produces the final bytes for a public URI.
pub trait Renderer {
    fn render(&self, uri: &str) -> Result<Vec<u8>, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&str) -> Result<Vec<u8>, RenderError>,
{
    fn render(&self, uri: &str) -> Result<Vec<u8>, RenderError> {
        self(uri)
    }
}

/// Compiles one preprocessor source file (e.g. `.sass`) to served bytes.
pub trait Compiler {
    fn compile(&self, source: &Path) -> Result<Vec<u8>, RenderError>;
}

impl<F> Compiler for F
where
    F: Fn(&Path) -> Result<Vec<u8>, RenderError>,
{
    fn compile(&self, source: &Path) -> Result<Vec<u8>, RenderError> {
        self(source)
    }
}

// ============================================================================
// PackRenderer
// ============================================================================

/// Default renderer backed by a registry and the filesystem.
pub struct PackRenderer<'a> {
    registry: &'a AssetRegistry,
    minify: bool,
    compilers: FxHashMap<String, Box<dyn Compiler + 'a>>,
}

impl std::fmt::Debug for PackRenderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackRenderer")
            .field("minify", &self.minify)
            .field("compilers", &self.compilers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a> PackRenderer<'a> {
    pub fn new(registry: &'a AssetRegistry) -> Self {
        Self {
            registry,
            minify: false,
            compilers: FxHashMap::default(),
        }
    }

    /// Minify package output.
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Use `compiler` for sources with extension `ext`.
    pub fn with_compiler(mut self, ext: &str, compiler: impl Compiler + 'a) -> Self {
        self.compilers
            .insert(ext.trim_start_matches('.').to_string(), Box::new(compiler));
        self
    }

    fn render_package(&self, package: &Package) -> Result<Vec<u8>, RenderError> {
        let path = package.path();
        let files = package
            .files(&GlobEngine::new(self.registry))
            .map_err(|e| RenderError::Package {
                uri: path.clone(),
                message: e.to_string(),
            })?;

        let minify_members = self.minify && !minify::is_minified(&path);
        let mut bundle = Vec::new();
        for (i, file) in dedup_first(files).into_iter().enumerate() {
            if i > 0 {
                bundle.push(b'\n');
            }
            let bytes = self.render_file(&file)?;
            if minify_members && !minify::is_minified(&file.uri) {
                let source = String::from_utf8_lossy(&bytes);
                bundle.extend(minify::minify(package.kind, &source).into_bytes());
            } else {
                bundle.extend(bytes);
            }
        }
        Ok(bundle)
    }

    /// Package built at `uri`, busted or not.
    fn package_for(&self, uri: &str) -> Option<&'a Package> {
        let registry = self.registry;
        registry.package_at(uri).or_else(|| match strip_buster(uri) {
            (plain, Some(_)) => registry.package_at(&plain),
            (_, None) => None,
        })
    }

    fn render_file(&self, file: &AssetFile) -> Result<Vec<u8>, RenderError> {
        let source = &file.source;
        if !file.is_dynamic() {
            return fs::read(source).map_err(|e| RenderError::Io(source.clone(), e));
        }

        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.compilers.get(&ext) {
            Some(compiler) => compiler.compile(source),
            None => Err(RenderError::Unsupported {
                ext,
                path: source.clone(),
            }),
        }
    }
}

impl Renderer for PackRenderer<'_> {
    fn render(&self, uri: &str) -> Result<Vec<u8>, RenderError> {
        let uri = uri::squeeze_slashes(uri);
        if let Some(package) = self.package_for(&uri) {
            return self.render_package(package);
        }

        let source = FileResolver::new(self.registry)
            .lookup(&uri)
            .ok_or_else(|| RenderError::NotFound(uri.clone()))?;
        self.render_file(&AssetFile::new(uri, source))
    }
}

// ============================================================================
// RenderCache
// ============================================================================

/// Caller-owned cache of rendered output, keyed by URI.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: DashMap<String, Arc<[u8]>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uri: &str) -> Option<Arc<[u8]>> {
        self.entries.get(uri).map(|e| Arc::clone(e.value()))
    }

    pub fn insert(&self, uri: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.insert(uri.into(), bytes.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn reset_cache(&self) {
        self.entries.clear();
    }
}

/// A renderer consulting a [`RenderCache`] before delegating.
///
/// Failures are not cached.
#[derive(Debug)]
pub struct CachedRenderer<'c, R> {
    inner: R,
    cache: &'c RenderCache,
}

impl<'c, R: Renderer> CachedRenderer<'c, R> {
    pub fn new(inner: R, cache: &'c RenderCache) -> Self {
        Self { inner, cache }
    }
}

impl<R: Renderer> Renderer for CachedRenderer<'_, R> {
    fn render(&self, uri: &str) -> Result<Vec<u8>, RenderError> {
        if let Some(bytes) = self.cache.get(uri) {
            return Ok(bytes.to_vec());
        }
        let bytes = self.inner.render(uri)?;
        self.cache.insert(uri, bytes.as_slice());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{MediaType, ServeOptions};
    use std::cell::Cell;
    use tempfile::TempDir;

    fn site() -> (TempDir, AssetRegistry) {
        let dir = TempDir::new().unwrap();
        let js = dir.path().join("app/js");
        let css = dir.path().join("app/css");
        fs::create_dir_all(js.join("vendor")).unwrap();
        fs::create_dir_all(&css).unwrap();
        fs::write(js.join("app.js"), "app();").unwrap();
        fs::write(js.join("vendor/lib.js"), "lib();").unwrap();
        fs::write(css.join("theme.sass"), "body\n  color: red").unwrap();
        fs::write(css.join("reset.css"), "a { color: red; }").unwrap();

        let mut registry = AssetRegistry::new(dir.path());
        registry.extensions_mut().insert("sass", "css");
        registry.serve("/js", ServeOptions::from_dir("app/js")).unwrap();
        registry.serve("/css", ServeOptions::from_dir("app/css")).unwrap();
        (dir, registry)
    }

    #[test]
    fn test_render_static_file() {
        let (_dir, registry) = site();
        let renderer = PackRenderer::new(&registry);
        assert_eq!(renderer.render("/js/app.js").unwrap(), b"app();");
        assert_eq!(renderer.render("/js/app.1700000000.js").unwrap(), b"app();");
    }

    #[test]
    fn test_render_package_concatenates_in_order() {
        let (_dir, mut registry) = site();
        registry
            .add_package("bundle", MediaType::Script, "/js", ["/js/vendor/*.js", "/js/*.js"])
            .unwrap();
        let renderer = PackRenderer::new(&registry);
        assert_eq!(renderer.render("/js/bundle.js").unwrap(), b"lib();\napp();");
    }

    #[test]
    fn test_render_dynamic_needs_compiler() {
        let (_dir, registry) = site();
        let renderer = PackRenderer::new(&registry);
        assert!(matches!(
            renderer.render("/css/theme.css"),
            Err(RenderError::Unsupported { .. })
        ));

        let renderer = PackRenderer::new(&registry)
            .with_compiler("sass", |_: &Path| -> Result<Vec<u8>, RenderError> {
                Ok(b"body{color:red}".to_vec())
            });
        assert_eq!(renderer.render("/css/theme.css").unwrap(), b"body{color:red}");
    }

    #[test]
    fn test_render_missing() {
        let (_dir, registry) = site();
        let renderer = PackRenderer::new(&registry);
        assert!(matches!(
            renderer.render("/js/nope.js"),
            Err(RenderError::NotFound(uri)) if uri == "/js/nope.js"
        ));
    }

    #[test]
    fn test_render_package_minified() {
        let (_dir, mut registry) = site();
        registry
            .add_package("site", MediaType::Style, "/css", ["/css/reset.css"])
            .unwrap();
        let renderer = PackRenderer::new(&registry).with_minify(true);
        assert_eq!(renderer.render("/css/site.css").unwrap(), b"a{color:red}");
    }

    #[test]
    fn test_render_package_keeps_min_members() {
        let (dir, mut registry) = site();
        let js = dir.path().join("app/js");
        fs::write(js.join("vendor/lib.min.js"), "var keep_me_verbatim = 1 + 2;").unwrap();
        fs::write(js.join("util.js"), "function formatPrice(amount) {\n  return amount;\n}\n").unwrap();
        registry
            .add_package("site", MediaType::Script, "/js", ["/js/vendor/lib.min.js", "/js/util.js"])
            .unwrap();

        let out = PackRenderer::new(&registry).with_minify(true).render("/js/site.js").unwrap();
        let out = String::from_utf8(out).unwrap();
        let (first, second) = out.split_once('\n').unwrap();
        assert_eq!(first, "var keep_me_verbatim = 1 + 2;");
        assert!(second.starts_with("function formatPrice("), "{second}");
        assert!(!second.contains("\n  "));
    }

    #[test]
    fn test_render_busted_package_uri() {
        let (_dir, mut registry) = site();
        // app.js is also a served file; the package owns the path
        registry
            .add_package("app", MediaType::Script, "/js", ["/js/vendor/*.js", "/js/app.js"])
            .unwrap();
        let renderer = PackRenderer::new(&registry);

        assert_eq!(renderer.render("/js/app.js").unwrap(), b"lib();\napp();");
        assert_eq!(renderer.render("/js/app.28389.js").unwrap(), b"lib();\napp();");
        // Plain files still resolve through their busted names
        assert_eq!(renderer.render("/js/vendor/lib.28389.js").unwrap(), b"lib();");
    }

    #[test]
    fn test_cached_renderer() {
        let calls = Cell::new(0);
        let inner = |uri: &str| -> Result<Vec<u8>, RenderError> {
            calls.set(calls.get() + 1);
            Ok(uri.as_bytes().to_vec())
        };
        let cache = RenderCache::new();
        let renderer = CachedRenderer::new(inner, &cache);

        assert_eq!(renderer.render("/js/app.js").unwrap(), b"/js/app.js");
        assert_eq!(renderer.render("/js/app.js").unwrap(), b"/js/app.js");
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);

        cache.reset_cache();
        assert!(cache.is_empty());
        renderer.render("/js/app.js").unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_cached_renderer_skips_failures() {
        let cache = RenderCache::new();
        let renderer = CachedRenderer::new(
            |uri: &str| -> Result<Vec<u8>, RenderError> {
                Err(RenderError::NotFound(uri.to_string()))
            },
            &cache,
        );
        assert!(renderer.render("/js/app.js").is_err());
        assert!(cache.is_empty());
    }
}
