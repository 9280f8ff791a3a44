//! Asset registry and build engine.
//!
//! Maps URL prefixes to local directories, resolves public URIs back to
//! source files (including cache-busted and compile-source names), groups
//! files into packages, and renders everything into a static output tree.
//!
//! ```ignore
//! let mut registry = AssetRegistry::with_defaults("/srv/app");
//! registry.add_package("app", MediaType::Script, "/js", ["/js/vendor/*.js", "/js/*.js"])?;
//!
//! let renderer = PackRenderer::new(&registry).with_minify(true);
//! Builder::new(&registry, "/srv/app/public").build(&FsWriter, &renderer, &MtimeTokens)?;
//! ```

pub mod asset;
pub mod build;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logger;
pub mod utils;

pub use error::{AssetError, RenderError, Result};
