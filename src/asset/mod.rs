//! Asset registry, path mapping and lookup.

pub mod buster;
pub mod html;
mod kind;
pub mod minify;
mod registry;
mod resolve;
mod route;
mod scan;
mod translate;

// Types
pub use kind::MediaType;
pub use registry::{
    AssetRegistry, DEFAULT_IGNORE, DEFAULT_MAPPINGS, Package, ServeOptions, ServedMapping,
};
pub use route::AssetFile;
pub use translate::{ExtensionMap, to_public_uri};

// Queries (read-only)
pub use resolve::FileResolver;
pub use scan::{FileIndex, GlobEngine, dedup_first};

// Cache busting
pub use buster::{ContentTokens, MtimeTokens, TokenSource, add_buster, strip_buster};
