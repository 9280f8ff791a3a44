//! Engine error types.
//!
//! Resolution misses are not errors: queries return `Option`. Only
//! malformed configuration, renderer failures and build failures surface
//! here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the registry, resolver and builder.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("build failed at `{asset}`")]
    BuildFailed {
        asset: String,
        #[source]
        source: Box<AssetError>,
    },

    #[error("IO error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

impl AssetError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wrap an error with the asset URI that caused it.
    pub fn build_failed(asset: impl Into<String>, source: AssetError) -> Self {
        Self::BuildFailed {
            asset: asset.into(),
            source: Box::new(source),
        }
    }

    /// Asset URI named by a `BuildFailed` error.
    pub fn failed_asset(&self) -> Option<&str> {
        match self {
            Self::BuildFailed { asset, .. } => Some(asset),
            _ => None,
        }
    }
}

/// Errors raised while rendering a single URI.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no asset found for `{0}`")]
    NotFound(String),

    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to compile `{path}`: {message}")]
    Compile { path: PathBuf, message: String },

    #[error("package `{uri}`: {message}")]
    Package { uri: String, message: String },

    #[error("no compiler registered for `.{ext}` (needed by `{path}`)")]
    Unsupported { ext: String, path: PathBuf },
}

pub type Result<T, E = AssetError> = std::result::Result<T, E>;
