//! HTML tags referencing packages.
//!
//! Development pages load each member file separately (easier debugging);
//! production pages load the single built bundle. Every href carries a
//! cache-buster token so browsers can cache aggressively.

use std::path::PathBuf;

use crate::error::{AssetError, Result};

use super::buster::{TokenSource, add_buster};
use super::registry::Package;
use super::scan::{GlobEngine, dedup_first};

/// One tag per member file, in load order.
pub fn development_html(
    engine: &GlobEngine<'_>,
    package: &Package,
    tokens: &dyn TokenSource,
) -> Result<String> {
    let files = dedup_first(package.files(engine)?);
    let mut tags = Vec::with_capacity(files.len());
    for file in files {
        let token = tokens
            .token(std::slice::from_ref(&file.source))
            .map_err(|e| AssetError::Io(file.source.clone(), e))?;
        let href = busted(&file.uri, token);
        tags.push(package.kind.tag(&href));
    }
    Ok(tags.join("\n"))
}

/// A single tag for the built package.
pub fn production_html(
    engine: &GlobEngine<'_>,
    package: &Package,
    tokens: &dyn TokenSource,
) -> Result<String> {
    let sources: Vec<PathBuf> = dedup_first(package.files(engine)?)
        .into_iter()
        .map(|f| f.source)
        .collect();
    let token = tokens
        .token(&sources)
        .map_err(|e| AssetError::Io(PathBuf::from(package.path()), e))?;
    Ok(package.kind.tag(&busted(&package.path(), token)))
}

fn busted(uri: &str, token: Option<String>) -> String {
    match token {
        Some(token) => add_buster(uri, &token),
        None => uri.to_string(),
    }
}
