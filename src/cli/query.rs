//! Read-only commands: `resolve`, `glob`, `packages`.

use anyhow::{Result, bail};

use crate::asset::html::{development_html, production_html};
use crate::asset::{AssetRegistry, FileResolver, GlobEngine};
use crate::config::ForgeConfig;
use crate::core::uri;
use crate::log;
use crate::utils::plural::plural_count;

/// Print `uri -> path` for each URI; fails if any URI has no source.
pub fn resolve(registry: &AssetRegistry, uris: &[String]) -> Result<()> {
    let resolver = FileResolver::new(registry);
    let mut missing = 0;
    for raw in uris {
        let uri = uri::from_request(raw);
        match resolver.lookup(&uri) {
            Some(path) => println!("{uri} -> {}", path.display()),
            None => {
                log!("resolve"; "{}: not found", uri);
                missing += 1;
            }
        }
    }
    if missing > 0 {
        bail!("{} not found", plural_count(missing, "URI"));
    }
    Ok(())
}

/// Print matches for `patterns` in match order, duplicates included.
pub fn glob(registry: &AssetRegistry, patterns: &[String]) -> Result<()> {
    let files = GlobEngine::new(registry).glob(patterns)?;
    for file in &files {
        println!("{}\t{}", file.uri, file.source.display());
    }
    log!("glob"; "{}", plural_count(files.len(), "file"));
    Ok(())
}

/// Print HTML tags for every package.
pub fn packages(config: &ForgeConfig, registry: &AssetRegistry, production: bool) -> Result<()> {
    let engine = GlobEngine::new(registry);
    let tokens = config.build.buster.token_source();

    for package in registry.packages() {
        let html = if production {
            production_html(&engine, package, &*tokens)?
        } else {
            development_html(&engine, package, &*tokens)?
        };
        log!("package"; "{}", package.path());
        println!("{html}");
    }
    Ok(())
}
