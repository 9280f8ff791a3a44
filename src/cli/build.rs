//! `forge build`.
//!
//! Phases:
//! - **Config** - apply CLI overrides, assemble the registry
//! - **Clean** - optionally remove the output root
//! - **Build** - packages first, then unpackaged files

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::asset::AssetRegistry;
use crate::build::{
    BuildStats, Builder, CachedRenderer, CommandCompiler, FsWriter, PackRenderer, RenderCache,
};
use crate::config::ForgeConfig;
use crate::{debug, log};

use super::BuildArgs;

/// Apply `forge build` flags on top of the loaded config.
pub fn apply_build_args(config: &mut ForgeConfig, args: &BuildArgs) {
    if let Some(output) = &args.output {
        config.set_output(output);
    }
    if args.no_minify {
        config.build.minify = false;
    }
    config.build.clean = args.clean;
}

pub fn build_assets(config: &ForgeConfig) -> Result<BuildStats> {
    let registry = config
        .to_registry()
        .context("failed to assemble asset registry")?;
    if registry.mappings().is_empty() {
        log!("build"; "no served directories under {}", config.root().display());
    }

    let output = config.output_dir();
    if config.build.clean {
        clean_output(output, config.root())?;
    }

    let renderer = renderer(config, &registry);
    let tokens = config.build.buster.token_source();
    let builder = Builder::new(&registry, output).with_progress(true);

    let cache = RenderCache::new();
    let stats = if config.build.cache {
        let cached = CachedRenderer::new(renderer, &cache);
        builder.build(&FsWriter, &cached, &*tokens)
    } else {
        builder.build(&FsWriter, &renderer, &*tokens)
    }?;
    Ok(stats)
}

fn renderer<'a>(config: &'a ForgeConfig, registry: &'a AssetRegistry) -> PackRenderer<'a> {
    let mut renderer = PackRenderer::new(registry).with_minify(config.build.minify);
    for (ext, entry) in &config.compilers {
        let compiler = CommandCompiler::new(entry.argv().iter().cloned()).cwd(config.root());
        renderer = renderer.with_compiler(ext, compiler);
    }
    renderer
}

/// Remove the output root, refusing anything that contains the app root.
fn clean_output(output: &Path, root: &Path) -> Result<()> {
    if root.starts_with(output) {
        bail!(
            "refusing to clean {}: it contains the app root",
            output.display()
        );
    }
    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("failed to clean {}", output.display()))?;
        debug!("build"; "cleaned {}", output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site(extra: &str) -> (TempDir, ForgeConfig) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app/js")).unwrap();
        fs::create_dir_all(dir.path().join("app/css")).unwrap();
        fs::write(dir.path().join("app/js/a.js"), "console.log(1);").unwrap();
        fs::write(dir.path().join("app/js/b.js"), "console.log(2);").unwrap();
        fs::write(dir.path().join("app/css/site.css"), "a { color: red; }").unwrap();

        let path = dir.path().join("forge.toml");
        fs::write(&path, extra).unwrap();
        let mut config = ForgeConfig::parse(extra).unwrap();
        config.finalize(&path);
        (dir, config)
    }

    #[test]
    fn test_build_assets() {
        let (_dir, config) = site(
            r#"
[build]
buster = "content"

[[package]]
name = "app"
type = "js"
files = ["/js/*.js"]
"#,
        );
        let stats = build_assets(&config).unwrap();
        assert_eq!(stats.packages, 1);
        assert_eq!(stats.files, 1);

        let out = config.output_dir();
        let bundle = fs::read_to_string(out.join("js/app.js")).unwrap();
        assert!(bundle.contains('1') && bundle.contains('2'));
        assert!(out.join("css/site.css").exists());
        assert!(!out.join("js/a.js").exists());
    }

    #[test]
    fn test_apply_build_args() {
        let (dir, mut config) = site("");
        let args = BuildArgs {
            clean: true,
            output: Some("dist".into()),
            no_minify: true,
        };
        apply_build_args(&mut config, &args);
        assert!(config.build.clean);
        assert!(!config.build.minify);
        assert!(config.output_dir().ends_with("dist"));
        assert!(config.output_dir().starts_with(crate::utils::path::normalize_path(dir.path())));
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let (_dir, mut config) = site("");
        config.build.clean = true;
        let stale = config.output_dir().join("js/old.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        build_assets(&config).unwrap();
        assert!(!stale.exists());
        assert!(config.output_dir().join("js/a.js").exists());
    }

    #[test]
    fn test_clean_refuses_app_root() {
        let (dir, _) = site("");
        assert!(clean_output(dir.path(), &dir.path().join("sub")).is_err());
        assert!(dir.path().exists());
    }
}
