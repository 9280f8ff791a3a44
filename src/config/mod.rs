//! Application configuration from `forge.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build], [[serve]], [[package]], [compilers]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file lookup
//! └── mod.rs         # ForgeConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `defaults`     | Pre-register `/js`, `/css`, `/images`            |
//! | `[build]`      | Output root, minify, buster, ignore, cache       |
//! | `[[serve]]`    | URL prefix → local directory                     |
//! | `[[package]]`  | Named bundles of glob-selected files             |
//! | `[extensions]` | Compile-source extension → served extension      |
//! | `[compilers]`  | External command per compile-source extension    |

pub mod section;
pub mod types;
mod util;

pub use section::{BuildConfig, BusterKind, CompilerEntry, PackageEntry, ServeEntry};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetRegistry, DEFAULT_IGNORE, ExtensionMap, ServeOptions};
use crate::log;
use crate::utils::path::{expand_under, normalize_path};

/// Default config file name.
pub const CONFIG_FILE: &str = "forge.toml";

/// Root configuration, one `forge.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Application root, the config file's directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Register the conventional mappings before `[[serve]]` entries.
    pub defaults: bool,

    pub build: BuildConfig,

    pub serve: Vec<ServeEntry>,

    pub package: Vec<PackageEntry>,

    pub extensions: ExtensionMap,

    pub compilers: BTreeMap<String, CompilerEntry>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            defaults: true,
            build: BuildConfig::default(),
            serve: Vec::new(),
            package: Vec::new(),
            extensions: ExtensionMap::new(),
            compilers: BTreeMap::new(),
        }
    }
}

impl ForgeConfig {
    /// Locate `config_name` upward from the current directory, load and
    /// validate it.
    pub fn load(config_name: &Path) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let Some(path) = find_config_file(config_name, &cwd) else {
            bail!(
                "config file '{}' not found in {} or any parent directory",
                config_name.display(),
                cwd.display()
            );
        };

        let mut config = Self::from_path(&path)?;
        config.finalize(&path);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string, without path resolution.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Anchor the config at `config_path` and make paths absolute.
    pub fn finalize(&mut self, config_path: &Path) {
        self.config_path = normalize_path(config_path);
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let output = self.build.output.clone();
        self.set_output(&output);
    }

    /// Set the output root; relative paths resolve against the app root.
    pub fn set_output(&mut self, output: &Path) {
        self.build.output = normalize_path(&expand_under(output, &self.root));
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_dir(&self) -> &Path {
        &self.build.output
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let diag = self.diagnose();
        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Collect diagnostics without printing.
    pub fn diagnose(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        for (idx, entry) in self.serve.iter().enumerate() {
            entry.validate(idx, &mut diag);
        }

        let mut seen: FxHashMap<String, usize> = FxHashMap::default();
        for (idx, entry) in self.package.iter().enumerate() {
            entry.validate(idx, &mut diag);
            if let Some(prev) = seen.insert(entry.key(), idx) {
                diag.warn(
                    FieldPath::new("package"),
                    format!(
                        "[{idx}] '{}' redefines package [{prev}], the later one wins",
                        entry.key()
                    ),
                );
            }
        }

        for (ext, entry) in &self.compilers {
            entry.validate(ext, self.extensions.target(ext).is_some(), &mut diag);
        }

        diag
    }

    // ========================================================================
    // registry assembly
    // ========================================================================

    /// Build the registry described by this config.
    ///
    /// Default mappings go first so `[[serve]]` entries with the same prefix
    /// replace them.
    pub fn to_registry(&self) -> crate::error::Result<AssetRegistry> {
        let mut registry = AssetRegistry::new(&self.root);

        if self.build.ignore != DEFAULT_IGNORE {
            registry.clear_ignores();
            for pattern in &self.build.ignore {
                registry.ignore(pattern)?;
            }
        }
        registry.extensions_mut().extend(&self.extensions);

        if self.defaults {
            registry.register_defaults();
        }
        for entry in &self.serve {
            let opts = ServeOptions {
                from: entry.from.clone(),
            };
            registry.serve(&entry.prefix, opts)?;
        }
        for entry in &self.package {
            registry.add_package(&entry.name, entry.kind, entry.url_path(), &entry.files)?;
        }

        Ok(registry)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse a config snippet. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ForgeConfig {
    let (parsed, ignored) = ForgeConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
