//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "public"           # Output root (relative to app root, `~` expanded)
//! minify = true               # Minify package output
//! buster = "mtime"            # Cache-buster token: mtime | content
//! ignore = [".*", "_*"]       # Path components excluded from discovery
//! cache = true                # Memoize rendered output during a build
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::asset::{ContentTokens, DEFAULT_IGNORE, MtimeTokens, TokenSource};
use crate::config::{ConfigDiagnostics, FieldPath};

/// How cache-buster tokens are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusterKind {
    /// Newest modification time, in Unix seconds.
    #[default]
    Mtime,
    /// Digest of file contents.
    Content,
}

impl BusterKind {
    pub fn token_source(self) -> Box<dyn TokenSource> {
        match self {
            Self::Mtime => Box::new(MtimeTokens),
            Self::Content => Box::new(ContentTokens),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub output: PathBuf,
    pub minify: bool,
    pub buster: BusterKind,
    pub ignore: Vec<String>,
    pub cache: bool,

    /// Remove the output root before building (CLI only).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "public".into(),
            minify: true,
            buster: BusterKind::default(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            cache: true,
            clean: false,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let field = FieldPath::new("build.ignore");
        for (idx, pattern) in self.ignore.iter().enumerate() {
            if let Err(e) = glob::Pattern::new(pattern) {
                diag.error(field, format!("[{idx}] invalid pattern '{pattern}': {e}"));
            }
        }
        if self.output.as_os_str().is_empty() {
            diag.error(FieldPath::new("build.output"), "output directory must not be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(config.build.minify);
        assert!(config.build.cache);
        assert_eq!(config.build.buster, BusterKind::Mtime);
        assert_eq!(config.build.ignore, [".*", "_*"]);
    }

    #[test]
    fn test_custom_build() {
        let config = test_parse_config(
            r#"
[build]
output = "dist"
minify = false
buster = "content"
ignore = ["*.map"]
"#,
        );
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(!config.build.minify);
        assert_eq!(config.build.buster, BusterKind::Content);
        assert_eq!(config.build.ignore, ["*.map"]);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let config = test_parse_config("[build]\nignore = [\"[abc\"]");
        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert!(diag.errors()[0].message.contains("[abc"));
    }
}
