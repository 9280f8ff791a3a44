//! `[[serve]]` entries: URL prefix → local directory.
//!
//! ```toml
//! [[serve]]
//! prefix = "/js"
//! from = "app/js"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::is_contained;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServeEntry {
    pub prefix: String,
    /// Directory relative to the app root. Required.
    pub from: Option<PathBuf>,
}

impl ServeEntry {
    pub fn validate(&self, idx: usize, diag: &mut ConfigDiagnostics) {
        let field = FieldPath::new("serve");
        if !self.prefix.starts_with('/') {
            diag.error_with_hint(
                field,
                format!("[{idx}] prefix '{}' must start with '/'", self.prefix),
                format!("prefix = \"/{}\"", self.prefix.trim_start_matches('/')),
            );
        }
        match &self.from {
            None => diag.error(field, format!("[{idx}] `{}` is missing `from`", self.prefix)),
            Some(from) if !is_contained(from) => diag.error(
                field,
                format!(
                    "[{idx}] from '{}' must be relative to the app root without '..'",
                    from.display()
                ),
            ),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_parse_serve_entries() {
        let config = test_parse_config(
            r#"
[[serve]]
prefix = "/js"
from = "app/js"

[[serve]]
prefix = "/fonts"
from = "vendor/fonts"
"#,
        );
        assert_eq!(config.serve.len(), 2);
        assert_eq!(config.serve[1].prefix, "/fonts");
        assert_eq!(config.serve[1].from, Some(PathBuf::from("vendor/fonts")));
    }

    #[test]
    fn test_validate_serve_entry() {
        let mut diag = ConfigDiagnostics::new();
        ServeEntry {
            prefix: "js".into(),
            from: Some("../shared".into()),
        }
        .validate(0, &mut diag);
        ServeEntry {
            prefix: "/css".into(),
            from: None,
        }
        .validate(1, &mut diag);

        assert_eq!(diag.len(), 3);
        assert!(diag.errors()[2].message.contains("missing `from`"));
    }
}
