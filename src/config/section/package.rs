//! `[[package]]` entries.
//!
//! ```toml
//! [[package]]
//! name = "app"
//! type = "js"
//! path = "/js"
//! files = ["/js/vendor/*.js", "/js/*.js"]
//! ```

use serde::{Deserialize, Serialize};

use crate::asset::MediaType;
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    /// URL directory; defaults to `/js` or `/css` by type.
    pub path: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl PackageEntry {
    pub fn url_path(&self) -> &str {
        self.path.as_deref().unwrap_or(self.kind.default_prefix())
    }

    pub fn key(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }

    pub fn validate(&self, idx: usize, diag: &mut ConfigDiagnostics) {
        let field = FieldPath::new("package");
        if self.name.is_empty() {
            diag.error(field, format!("[{idx}] name must not be empty"));
        } else if self.name.contains('/') {
            diag.error_with_hint(
                field,
                format!("[{idx}] name '{}' must not contain '/'", self.name),
                "put the directory in `path` instead",
            );
        }
        if !self.url_path().starts_with('/') {
            diag.error(
                field,
                format!("[{idx}] path '{}' must start with '/'", self.url_path()),
            );
        }
        if self.files.is_empty() {
            diag.warn(field, format!("package '{}' lists no files", self.key()));
        }
        for spec in &self.files {
            if let Err(e) = glob::Pattern::new(spec) {
                diag.error(field, format!("[{idx}] invalid file spec '{spec}': {e}"));
            }
        }
    }
}
