//! `[compilers]` table: external commands for preprocessor sources.
//!
//! ```toml
//! [extensions]
//! sass = "css"
//!
//! [compilers]
//! sass = ["sass", "--no-source-map", "{input}"]
//! ```
//!
//! The command's stdout is the compiled output. `{input}` is replaced by
//! the source path; without it the path is appended as the last argument.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerEntry(pub Vec<String>);

impl CompilerEntry {
    pub fn argv(&self) -> &[String] {
        &self.0
    }

    pub fn validate(&self, ext: &str, mapped: bool, diag: &mut ConfigDiagnostics) {
        let field = FieldPath::new("compilers");
        if self.0.first().is_none_or(|p| p.trim().is_empty()) {
            diag.error(field, format!("`{ext}`: command must not be empty"));
        }
        if !mapped {
            diag.warn(
                field,
                format!("`{ext}` has a compiler but no [extensions] entry, it will never run"),
            );
        }
    }
}
