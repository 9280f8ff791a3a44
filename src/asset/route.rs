//! Discovered asset file: public URI ↔ local path.

use std::path::PathBuf;

/// A file reachable through a served mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Public URI after extension remapping (e.g. `/css/app.css`).
    pub uri: String,
    /// Source file path (absolute).
    pub source: PathBuf,
}

impl AssetFile {
    pub fn new(uri: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            source: source.into(),
        }
    }

    /// Check whether the source extension differs from the served one,
    /// i.e. the file must be compiled before it is served.
    pub fn is_dynamic(&self) -> bool {
        let served = crate::core::uri::extension(&self.uri);
        let source = self.source.extension().and_then(|e| e.to_str());
        served != source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dynamic() {
        assert!(AssetFile::new("/css/app.css", "/app/css/app.sass").is_dynamic());
        assert!(!AssetFile::new("/js/app.js", "/app/js/app.js").is_dynamic());
        assert!(!AssetFile::new("/LICENSE", "/app/LICENSE").is_dynamic());
    }
}
