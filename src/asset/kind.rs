//! Package media types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Media type of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "js", alias = "script")]
    Script,
    #[serde(rename = "css", alias = "style")]
    Style,
}

impl MediaType {
    /// Extension of the built package file.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Style => "css",
        }
    }

    /// Default served prefix for files of this type.
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::Script => "/js",
            Self::Style => "/css",
        }
    }

    /// HTML tag referencing `href`.
    pub fn tag(self, href: &str) -> String {
        match self {
            Self::Script => format!("<script src=\"{href}\"></script>"),
            Self::Style => format!("<link rel=\"stylesheet\" href=\"{href}\" />"),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MediaType {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "js" | "script" => Ok(Self::Script),
            "css" | "style" => Ok(Self::Style),
            other => Err(AssetError::invalid(format!(
                "unknown package type '{other}' (expected js or css)"
            ))),
        }
    }
}
