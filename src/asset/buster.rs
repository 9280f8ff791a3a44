//! Cache-buster tokens in file names.
//!
//! A busted name carries a numeric version token right before its final
//! extension: `/js/app.js` → `/js/app.28389.js`. The token itself comes from
//! a [`TokenSource`] (modification time or content hash); this module only
//! encodes and decodes it.
//!
//! # Ambiguity
//!
//! A trailing numeric segment is indistinguishable from a token:
//! `jquery-1.8.2.js` strips to `jquery-1.8.js`. Callers that serve files
//! with meaningful numeric suffixes should resolve the literal path first
//! and only fall back to stripping (as the resolver does). The same holds
//! for extensionless names: `LICENSE.2024` strips to `LICENSE`.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Insert `token` before the final extension of the last URI segment.
///
/// Names without an extension get the token appended: `/LICENSE` →
/// `/LICENSE.28389`.
pub fn add_buster(uri: &str, token: &str) -> String {
    let name_start = uri.rfind('/').map_or(0, |i| i + 1);
    let name = &uri[name_start..];
    match name.rfind('.') {
        Some(dot) if dot > 0 => {
            let split = name_start + dot;
            format!("{}.{}{}", &uri[..split], token, &uri[split..])
        }
        _ => format!("{uri}.{token}"),
    }
}

/// Remove a buster token from a file name or URI.
///
/// Returns the unbusted name and the token, or the input unchanged and
/// `None` when no numeric segment precedes the final extension.
pub fn strip_buster(name: &str) -> (String, Option<String>) {
    let (stem, ext) = strip_extension(name);
    let Some(ext) = ext else {
        return (name.to_string(), None);
    };
    if let Some(token) = trailing_token(stem, ext) {
        return (stem.to_string(), Some(token.to_string()));
    }
    match strip_token(stem) {
        (base, Some(token)) => (format!("{base}.{ext}"), Some(token.to_string())),
        (_, None) => (name.to_string(), None),
    }
}

/// First stage of dynamic lookup: split off the final extension.
///
/// Only the last URI segment is inspected, and a leading dot does not
/// start an extension.
pub fn strip_extension(name: &str) -> (&str, Option<&str>) {
    let name_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let split = name_start + dot;
            (&name[..split], Some(&name[split + 1..]))
        }
        _ => (name, None),
    }
}

/// Token appended to an extensionless name (`LICENSE.28389`), given the
/// split of [`strip_extension`].
pub fn trailing_token<'n>(stem: &str, ext: &'n str) -> Option<&'n str> {
    (is_token(ext) && strip_extension(stem).1.is_none()).then_some(ext)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Second stage of dynamic lookup: split off a trailing `.<digits>` token.
pub fn strip_token(stem: &str) -> (&str, Option<&str>) {
    let name_start = stem.rfind('/').map_or(0, |i| i + 1);
    let Some(dot) = stem[name_start..].rfind('.') else {
        return (stem, None);
    };
    if dot == 0 {
        return (stem, None);
    }
    let split = name_start + dot;
    let token = &stem[split + 1..];
    if is_token(token) {
        (&stem[..split], Some(token))
    } else {
        (stem, None)
    }
}

// ============================================================================
// Token sources
// ============================================================================

/// Supplies the cache-buster token for a set of local files.
///
/// A single file is passed as a one-element slice; a package passes all of
/// its members. `Ok(None)` means no token (empty set), and no busted copy is
/// written.
pub trait TokenSource {
    fn token(&self, files: &[PathBuf]) -> io::Result<Option<String>>;
}

/// Latest modification time of the files, in Unix seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct MtimeTokens;

impl TokenSource for MtimeTokens {
    fn token(&self, files: &[PathBuf]) -> io::Result<Option<String>> {
        let mut latest: Option<u64> = None;
        for file in files {
            let secs = file
                .metadata()?
                .modified()?
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs());
            latest = Some(latest.map_or(secs, |l| l.max(secs)));
        }
        Ok(latest.map(|s| s.to_string()))
    }
}

/// blake3 digest over the files' contents, as a decimal number.
///
/// Changes whenever any byte of any member changes, independent of
/// timestamps (useful when checkouts reset mtimes).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTokens;

impl TokenSource for ContentTokens {
    fn token(&self, files: &[PathBuf]) -> io::Result<Option<String>> {
        if files.is_empty() {
            return Ok(None);
        }
        let mut hasher = blake3::Hasher::new();
        for file in files {
            hash_file(&mut hasher, file)?;
        }
        let digest = hasher.finalize();
        let bytes = digest.as_bytes();
        let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Ok(Some(value.to_string()))
    }
}

fn hash_file(hasher: &mut blake3::Hasher, path: &Path) -> io::Result<()> {
    let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
    let mut buffer = [0u8; 64 * 1024];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_add_buster() {
        assert_eq!(add_buster("/js/app.js", "28389"), "/js/app.28389.js");
        assert_eq!(add_buster("/js/app.min.js", "7"), "/js/app.min.7.js");
        assert_eq!(add_buster("/v1.2/LICENSE", "7"), "/v1.2/LICENSE.7");
    }

    #[test]
    fn test_strip_buster() {
        assert_eq!(
            strip_buster("app.28389.js"),
            ("app.js".to_string(), Some("28389".to_string()))
        );
        assert_eq!(strip_buster("/js/app.js"), ("/js/app.js".to_string(), None));
        assert_eq!(strip_buster("2024.js"), ("2024.js".to_string(), None));
        assert_eq!(strip_buster("app.v2.js"), ("app.v2.js".to_string(), None));
    }

    #[test]
    fn test_strip_extensionless() {
        assert_eq!(
            strip_buster("/images/LICENSE.28389"),
            ("/images/LICENSE".to_string(), Some("28389".to_string()))
        );
        assert_eq!(strip_buster("/images/LICENSE"), ("/images/LICENSE".to_string(), None));
        assert_eq!(trailing_token("/js/app.28389", "js"), None);
        assert_eq!(trailing_token("/js/app.min", "7"), None);
    }

    #[test]
    fn test_numeric_suffix_ambiguity() {
        // Version numbers in names are stripped like tokens
        assert_eq!(
            strip_buster("jquery-1.8.2.js"),
            ("jquery-1.8.js".to_string(), Some("2".to_string()))
        );
    }

    #[test]
    fn test_roundtrip_numeric_tokens() {
        for uri in [
            "/js/app.js",
            "/css/site/main.css",
            "/images/logo.min.png",
            "/images/LICENSE",
            "/v1.2/LICENSE",
            "/.htaccess",
        ] {
            for token in ["0", "28389", "1700000000"] {
                let busted = add_buster(uri, token);
                assert_eq!(strip_buster(&busted), (uri.to_string(), Some(token.to_string())));
            }
        }
    }

    #[test]
    fn test_two_stage_strip() {
        let (stem, ext) = strip_extension("/css/app.28389.css");
        assert_eq!((stem, ext), ("/css/app.28389", Some("css")));
        assert_eq!(strip_token(stem), ("/css/app", Some("28389")));

        assert_eq!(strip_extension("/css/.hidden"), ("/css/.hidden", None));
        assert_eq!(strip_token("/css/app"), ("/css/app", None));
        assert_eq!(strip_token("/css/.123"), ("/css/.123", None));
    }

    #[test]
    fn test_mtime_tokens() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.js");
        fs::write(&a, "a").unwrap();

        let token = MtimeTokens.token(&[a.clone()]).unwrap().unwrap();
        assert!(token.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(MtimeTokens.token(&[]).unwrap(), None);
        assert!(MtimeTokens.token(&[dir.path().join("missing.js")]).is_err());
    }

    #[test]
    fn test_content_tokens() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.css");
        fs::write(&file, "body { color: red; }").unwrap();

        let t1 = ContentTokens.token(&[file.clone()]).unwrap().unwrap();
        let t2 = ContentTokens.token(&[file.clone()]).unwrap().unwrap();
        assert_eq!(t1, t2);
        assert!(t1.bytes().all(|b| b.is_ascii_digit()));

        fs::write(&file, "body { color: blue; }").unwrap();
        let t3 = ContentTokens.token(&[file]).unwrap().unwrap();
        assert_ne!(t1, t3);
    }
}
