//! Count formatting for log lines.

/// `"1 file"`, `"0 files"`, `"3 packages"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "file"), "0 files");
        assert_eq!(plural_count(1, "package"), "1 package");
        assert_eq!(plural_count(12, "artifact"), "12 artifacts");
    }
}
