//! Configuration file lookup.

use std::path::{Path, PathBuf};

/// Find `config_name` in `start` or the nearest ancestor containing it.
///
/// An absolute `config_name` is returned as-is when it exists.
///
/// ```text
/// /home/user/app/assets/js/   ← start
/// /home/user/app/forge.toml   ← found
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}
