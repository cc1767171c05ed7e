pub(crate) mod models;

use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_CONFIG_FILE_NAME: &str = "hibiscus.toml";
pub(crate) const CONFIG_DIR_NAME: &str = "hibiscus";

/// Resolves the config file location: an explicit path, then the working
/// directory, then the user config dir. The last one is also where a fresh
/// file gets written.
pub(crate) fn find_config_file(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let current_dir_path = Path::new(".").join(DEFAULT_CONFIG_FILE_NAME);
    if current_dir_path.exists() {
        return current_dir_path;
    }

    match dirs::config_dir() {
        Some(user_config_dir) => user_config_dir
            .join(CONFIG_DIR_NAME)
            .join(DEFAULT_CONFIG_FILE_NAME),
        None => current_dir_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/custom.toml");
        assert_eq!(find_config_file(Some(&explicit)), explicit);
    }

    #[test]
    fn test_default_location_ends_with_file_name() {
        let found = find_config_file(None);
        assert!(found.ends_with(DEFAULT_CONFIG_FILE_NAME));
    }
}
