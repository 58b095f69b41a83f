use std::path::{Path, PathBuf};

use crate::error::SettingsStoreError;

pub const SETTINGS_DIR: &str = ".flow_chat";
pub const SETTINGS_FILE: &str = "settings.json";
/// Overrides the directory the settings folder is created in.
pub const HOME_ENV: &str = "FLOW_CHAT_HOME";

#[must_use]
pub fn settings_root(base: &Path) -> PathBuf {
    base.join(SETTINGS_DIR)
}

#[must_use]
pub fn settings_file(base: &Path) -> PathBuf {
    settings_root(base).join(SETTINGS_FILE)
}

/// `$FLOW_CHAT_HOME` when set and non-empty, otherwise the current directory.
pub fn default_root() -> Result<PathBuf, SettingsStoreError> {
    match std::env::var_os(HOME_ENV) {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => std::env::current_dir().map_err(SettingsStoreError::CurrentDir),
    }
}
