use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SettingsStoreError;
use crate::paths::{default_root, settings_file};
use crate::schema::{SettingsPatch, StoredSettings};

/// JSON settings file under `<root>/.flow_chat/settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            path: settings_file(root),
        }
    }

    /// Store rooted at [`default_root`].
    pub fn open_default() -> Result<Self, SettingsStoreError> {
        Ok(Self::new(&default_root()?))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored values merged over the defaults. A missing or blank file yields
    /// the defaults.
    pub fn load(&self) -> Result<StoredSettings, SettingsStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(StoredSettings::default());
            }
            Err(source) => {
                return Err(SettingsStoreError::io("reading settings file", &self.path, source))
            }
        };

        if contents.trim().is_empty() {
            return Ok(StoredSettings::default());
        }

        serde_json::from_str(&contents)
            .map_err(|source| SettingsStoreError::json_parse(&self.path, source))
    }

    /// Write the settings, replacing the file through a sibling temp file.
    pub fn save(&self, settings: &StoredSettings) -> Result<(), SettingsStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| {
                SettingsStoreError::io("creating settings directory", parent, source)
            })?;
        }

        let mut contents = serde_json::to_string_pretty(settings)
            .map_err(|source| SettingsStoreError::json_serialize(&self.path, source))?;
        contents.push('\n');

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, contents)
            .map_err(|source| SettingsStoreError::io("writing settings file", &temp_path, source))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|source| SettingsStoreError::io("replacing settings file", &self.path, source))?;

        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Load, apply `patch`, save, and return the merged settings.
    pub fn update(&self, patch: &SettingsPatch) -> Result<StoredSettings, SettingsStoreError> {
        let mut settings = self.load()?;
        settings.apply(patch);
        self.save(&settings)?;
        Ok(settings)
    }
}
