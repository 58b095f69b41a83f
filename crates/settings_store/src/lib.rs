mod error;
mod paths;
mod schema;
mod store;

pub use error::SettingsStoreError;
pub use paths::{default_root, settings_file, settings_root, HOME_ENV, SETTINGS_DIR, SETTINGS_FILE};
pub use schema::{SettingsPatch, StoredSettings, DEFAULT_AI_NAME};
pub use store::SettingsStore;
