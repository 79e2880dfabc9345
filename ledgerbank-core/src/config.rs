//! Configuration management
//!
//! Settings are read from a `settings.json` in the data directory:
//!
//! ```json
//! {
//!   "app": { "dbFilename": "ledgerbank.duckdb" }
//! }
//! ```
//!
//! Every field is optional; a missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::result::Result;

const DEFAULT_DB_FILENAME: &str = "ledgerbank.duckdb";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    db_filename: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_filename: DEFAULT_DB_FILENAME.to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from `data_dir`
    ///
    /// The database filename can be overridden with the
    /// `LEDGERBANK_DB_FILENAME` environment variable, which takes
    /// precedence over the settings file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");
        let settings: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content)?
        } else {
            SettingsFile::default()
        };

        let db_filename = std::env::var("LEDGERBANK_DB_FILENAME")
            .ok()
            .or(settings.app.db_filename)
            .unwrap_or_else(|| DEFAULT_DB_FILENAME.to_string());

        Ok(Self { db_filename })
    }

    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.db_filename)
    }
}
