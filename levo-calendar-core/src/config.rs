//! Application configuration.
//!
//! Read from ~/.config/levo-calendar/config.toml and overridden by
//! `LEVOCAL_*` environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    APP_DIR_NAME, DEFAULT_BACKEND_URL, DEFAULT_COUNTRY, DEFAULT_HOLIDAYS_URL, ENV_PREFIX,
};
use crate::error::{CalResult, CalendarError};

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_holidays_url() -> String {
    DEFAULT_HOLIDAYS_URL.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_holidays_url")]
    pub holidays_url: String,

    /// Holiday overlay is disabled when no key is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holidays_api_key: Option<String>,

    #[serde(default = "default_country")]
    pub country: String,

    /// Display time zone baked into newly created events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            backend_url: default_backend_url(),
            holidays_url: default_holidays_url(),
            holidays_api_key: None,
            country: default_country(),
            timezone: None,
            data_dir: None,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalendarError::Config("Could not determine config directory".into()))?
            .join(APP_DIR_NAME);

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default on first run)
    /// and apply environment overrides.
    pub fn load() -> CalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CalResult<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| CalendarError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalendarError::Config(e.to_string()))?;

        tracing::debug!(path = %path.display(), backend = %config.backend_url, "Loaded config");
        Ok(config)
    }

    /// Where the identity record lives. Defaults to the platform data dir.
    pub fn data_path(&self) -> CalResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => {
                let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
                Ok(PathBuf::from(expanded))
            }
            None => Ok(dirs::data_dir()
                .ok_or_else(|| CalendarError::Config("Could not determine data directory".into()))?
                .join(APP_DIR_NAME)),
        }
    }

    pub fn holidays_enabled(&self) -> bool {
        self.holidays_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalResult<()> {
        let contents = format!(
            "\
# levo-calendar configuration

# Backend REST API:
# backend_url = \"{}\"

# Public holiday overlay (Calendarific). Holidays are hidden without a key.
# holidays_url = \"{}\"
# holidays_api_key = \"...\"
# country = \"{}\"

# Time zone applied to newly created events:
# timezone = \"Europe/Helsinki\"

# Where the logged-in user is remembered:
# data_dir = \"~/.local/share/levo-calendar\"
",
            DEFAULT_BACKEND_URL, DEFAULT_HOLIDAYS_URL, DEFAULT_COUNTRY
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalendarError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalendarError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
