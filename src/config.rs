// config.rs

use crate::component::{Appearance, DEFAULT_COLOR, DEFAULT_INTERVAL};
use config::{Config, ConfigError, Environment, File, FileFormat};
use log::debug;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Settings file picked up from the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "twirl.toml";

/// Defaults for the command line, layered as built-in values, then the
/// settings file, then `TWIRL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub color: String,
    pub background_color: Option<String>,
    pub interval_ms: u64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            background_color: None,
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Environment::with_prefix("TWIRL"))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_SETTINGS_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let settings: Settings = Config::builder()
            .set_default("color", defaults.color)?
            .set_default("interval_ms", defaults.interval_ms as i64)?
            .set_default("log_level", defaults.log_level)?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        if settings.interval_ms == 0 {
            return Err(ConfigError::Message(
                "interval_ms must be at least 1".to_string(),
            ));
        }

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Appearance seeded from these settings.
    pub fn appearance(&self) -> Appearance {
        Appearance {
            color: self.color.clone(),
            background_color: self.background_color.clone(),
            interval: self.interval(),
            ..Appearance::default()
        }
    }
}
