//! Layered settings: built-in defaults, an optional TOML file, then
//! `COVERTONE__SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::cli::Variant;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sampler: SamplerSettings,
    pub appearance: AppearanceSettings,
    pub preferences: PreferenceSettings,
    pub backfill: BackfillSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Edge length of the square raster images are stretched to.
    pub raster_size: u32,
    /// Upper bound on fetch plus decode, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl SamplerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            raster_size: 150,
            timeout_secs: 15,
            user_agent: concat!("covertone/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    /// Stand-in for the platform's light/dark preference.
    pub system_variant: Variant,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            system_variant: Variant::Dark,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreferenceSettings {
    pub path: Option<PathBuf>,
}

impl PreferenceSettings {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| config_home().join("preferences.json"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackfillSettings {
    pub concurrency: usize,
}

impl Default for BackfillSettings {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Resolve `$XDG_CONFIG_HOME/covertone`, falling back to the platform config dir.
pub fn config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(dirs::config_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("covertone")
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_source = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(config_home().join("config.toml")).required(false),
        };

        let config = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("COVERTONE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to load configuration")?;

        config
            .try_deserialize::<Settings>()
            .context("failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sampler_contract() {
        let settings = Settings::default();
        assert_eq!(settings.sampler.raster_size, 150);
        assert_eq!(settings.sampler.timeout(), Duration::from_secs(15));
        assert_eq!(settings.appearance.system_variant, Variant::Dark);
        assert_eq!(settings.backfill.concurrency, 4);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[sampler]\ntimeout_secs = 3\n\n[appearance]\nsystem_variant = \"light\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.sampler.timeout_secs, 3);
        assert_eq!(settings.sampler.raster_size, 150);
        assert_eq!(settings.appearance.system_variant, Variant::Light);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }
}
