//! Configuration module for storefront-search
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use once_cell::sync::OnceCell;
use std::path::PathBuf;

/// Global settings instance
static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Install the process-wide settings
pub fn init(settings: Settings) -> Result<()> {
    SETTINGS
        .set(settings)
        .map_err(|_| anyhow::anyhow!("Settings already initialized"))?;
    Ok(())
}

/// Get a reference to the global settings, if initialized
pub fn get() -> Option<&'static Settings> {
    SETTINGS.get()
}

/// Check if settings have been initialized
pub fn is_initialized() -> bool {
    SETTINGS.get().is_some()
}

/// Locate and load settings, falling back to defaults.
///
/// `STOREFRONT_SETTINGS_PATH` wins over the well-known locations. Environment
/// overrides are applied in every case. Also returns the file the settings
/// came from, if any.
pub fn load() -> Result<(Settings, Option<PathBuf>)> {
    let mut paths = Vec::new();
    if let Ok(path) = std::env::var("STOREFRONT_SETTINGS_PATH") {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from("settings.yml"));
    paths.push(PathBuf::from("config/settings.yml"));
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("storefront-search/settings.yml"));
    }

    for path in paths {
        if path.exists() {
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok((settings, Some(path)));
        }
    }

    let mut settings = Settings::default();
    settings.merge_env();
    Ok((settings, None))
}
