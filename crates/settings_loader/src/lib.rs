//! # Settings Loader
//!
//! Loads the dashboard service configuration from `settings.json`: where the
//! record files live, how many sales/purchases a fetch returns, which
//! transaction category counts as team cost, what a fetch cycle does when a
//! source fails, and where the HTTP server listens.
//!
//! Every field is optional in the file; missing fields take the defaults from
//! [`models::Settings::default`].
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Load settings from a specific path
//! let settings = settings_loader::load_settings("config/settings.json")?;
//!
//! // Fall back to ./settings.json, then to built-in defaults
//! let path = Some(PathBuf::from("settings.json"));
//! let settings = settings_loader::load_settings_or_default(path.as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::Settings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from the default location (settings.json in the current directory)
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Loads settings from an optional path, returning None if no path is provided
pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}

/// Tries the provided path, then the default location. Returns None only if no
/// settings file exists anywhere. A file that exists but fails to parse is an error.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    if let Some(settings_path) = path {
        if settings_file_exists(settings_path) {
            return load_settings(settings_path).map(Some);
        }
    }

    if default_settings_exist() {
        return load_default_settings().map(Some);
    }
    Ok(None)
}

/// Like [`load_settings_with_fallback`] but substitutes built-in defaults when no file is found.
pub fn load_settings_or_default(path: Option<&PathBuf>) -> Result<Settings> {
    Ok(load_settings_with_fallback(path)?.unwrap_or_default())
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

/// Checks if the default settings file (settings.json) exists
pub fn default_settings_exist() -> bool {
    settings_file_exists(DEFAULT_SETTINGS_FILE)
}
