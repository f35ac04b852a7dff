//! Settings file persistence
//!
//! Mention settings live in a JSON file in the platform config directory.
//! Loading never fails hard: a missing, empty or corrupted file falls back
//! to the defaults with a warning. Saving writes a backup file first and
//! renames it over the target.

use crate::config::MentionSettings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "ferrite-mentions";

/// Settings file name
const CONFIG_FILE_NAME: &str = "mentions.json";

/// Extension of the temporary file used during atomic writes
const BACKUP_EXTENSION: &str = "json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Platform config directory of the application.
///
/// - **Windows**: `%APPDATA%\ferrite-mentions\`
/// - **macOS**: `~/Library/Application Support/ferrite-mentions/`
/// - **Linux**: `~/.config/ferrite-mentions/`
///
/// # Errors
///
/// `Error::ConfigDirNotFound` if the platform has no config directory
/// (e.g. `HOME` is unset).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Full path of the default settings file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from the default location, falling back to defaults.
pub fn load_settings() -> MentionSettings {
    get_config_file_path()
        .and_then(|path| load_settings_from(&path))
        .unwrap_or_warn_default(MentionSettings::default(), "Failed to load mention settings")
}

/// Load settings from `path`.
///
/// A missing or empty file yields the defaults.
///
/// # Errors
///
/// `Error::ConfigLoad` when the file cannot be read, `Error::ConfigParse`
/// when it is not valid settings JSON.
pub fn load_settings_from(path: &Path) -> Result<MentionSettings> {
    if !path.exists() {
        debug!("Settings file not found at {}, using defaults", path.display());
        return Ok(MentionSettings::default());
    }

    debug!("Loading settings from: {}", path.display());
    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Settings file is empty, using defaults");
        return Ok(MentionSettings::default());
    }

    let settings = MentionSettings::from_json_sanitized(&contents).map_err(|e| {
        warn!("Settings file at {} contains invalid JSON: {}", path.display(), e);
        Error::ConfigParse {
            message: format!("Failed to parse settings file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Mention settings loaded from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Save settings to the default location, creating the directory.
pub fn save_settings(settings: &MentionSettings) -> Result<()> {
    save_settings_to(settings, &get_config_file_path()?)
}

/// Save settings to `path`.
///
/// The JSON is written to a sibling backup file which then replaces `path`,
/// so a crash mid-write never leaves a truncated settings file.
///
/// # Errors
///
/// `Error::ConfigSave` when the directory, the backup or the rename fails.
pub fn save_settings_to(settings: &MentionSettings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            debug!("Creating settings directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| Error::ConfigSave {
                path: dir.to_path_buf(),
                source: Box::new(e),
            })?;
        }
    }

    let backup_path = path.with_extension(BACKUP_EXTENSION);
    debug!("Saving settings to: {}", path.display());

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, path).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    info!("Mention settings saved to {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
