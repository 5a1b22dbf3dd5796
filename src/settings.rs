//! Startup configuration read from the per-user config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// File name used under the per-user config directory.
const SETTINGS_FILE: &str = "settings.json";

/// Directory scanned for wallpapers when nothing else is configured.
pub const DEFAULT_WALLPAPER_DIR: &str = "C:/Wallpaper/";

/// Theme options for the picker window.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    #[serde(other)]
    Dark,
}

/// Settings read from `settings.json`. The file is never written back;
/// selecting a wallpaper does not change it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Directory whose files are offered in the picker.
    pub wallpaper_dir: String,
    /// Image loaded once when the program starts.
    pub startup_wallpaper: Option<String>,
    /// Picker visuals.
    pub theme: ThemeMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            wallpaper_dir: DEFAULT_WALLPAPER_DIR.to_string(),
            startup_wallpaper: None,
            theme: ThemeMode::Dark,
        }
    }
}

impl AppSettings {
    pub fn wallpaper_dir(&self) -> PathBuf {
        PathBuf::from(&self.wallpaper_dir)
    }

    pub fn startup_wallpaper(&self) -> Option<PathBuf> {
        self.startup_wallpaper.as_ref().map(PathBuf::from)
    }
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "gif_wallpaper", "gif_wallpaper")
        .ok_or_else(|| anyhow!("cannot determine per-user directories"))
}

/// Directory for rolling log files, created on demand.
pub fn log_dir() -> Result<PathBuf> {
    let dir = project_dirs()?.data_dir().join("logs");
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Load settings from the per-user config directory, returning defaults
/// when the file is missing or unreadable.
pub fn load() -> AppSettings {
    match project_dirs() {
        Ok(dirs) => load_from(&dirs.config_dir().join(SETTINGS_FILE)),
        Err(err) => {
            warn!("{err}; using default settings");
            AppSettings::default()
        }
    }
}

pub fn load_from(path: &Path) -> AppSettings {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            info!("no settings at {}; using defaults", path.display());
            return AppSettings::default();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|err| {
        warn!("ignoring malformed {}: {err}", path.display());
        AppSettings::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = load_from(&dir.path().join(SETTINGS_FILE));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.wallpaper_dir(), PathBuf::from("C:/Wallpaper/"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let (_dir, path) = write(r#"{ "startup_wallpaper": "D:/walls/rain.gif" }"#);
        let settings = load_from(&path);
        assert_eq!(
            settings.startup_wallpaper(),
            Some(PathBuf::from("D:/walls/rain.gif"))
        );
        assert_eq!(settings.wallpaper_dir, DEFAULT_WALLPAPER_DIR);
        assert_eq!(settings.theme, ThemeMode::Dark);
    }

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        let (_dir, path) = write(r#"{ "theme": "Solarized", "wallpaper_dir": "E:/gifs" }"#);
        let settings = load_from(&path);
        assert_eq!(settings.theme, ThemeMode::Dark);
        assert_eq!(settings.wallpaper_dir(), PathBuf::from("E:/gifs"));
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let (_dir, path) = write("{ not json");
        assert_eq!(load_from(&path), AppSettings::default());
    }
}
