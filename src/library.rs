//! Wallpaper directory listing for the picker.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

/// One selectable file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallpaperEntry {
    pub path: PathBuf,
    /// File name shown on the picker button.
    pub label: String,
}

impl WallpaperEntry {
    fn new(path: PathBuf) -> Self {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, label }
    }
}

/// List every regular file directly inside `dir`, sorted by path.
pub fn scan(dir: &Path) -> Result<Vec<WallpaperEntry>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths.into_iter().map(WallpaperEntry::new).collect())
}

/// The files currently offered in the picker.
#[derive(Debug)]
pub struct WallpaperLibrary {
    dir: PathBuf,
    entries: Vec<WallpaperEntry>,
}

impl WallpaperLibrary {
    pub fn open(dir: PathBuf) -> Self {
        let mut library = Self {
            dir,
            entries: Vec::new(),
        };
        library.rescan();
        library
    }

    /// Re-read the directory. A missing or unreadable directory leaves the
    /// library empty.
    pub fn rescan(&mut self) {
        self.entries = match scan(&self.dir) {
            Ok(entries) => {
                info!("{} wallpapers in {}", entries.len(), self.dir.display());
                entries
            }
            Err(err) => {
                warn!("{err:#}");
                Vec::new()
            }
        };
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[WallpaperEntry] {
        &self.entries
    }
}
