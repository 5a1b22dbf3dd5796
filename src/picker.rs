//! Wallpaper picker window.

use std::path::{Path, PathBuf};

use eframe::egui::{self, RichText};
use eframe::CreationContext;
use tracing::{info, warn};

use crate::desktop::SharedWallpaper;
use crate::error::LoadError;
use crate::library::WallpaperLibrary;
use crate::settings::{AppSettings, ThemeMode};

const COLUMNS: usize = 4;
const BUTTON_SIZE: [f32; 2] = [188.0, 30.0];

/// Receives the user's choice.
pub trait SelectionTarget {
    /// Load `path`; returns the new frame count.
    fn select(&mut self, path: &Path) -> Result<usize, LoadError>;
}

impl SelectionTarget for SharedWallpaper {
    fn select(&mut self, path: &Path) -> Result<usize, LoadError> {
        let mut wallpaper = self.borrow_mut();
        wallpaper.load(path)?;
        Ok(wallpaper.frame_count())
    }
}

pub struct PickerApp<T: SelectionTarget> {
    target: T,
    library: WallpaperLibrary,
    status: String,
}

impl<T: SelectionTarget> PickerApp<T> {
    pub fn new(cc: &CreationContext<'_>, settings: &AppSettings, target: T) -> Self {
        cc.egui_ctx.set_visuals(visuals(settings.theme));
        let library = WallpaperLibrary::open(settings.wallpaper_dir());
        let status = if library.entries().is_empty() {
            format!("No wallpapers in {}", library.dir().display())
        } else {
            "Pick a wallpaper".to_string()
        };
        Self {
            target,
            library,
            status,
        }
    }

    fn select(&mut self, path: PathBuf) {
        info!("selected {}", path.display());
        self.status = match self.target.select(&path) {
            Ok(frames) => format!("Playing {} ({frames} frames)", path.display()),
            Err(err) => {
                warn!("could not load {}: {err}", path.display());
                format!("{}: {err}", path.display())
            }
        };
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        let mut chosen = None;

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("Wallpapers").strong());
                ui.label(self.library.dir().display().to_string());
                if ui.button("Rescan").clicked() {
                    self.library.rescan();
                }
                if ui.button("Browse...").clicked() {
                    chosen = rfd::FileDialog::new()
                        .set_directory(self.library.dir())
                        .pick_file();
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(format!("Status: {}", self.status));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_source("wallpaper_grid")
                .show(ui, |ui| {
                    egui::Grid::new("wallpapers")
                        .num_columns(COLUMNS)
                        .spacing([10.0, 5.0])
                        .show(ui, |ui| {
                            for (idx, entry) in self.library.entries().iter().enumerate() {
                                let button = egui::Button::new(entry.label.as_str());
                                if ui
                                    .add_sized(BUTTON_SIZE, button)
                                    .on_hover_text(entry.path.display().to_string())
                                    .clicked()
                                {
                                    chosen = Some(entry.path.clone());
                                }
                                if (idx + 1) % COLUMNS == 0 {
                                    ui.end_row();
                                }
                            }
                        });
                });
        });

        if let Some(path) = chosen {
            self.select(path);
        }
    }
}

fn visuals(theme: ThemeMode) -> egui::Visuals {
    match theme {
        ThemeMode::Light => egui::Visuals::light(),
        ThemeMode::Dark => egui::Visuals::dark(),
    }
}

impl<T: SelectionTarget> eframe::App for PickerApp<T> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}
