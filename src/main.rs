#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // no console window in release
#![cfg_attr(not(windows), allow(dead_code))]

mod animation;
mod desktop;
mod engine;
mod error;
mod library;
#[cfg(windows)]
mod picker;
mod render;
mod scheduler;
mod settings;
mod texture;

use tracing::{error, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn main() {
    // need guard to live for lifetime of program
    let _guard = init_logging();
    // Failures are logged; the exit code stays 0.
    if let Err(err) = run() {
        error!("{err:#}");
    }
}

/// Log to stdout and to a daily file in the per-user data directory.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging() -> Option<WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    let guard = match settings::log_dir() {
        Ok(log_dir) => {
            let file_appender = RollingFileAppender::new(
                Rotation::DAILY,
                log_dir,
                format!("gif_wallpaper-{}.log", env!("CARGO_PKG_VERSION")),
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .with(env_filter)
                .init();
            Some(guard)
        }
        Err(err) => {
            tracing_subscriber::registry()
                .with(console_layer)
                .with(env_filter)
                .init();
            warn!("file logging disabled: {err:#}");
            None
        }
    };

    std::panic::set_hook(Box::new(|panic_info| {
        error!("gif_wallpaper panicked: {panic_info}");
    }));
    guard
}

#[cfg(windows)]
fn run() -> anyhow::Result<()> {
    use tracing::info;

    let settings = settings::load();
    let bounds = desktop::display_bounds();
    let wallpaper = desktop::Wallpaper::create(bounds)?;

    if let Some(path) = settings.startup_wallpaper() {
        if let Err(err) = wallpaper.borrow_mut().load(&path) {
            warn!("startup wallpaper {} not loaded: {err}", path.display());
        }
    }

    // The picker's message loop also dispatches the wallpaper window's
    // timer and paint messages, since both windows live on this thread.
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Wallpaper Selection")
            .with_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    let target = wallpaper.clone();
    eframe::run_native(
        "Wallpaper Selection",
        native_options,
        Box::new(move |cc| Box::new(picker::PickerApp::new(cc, &settings, target))),
    )?;

    info!("picker closed, tearing down wallpaper");
    drop(wallpaper);
    Ok(())
}

#[cfg(not(windows))]
fn run() -> anyhow::Result<()> {
    anyhow::bail!("desktop wallpaper playback is only available on Windows")
}
