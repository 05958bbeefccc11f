use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, AuthSession, Route};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{PersistedDesktopSettings, RxDeskApp, StartupConfig, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(about = "Prescription desk desktop client")]
struct Args {
    /// Settings file; defaults to rx_desk.toml in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    /// Page to open after start-up, e.g. /prescription/12.
    #[arg(long, default_value = "/")]
    open: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    if let Some(api_base_url) = args.api_base_url {
        settings.api_base_url = api_base_url.trim_end_matches('/').to_string();
    }
    if let Some(page_size) = args.page_size.filter(|size| *size > 0) {
        settings.page_size = page_size;
    }
    let initial_route = match Route::parse(&args.open) {
        Ok(route) => route,
        Err(err) => {
            tracing::warn!("ignoring --open: {err}");
            Route::Overview
        }
    };
    tracing::info!(api = %settings.api_base_url, page_size = settings.page_size, "starting");

    let session = AuthSession::new();
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings.clone(), session.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Prescription Desk")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    let startup = StartupConfig {
        settings,
        initial_route,
    };
    eframe::run_native(
        "Prescription Desk",
        options,
        Box::new(|cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDesktopSettings>(&text).ok())
            });
            Ok(Box::new(RxDeskApp::new(
                cmd_tx,
                ui_rx,
                session,
                persisted_settings,
                startup,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop ui exited with error: {err}"))
}
