//! Main application entry point

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use eframe::egui;
use tc_data::DashboardConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod theme;

use app::TreeCensusApp;

/// Environment variable naming the config file
const CONFIG_ENV: &str = "TREECENSUS_CONFIG";
const DEFAULT_CONFIG: &str = "treecensus.json";

fn config_path(env_value: Option<OsString>) -> PathBuf {
    env_value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = DashboardConfig::load(&config_path(std::env::var_os(CONFIG_ENV)))?;
    info!("Starting tree census dashboard, dataset {:?}", config.dataset_path());

    let runtime = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        default_theme: eframe::Theme::Light,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "NYC Street Tree Census",
        options,
        Box::new(move |cc| Box::new(TreeCensusApp::new(cc, runtime, config))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
