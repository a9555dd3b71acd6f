//! Retail Dashboard - Sales Analytics Desktop Viewer
//!
//! Loads a transaction file and shows KPIs, per-store, per-category, payment
//! and satisfaction views, filterable by store, category, payment mode and dates.

mod charts;
mod gui;

use anyhow::Context;
use eframe::egui;
use gui::DashboardApp;
use retail_dashboard::config::AppConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    log::info!("Data source: {}", config.data_path.display());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Retail Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Retail Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard failed: {e}"))
}
