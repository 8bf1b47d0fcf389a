//! Graph Switcher - Composite Chart Viewer
//!
//! Switch between three chart renderings of one monthly dataset.

use anyhow::anyhow;
use eframe::egui;
use graph_switcher::{AppConfig, GraphSwitcherApp};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("graph_switcher=info")),
        )
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().unwrap_or_else(|e| {
        error!("{}, using defaults", e);
        AppConfig::default()
    });
    info!(locale = ?config.locale, "starting graph switcher");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([860.0, 600.0])
            .with_title("Graph Switcher"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Graph Switcher",
        options,
        Box::new(move |cc| Ok(Box::new(GraphSwitcherApp::new(cc, &config)))),
    )
    .map_err(|e| anyhow!("Failed to run the application: {e}"))
}
