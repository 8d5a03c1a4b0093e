mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::DashboardApp;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    let mut state = AppState::new(config);
    // The dataset is read once, before the first frame.
    state.open_configured();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NeluxTech Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
