mod app;
mod state;
mod theme;
mod ui;

use std::path::PathBuf;

use app::DashboardApp;
use eframe::egui;
use state::AppState;
use us_population_dashboard::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let cli_data_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = DashboardConfig::resolve(cli_data_path).unwrap_or_else(|e| {
        log::error!("Invalid configuration, using defaults: {e:#}");
        DashboardConfig::default()
    });

    let mut state = AppState::new(config);
    if let Some(path) = state.config.data_path.clone() {
        state.open_path_reporting(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "US Population Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
