mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyDashApp;
use eframe::egui;
use rusty_dash::config::Settings;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::new(Settings::load());
    // Optional: open a file given on the command line.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.load_path(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Dash – CSV Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RustyDashApp::new(state)))),
    )
}
