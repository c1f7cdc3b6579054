use eframe::egui::{self, Key, KeyboardShortcut, Modifiers};

use crate::state::AppState;
use crate::ui::{panels, plot};

const OPEN_SHORTCUT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);

pub struct RustyDashApp {
    pub state: AppState,
}

impl RustyDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input_mut(|i| i.consume_shortcut(&OPEN_SHORTCUT)) {
            panels::open_file_dialog(&mut self.state);
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| panels::top_bar(ui, &mut self.state));

        // Filters and the chart builder live in the sidebar.
        egui::SidePanel::left("controls")
            .default_width(260.0)
            .min_width(200.0)
            .resizable(true)
            .show(ctx, |ui| panels::side_panel(ui, &mut self.state));

        egui::CentralPanel::default().show(ctx, |ui| plot::dashboard(ui, &self.state));
    }
}
