use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EnergyDashApp {
    pub state: AppState,
}

impl EnergyDashApp {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            state: AppState::new(data_dir),
        }
    }
}

impl eframe::App for EnergyDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation and selections ----
        egui::SidePanel::left("navigation_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: filtered rows ----
        egui::SidePanel::right("detail_panel")
            .default_width(420.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::detail_table(ui, &self.state);
            });

        // ---- Central panel: title + chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::page_title(ui, &self.state);
            plot::series_plot(ui, &self.state);
        });
    }
}
