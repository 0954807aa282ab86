use eframe::egui;
use energy_dash::app::EnergyDashApp;
use energy_dash::state::default_data_dir;

fn main() -> eframe::Result {
    env_logger::init();

    let data_dir = default_data_dir();
    log::info!("Reading datasets from {}", data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([800.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GUVNL Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(EnergyDashApp::new(data_dir)))),
    )
}
