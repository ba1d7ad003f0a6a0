use eframe::egui;

mod app;

use app::PlannerApp;
use fibraplan::net::api::{ApiClient, DEFAULT_BASE_URL};

fn main() {
    env_logger::init();

    // Backend origin: first CLI argument, then FIBRAPLAN_API, then localhost.
    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FIBRAPLAN_API").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let api = match ApiClient::new(&base_url) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("URL de API inválida `{}`: {}", base_url, e);
            std::process::exit(2);
        }
    };

    log::info!("backend: {}", api.base());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fibraplan — Planificador FTTH",
        options,
        Box::new(move |_cc| Ok(Box::new(PlannerApp::new(api)))),
    )
    .expect("Failed to start Fibraplan");
}
