mod app;
mod canvas;
mod chaos;
mod params;
mod types;
mod viewport;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 900.0])
            .with_min_inner_size([1000.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Chaos Equations",
        options,
        Box::new(|cc| Ok(Box::new(app::ChaosApp::new(cc)))),
    )
}
