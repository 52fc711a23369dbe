use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::canvas::{color_for_iteration, PixelCanvas};
use crate::chaos::{Sample, SimulationSession};
use crate::types::{DotSize, EquationMode, SimConfig, TrailMode};
use crate::viewport::Viewport;

const CANVAS_W: usize = 1280;
const CANVAS_H: usize = 720;

/// Iterates hidden while the iteration-limit toggle is on; the early
/// part of the orbit is usually still converging toward the attractor.
const ITERATION_FLOOR: usize = 100;

const SAVE_FILE: &str = "saved.txt";

pub struct ChaosApp {
    session: SimulationSession,
    viewport: Viewport,
    canvas: PixelCanvas,
    samples: Vec<Sample>,
    rng: StdRng,
    texture: Option<TextureHandle>,
    paused: bool,
    equation_mode: EquationMode,
    trail_mode: TrailMode,
    dot_size: DotSize,
    iteration_limit: bool,
    load_input: String,
    status: Option<String>,
    status_is_error: bool,
}

impl ChaosApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut rng = StdRng::from_entropy();
        let session = SimulationSession::new(SimConfig::default(), &mut rng);
        Self {
            session,
            viewport: Viewport::default(),
            canvas: PixelCanvas::new(CANVAS_W, CANVAS_H),
            samples: Vec::new(),
            rng,
            texture: None,
            paused: false,
            equation_mode: EquationMode::default(),
            trail_mode: TrailMode::default(),
            dot_size: DotSize::default(),
            iteration_limit: false,
            load_input: String::new(),
            status: None,
            status_is_error: false,
        }
    }

    fn new_equation(&mut self) {
        self.viewport.reset();
        self.session.randomize(&mut self.rng);
        self.canvas.clear();
    }

    fn load_equation(&mut self) {
        let code = std::mem::take(&mut self.load_input);
        self.viewport.reset();
        self.session.load(&code);
        self.canvas.clear();
        self.set_status(format!("Loaded {}", self.session.code()), false);
    }

    fn save_code(&mut self) {
        let code = self.session.code();
        match append_code(&code) {
            Ok(()) => self.set_status(format!("Saved {code} to {SAVE_FILE}"), false),
            Err(err) => self.set_status(err, true),
        }
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        self.status = Some(message);
        self.status_is_error = is_error;
    }

    /// Held-key speed scaling: ArrowDown slows, ArrowUp speeds up,
    /// Space reverses the direction of time.
    fn current_speed(ctx: &egui::Context) -> f64 {
        ctx.input(|i| {
            let mut speed = 1.0;
            if i.key_down(egui::Key::ArrowDown) {
                speed = 0.1;
            } else if i.key_down(egui::Key::ArrowUp) {
                speed = 10.0;
            }
            if i.key_down(egui::Key::Space) {
                speed = -speed;
            }
            speed
        })
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let pressed = |key: egui::Key| ctx.input(|i| i.key_pressed(key));
        if pressed(egui::Key::A) {
            self.equation_mode = EquationMode::Automatic;
        }
        if pressed(egui::Key::R) {
            self.equation_mode = EquationMode::Repeat;
        }
        if pressed(egui::Key::C) {
            self.viewport.auto_center(self.session.history());
        }
        if pressed(egui::Key::D) {
            self.dot_size = self.dot_size.cycled();
        }
        if pressed(egui::Key::I) {
            self.iteration_limit = !self.iteration_limit;
        }
        if pressed(egui::Key::N) {
            self.new_equation();
        }
        if pressed(egui::Key::P) {
            self.paused = !self.paused;
        }
        if pressed(egui::Key::S) {
            self.save_code();
        }
        if pressed(egui::Key::T) {
            self.trail_mode = self.trail_mode.cycled();
        }
        if pressed(egui::Key::Escape) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn advance_simulation(&mut self, speed: f64) {
        if self.session.past_end() {
            match self.equation_mode {
                EquationMode::Automatic => self.new_equation(),
                EquationMode::Repeat => {
                    self.session.restart();
                    self.canvas.clear();
                }
            }
        }

        let floor = self.iteration_limit.then_some(ITERATION_FLOOR);
        self.session.step_frame(
            speed,
            floor,
            &self.viewport,
            CANVAS_W,
            CANVAS_H,
            &mut self.samples,
        );

        self.canvas.fade(self.trail_mode.fade_amount());
        let radius = self.dot_size.radius_px();
        for sample in &self.samples {
            self.canvas
                .stamp(sample.px, sample.py, radius, color_for_iteration(sample.iter));
        }
    }

    fn update_texture(&mut self, ctx: &egui::Context) {
        let image =
            ColorImage::from_rgba_unmultiplied(self.canvas.dimensions(), self.canvas.as_rgba8());

        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture("chaos-canvas", image, TextureOptions::LINEAR));
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Chaos Equations");
        ui.label(egui::RichText::new(self.session.params().equation_text()).monospace());
        ui.label(egui::RichText::new(format!("Code: {}", self.session.code())).monospace());
        ui.label(format!("t = {:.6}", self.session.t()));

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("New equation (N)").clicked() {
                self.new_equation();
            }
            if ui
                .button(if self.paused { "Resume (P)" } else { "Pause (P)" })
                .clicked()
            {
                self.paused = !self.paused;
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Center view (C)").clicked() {
                self.viewport.auto_center(self.session.history());
            }
            if ui.button("Save code (S)").clicked() {
                self.save_code();
            }
        });
        if ui
            .button(format!("End of range: {} (A/R)", self.equation_mode.label()))
            .clicked()
        {
            self.equation_mode = match self.equation_mode {
                EquationMode::Automatic => EquationMode::Repeat,
                EquationMode::Repeat => EquationMode::Automatic,
            };
        }
        if ui
            .button(format!("Trail: {} (T)", self.trail_mode.label()))
            .clicked()
        {
            self.trail_mode = self.trail_mode.cycled();
        }
        if ui
            .button(format!("Dot size: {} (D)", self.dot_size.label()))
            .clicked()
        {
            self.dot_size = self.dot_size.cycled();
        }
        if ui
            .button(format!(
                "Hide first {ITERATION_FLOOR} iterations: {} (I)",
                if self.iteration_limit { "on" } else { "off" }
            ))
            .clicked()
        {
            self.iteration_limit = !self.iteration_limit;
        }

        ui.separator();
        ui.label("Load equation code:");
        let response = ui.text_edit_singleline(&mut self.load_input);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Load").clicked() || submitted {
            self.load_equation();
        }

        ui.separator();
        ui.label("Hold ArrowUp to speed up, ArrowDown to slow down,");
        ui.label("Space to reverse time.");

        if let Some(status) = &self.status {
            ui.separator();
            if self.status_is_error {
                ui.colored_label(egui::Color32::from_rgb(230, 100, 100), status);
            } else {
                ui.label(status);
            }
        }
    }

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        if let Some(texture) = &self.texture {
            let image_size = texture.size_vec2();
            let available = ui.available_size();
            let scale = (available.x / image_size.x)
                .min(available.y / image_size.y)
                .max(0.1);
            ui.centered_and_justified(|ui| {
                ui.image((texture.id(), image_size * scale));
            });
        }
    }
}

impl eframe::App for ChaosApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keys drive the simulation only while no text field is focused.
        let speed = if ctx.wants_keyboard_input() {
            1.0
        } else {
            self.handle_keys(ctx);
            Self::current_speed(ctx)
        };

        if !self.paused {
            self.advance_simulation(speed);
        }

        self.update_texture(ctx);

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(290.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_controls(ui);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        ctx.request_repaint();
    }
}

fn append_code(code: &str) -> Result<(), String> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(SAVE_FILE)
        .map_err(|err| format!("Failed to open {SAVE_FILE}: {err}"))?;
    writeln!(file, "{code}").map_err(|err| format!("Failed to write {SAVE_FILE}: {err}"))
}
