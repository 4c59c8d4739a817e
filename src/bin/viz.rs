use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use gimbal_sim::dynamics::state::SimConfig;
use gimbal_sim::sim::{InputEvent, Sample, ScheduledInput, Simulation, Trajectory};
use gimbal_sim::RocketConfig;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let script = [ScheduledInput::new(1.0, InputEvent::ToggleLaunch)];
    let mut sim = Simulation::from_config(RocketConfig::default(), SimConfig::default(), 5.0);
    let trajectory = match sim.run(&script, 60.0) {
        Ok(trajectory) => trajectory,
        Err(err) => {
            log::error!("simulation failed: {err:#}");
            Trajectory::default()
        }
    };

    let app = SimViz { trajectory, engines: sim.core.engines().len() };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Gimbal Stabilization", options, Box::new(|_| Ok(Box::new(app))))
}

struct SimViz {
    trajectory: Trajectory,
    engines: usize,
}

fn plot(ui: &mut egui::Ui, id: &str, label: &str, size: (f32, f32), points: PlotPoints) {
    ui.vertical(|ui| {
        ui.label(label);
        Plot::new(id)
            .width(size.0)
            .height(size.1)
            .x_axis_label("Time (s)")
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(label, points));
            });
    });
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let samples = &self.trajectory.samples;
        let step = (samples.len() / 2000).max(1);
        let sampled: Vec<&Sample> = samples.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Clustered-engine stabilization");
            let apex = samples.iter().map(|s| s.pos.y).fold(0.0_f64, f64::max);
            let max_tilt = samples.iter().map(|s| s.tilt_deg).fold(0.0_f64, f64::max);
            ui.label(format!(
                "Max altitude: {:.0} m  |  Max tilt: {:.1} deg  |  Engines: {}  |  Events: {}",
                apex,
                max_tilt,
                self.engines,
                self.trajectory.events.len(),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let size = (available.x / 2.0 - 8.0, available.y / 2.0 - 8.0);

            ui.horizontal(|ui| {
                plot(ui, "altitude", "Altitude (m)", size, sampled.iter().map(|s| [s.time, s.pos.y]).collect());
                plot(ui, "tilt", "Tilt (deg)", size, sampled.iter().map(|s| [s.time, s.tilt_deg]).collect());
            });

            ui.horizontal(|ui| {
                plot(ui, "fuel", "Fuel (t)", size, sampled.iter().map(|s| [s.time, s.fuel / 1000.0]).collect());
                plot(
                    ui,
                    "steered",
                    "Steered engines",
                    size,
                    sampled.iter().map(|s| [s.time, s.steered_engines as f64]).collect(),
                );
            });
        });
    }
}
