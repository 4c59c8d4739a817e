use anyhow::{ensure, Result};
use log::warn;
use nalgebra::{UnitQuaternion, Vector3};

use crate::config::RocketConfig;
use crate::dynamics::body::{FreeBody, RigidBody};
use crate::dynamics::state::{FlightPhase, SimConfig};
use crate::sim::core::{FlightDynamicsCore, TickOutcome};
use crate::sim::event::{EventKind, FlightEvent, InputEvent, ScheduledInput};

// ---------------------------------------------------------------------------
// Telemetry sample (one per physics step)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Sample {
    pub time: f64,
    pub pos: Vector3<f64>,
    pub vel: Vector3<f64>,
    pub tilt_deg: f64,
    pub mass: f64,
    pub fuel: f64,
    pub com: Vector3<f64>, // body-local
    pub active_engines: usize,
    pub steered_engines: usize,
    pub thrust: f64, // N, total this step
    pub phase: FlightPhase,
}

#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub samples: Vec<Sample>,
    pub events: Vec<FlightEvent>,
}

// ---------------------------------------------------------------------------
// Fixed-timestep simulation loop
// ---------------------------------------------------------------------------

pub struct Simulation {
    pub core: FlightDynamicsCore,
    pub body: FreeBody,
    pub config: SimConfig,
    time: f64,
    fuel_out_logged: bool,
    torque_short: bool,
}

impl Simulation {
    pub fn new(core: FlightDynamicsCore, body: FreeBody, config: SimConfig) -> Self {
        Self { core, body, config, time: 0.0, fuel_out_logged: false, torque_short: false }
    }

    /// Build the core from `rocket`, place and bind its engines, and prime a
    /// resting body tilted `tilt_deg` about world X. Missing geometry is
    /// reported by the pieces that need it and otherwise tolerated.
    pub fn from_config(rocket: RocketConfig, config: SimConfig, tilt_deg: f64) -> Self {
        let engines = rocket
            .layout
            .generate(rocket.geometry.fuel_tank.as_ref())
            .unwrap_or_default();
        let mut core = FlightDynamicsCore::build(rocket);
        core.bind_engines(engines);

        let attitude = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), tilt_deg.to_radians());
        let mut body = FreeBody::new(core.mass_model().total_mass()).with_rotation(attitude);
        if let Err(err) = core.prime(&mut body) {
            warn!(target: "init", "{err}");
        }
        Self::new(core, body, config)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Run until `duration` (capped by `max_time`). Each frame first applies
    /// the inputs due by then, then runs as many fixed physics steps as the
    /// frame accumulated.
    pub fn run(&mut self, script: &[ScheduledInput], duration: f64) -> Result<Trajectory> {
        let fixed_dt = self.config.fixed_dt;
        let frame_dt = self.config.frame_dt;
        ensure!(fixed_dt > 0.0, "fixed timestep must be positive, got {fixed_dt}");
        ensure!(frame_dt > 0.0, "frame period must be positive, got {frame_dt}");

        let end = duration.min(self.config.max_time);
        let mut inputs = script.to_vec();
        inputs.sort_by(|a, b| a.time.total_cmp(&b.time));
        let mut pending = inputs.into_iter().peekable();

        let capacity = ((end - self.time).max(0.0) / fixed_dt) as usize + 1;
        let mut trajectory = Trajectory {
            samples: Vec::with_capacity(capacity.min(200_000)),
            events: Vec::new(),
        };
        trajectory.samples.push(self.sample(0.0, 0));

        // half-step slack keeps float drift from adding a trailing step
        let last_start = end - fixed_dt * 0.5;
        let mut frame_time = self.time;
        let mut accumulator = 0.0;
        while self.time < last_start {
            while let Some(input) = pending.next_if(|i| i.time <= frame_time) {
                self.apply_input(input.event, &mut trajectory);
            }

            accumulator += frame_dt;
            while accumulator >= fixed_dt && self.time < last_start {
                self.physics_step(&mut trajectory);
                accumulator -= fixed_dt;
            }
            frame_time += frame_dt;
        }

        Ok(trajectory)
    }

    fn apply_input(&mut self, event: InputEvent, trajectory: &mut Trajectory) {
        let kind = match event {
            InputEvent::ToggleLaunch => Some(EventKind::Phase(self.core.toggle_launch(self.time))),
            InputEvent::ToggleEngine(id) => self
                .core
                .toggle_engine(id)
                .map(|active| EventKind::EngineSwitched { id, active }),
            InputEvent::SetEngine { id, active } => self
                .core
                .set_engine_active(id, active)
                .map(|active| EventKind::EngineSwitched { id, active }),
        };
        if let Some(kind) = kind {
            trajectory.events.push(FlightEvent { time: self.time, kind });
        }
    }

    /// One fixed step: flight core first, then body integration.
    pub fn physics_step(&mut self, trajectory: &mut Trajectory) {
        let dt = self.config.fixed_dt;
        let outcome = self.core.step(&mut self.body, self.time, dt);

        let (thrust, steered) = match &outcome {
            TickOutcome::Burned(report) => {
                let short = report.selection.shortfall().is_some();
                if short && !self.torque_short {
                    trajectory.events.push(FlightEvent { time: self.time, kind: EventKind::TorqueInsufficient });
                }
                self.torque_short = short;
                if report.fuel_remaining <= 0.0 && !self.fuel_out_logged {
                    self.fuel_out_logged = true;
                    trajectory.events.push(FlightEvent { time: self.time, kind: EventKind::FuelDepleted });
                }
                (report.total_thrust, report.selection.engines.len())
            }
            TickOutcome::Skipped(_) => (0.0, 0),
        };

        self.body.integrate(dt);
        self.time += dt;
        trajectory.samples.push(self.sample(thrust, steered));
    }

    fn sample(&self, thrust: f64, steered: usize) -> Sample {
        Sample {
            time: self.time,
            pos: self.body.pos,
            vel: self.body.vel,
            tilt_deg: self.body.tilt_deg(),
            mass: self.body.mass(),
            fuel: self.core.mass_model().fuel_mass(),
            com: self.body.center_of_mass(),
            active_engines: self.core.active_engine_count(),
            steered_engines: steered,
            thrust,
            phase: self.core.phase(),
        }
    }
}
