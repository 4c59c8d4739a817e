use std::collections::BTreeMap;

use log::{debug, info, trace, warn};
use nalgebra::Vector3;

use crate::config::RocketConfig;
use crate::dynamics::body::RigidBody;
use crate::dynamics::mass::MassModel;
use crate::dynamics::state::{world_up, FlightPhase, FlightState, G0};
use crate::error::FlightError;
use crate::gnc::{GimbalActuator, Selection, StabilizationSelector};
use crate::sim::event::InputEvent;
use crate::vehicle::Engine;

// ---------------------------------------------------------------------------
// Tick results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoFuel,
    NoActiveEngines,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineForce {
    pub id: u32,
    pub force: Vector3<f64>,
    pub point: Vector3<f64>,
    pub steered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub fuel_consumed: f64,
    pub fuel_remaining: f64,
    pub total_thrust: f64,
    pub thrust_per_engine: f64,
    pub twr: f64,
    pub total_mass: f64,
    /// Body-local; `None` when the mass model lacks geometry.
    pub center_of_mass: Option<Vector3<f64>>,
    pub selection: Selection,
    pub forces: Vec<EngineForce>,
    pub wind_force: Vector3<f64>,
    pub wind_point: Vector3<f64>,
    /// Non-fatal problems met during the tick.
    pub warnings: Vec<FlightError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Burned(Box<TickReport>),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Burned(report) => Some(&**report),
            TickOutcome::Skipped(_) => None,
        }
    }
}

/// Summary logged when engines are bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitDiagnostics {
    pub engine_count: usize,
    pub mass: f64,
    pub total_thrust: f64,
    pub twr: f64,
}

/// Thrust direction the steered engines aim for:
/// `ŷ − (up × ŷ) · strength`, normalized.
pub fn desired_thrust_direction(body_up: &Vector3<f64>, strength: f64) -> Vector3<f64> {
    let correction = body_up.cross(&world_up());
    (world_up() - correction * strength).normalize()
}

// ---------------------------------------------------------------------------
// Flight dynamics core
// ---------------------------------------------------------------------------

/// Owns the engine registry, the mass model and the flight state. Sole
/// writer of fuel, mass and center of mass.
#[derive(Debug, Clone)]
pub struct FlightDynamicsCore {
    config: RocketConfig,
    mass: MassModel,
    engines: Vec<Engine>,
    index: BTreeMap<u32, usize>,
    flight: FlightState,
    actuator: GimbalActuator,
    selector: StabilizationSelector,
    com_warned: bool,
}

impl FlightDynamicsCore {
    /// First setup phase: mass model and controllers, no engines yet.
    pub fn build(config: RocketConfig) -> Self {
        Self {
            mass: config.mass_model(),
            actuator: config.gimbal_actuator(),
            selector: config.selector(),
            engines: Vec::new(),
            index: BTreeMap::new(),
            flight: FlightState::default(),
            com_warned: false,
            config,
        }
    }

    /// Second setup phase: index the engines by id. Duplicate ids keep the
    /// first engine. Replaces any previously bound set.
    pub fn bind_engines(&mut self, engines: impl IntoIterator<Item = Engine>) -> InitDiagnostics {
        self.engines.clear();
        self.index.clear();
        for engine in engines {
            if self.index.contains_key(&engine.id) {
                warn!(target: "init", "duplicate engine id {} ignored", engine.id);
                continue;
            }
            self.index.insert(engine.id, self.engines.len());
            self.engines.push(engine);
        }

        let mass = self.mass.total_mass();
        let total_thrust = self.config.propulsion.exhaust_velocity
            * self.config.propulsion.burn_rate_per_engine
            * self.engines.len() as f64;
        let diagnostics = InitDiagnostics {
            engine_count: self.engines.len(),
            mass,
            total_thrust,
            twr: total_thrust / (mass * G0),
        };
        info!(
            target: "init",
            "TWR: {:.2} | Mass: {:.0} kg | Thrust: {:.0} N | Engines: {}",
            diagnostics.twr, diagnostics.mass, diagnostics.total_thrust, diagnostics.engine_count
        );
        diagnostics
    }

    /// Capture every pivot's base at the body's current attitude, then write
    /// the current mass and center of mass to the body.
    pub fn prime<B: RigidBody + ?Sized>(&mut self, body: &mut B) -> Result<(), FlightError> {
        let rotation = body.rotation();
        for engine in &mut self.engines {
            engine.capture_base(&rotation);
        }
        body.set_mass(self.mass.total_mass());
        let com = self.mass.center_of_mass()?;
        body.set_center_of_mass(com);
        Ok(())
    }

    pub fn config(&self) -> &RocketConfig {
        &self.config
    }

    pub fn mass_model(&self) -> &MassModel {
        &self.mass
    }

    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    pub fn engine(&self, id: u32) -> Option<&Engine> {
        self.index.get(&id).map(|&i| &self.engines[i])
    }

    fn engine_mut(&mut self, id: u32) -> Option<&mut Engine> {
        let i = *self.index.get(&id)?;
        Some(&mut self.engines[i])
    }

    pub fn flight_state(&self) -> &FlightState {
        &self.flight
    }

    pub fn phase(&self) -> FlightPhase {
        self.flight.phase
    }

    pub fn active_engine_count(&self) -> usize {
        self.engines.iter().filter(|e| e.active).count()
    }

    // -----------------------------------------------------------------------
    // Input handling
    // -----------------------------------------------------------------------

    /// Flip the launch flag; every engine is switched to match it.
    pub fn toggle_launch(&mut self, time: f64) -> FlightPhase {
        let launched = !self.flight.phase.is_launched();
        self.flight.phase = if launched { FlightPhase::Launched } else { FlightPhase::Idle };
        if launched {
            self.flight.launch_time = Some(time);
        }
        for engine in &mut self.engines {
            engine.set_active(launched);
        }
        info!(target: "input", "Launch: {}", if launched { "STARTED" } else { "STOPPED" });
        self.flight.phase
    }

    /// Returns the engine's new state, or `None` for an unknown id.
    pub fn toggle_engine(&mut self, id: u32) -> Option<bool> {
        let Some(engine) = self.engine_mut(id) else {
            debug!(target: "input", "toggle for unknown engine {id} ignored");
            return None;
        };
        let active = engine.toggle();
        info!(target: "input", "Engine {id} toggled to {}", if active { "ON" } else { "OFF" });
        Some(active)
    }

    pub fn set_engine_active(&mut self, id: u32, active: bool) -> Option<bool> {
        let Some(engine) = self.engine_mut(id) else {
            debug!(target: "input", "switch for unknown engine {id} ignored");
            return None;
        };
        engine.set_active(active);
        Some(active)
    }

    pub fn handle(&mut self, event: InputEvent, time: f64) {
        match event {
            InputEvent::ToggleLaunch => {
                self.toggle_launch(time);
            }
            InputEvent::ToggleEngine(id) => {
                self.toggle_engine(id);
            }
            InputEvent::SetEngine { id, active } => {
                self.set_engine_active(id, active);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Fixed-rate physics tick
    // -----------------------------------------------------------------------

    /// One physics tick at simulation time `time`.
    ///
    /// Burns fuel, splits thrust evenly over the active engines, steers the
    /// selected engines, pushes every active engine's thrust and the wind
    /// onto the body, then writes mass and center of mass back. Does nothing
    /// without fuel or active engines.
    pub fn step<B: RigidBody + ?Sized>(&mut self, body: &mut B, time: f64, dt: f64) -> TickOutcome {
        if !self.mass.has_fuel() {
            return TickOutcome::Skipped(SkipReason::NoFuel);
        }
        let active_count = self.active_engine_count();
        if active_count == 0 {
            return TickOutcome::Skipped(SkipReason::NoActiveEngines);
        }
        let mut warnings = Vec::new();

        // --- Fuel ---
        let propulsion = &self.config.propulsion;
        let fuel_per_second = propulsion.burn_rate_per_engine * active_count as f64;
        let fuel_consumed = self.mass.consume(fuel_per_second * dt);

        // --- Thrust ---
        let total_thrust = propulsion.exhaust_velocity * fuel_per_second;
        let thrust_per_engine = total_thrust / active_count as f64;
        let total_mass = self.mass.total_mass();
        let twr = total_thrust / (total_mass * G0);

        // --- Engine selection and steering ---
        let selection = self.selector.select(&*body, &self.engines, thrust_per_engine);
        warnings.extend(selection.shortfall());

        let desired = desired_thrust_direction(&body.up(), self.config.stabilization.strength);
        let actuator = self.actuator;
        let mut forces = Vec::with_capacity(active_count);
        for engine in self.engines.iter_mut().filter(|e| e.active) {
            let steered = selection.contains(engine.id);
            if steered {
                match actuator.rotate_toward(engine, &*body, &desired, dt) {
                    Ok(_) => debug!(target: "gimbal", "engine {} direction {:.4?}", engine.id, desired.as_slice()),
                    Err(err) => warnings.push(err),
                }
            }

            let direction = engine.thrust_direction(&*body);
            let force = -direction * thrust_per_engine;
            let point = engine.world_position(&*body);
            body.add_force_at_position(force, point);
            debug!(
                target: "force",
                "engine {} direction {:.4?} force {:.0} N",
                engine.id,
                (-direction).as_slice(),
                thrust_per_engine
            );
            forces.push(EngineForce { id: engine.id, force, point, steered });
        }

        // --- Mass properties ---
        body.set_mass(total_mass);
        let center_of_mass = match self.mass.center_of_mass() {
            Ok(com) => {
                body.set_center_of_mass(com);
                Some(com)
            }
            Err(err) => {
                if !self.com_warned {
                    warn!(target: "com", "center of mass not updated: {err}");
                    self.com_warned = true;
                }
                warnings.push(err);
                None
            }
        };

        // --- Wind ---
        let (wind_force, wind_point) = if self.config.wind.enabled {
            let force = self.config.wind.force(body.position().y, time);
            let point = self.config.wind.application_point(&*body);
            body.add_force_at_position(force, point);
            (force, point)
        } else {
            (Vector3::zeros(), body.position())
        };

        trace!(
            target: "stats",
            "TWR: {:.2} | Mass: {:.0} kg | Fuel: {:.0} kg | Altitude: {:.1} m | VEL_Y: {:.1} m/s",
            twr,
            body.mass(),
            self.mass.fuel_mass(),
            body.position().y,
            body.velocity().y
        );

        TickOutcome::Burned(Box::new(TickReport {
            fuel_consumed,
            fuel_remaining: self.mass.fuel_mass(),
            total_thrust,
            thrust_per_engine,
            twr,
            total_mass,
            center_of_mass,
            selection,
            forces,
            wind_force,
            wind_point,
            warnings,
        }))
    }
}
