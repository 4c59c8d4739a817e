use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Component, FlightError};

// ---------------------------------------------------------------------------
// Sub-module geometry (body-local frame)
// ---------------------------------------------------------------------------

/// A box-shaped part of the rocket: local anchor position and its height.
/// Its mass center sits half a height above the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleGeometry {
    pub position: Vector3<f64>,
    pub height: f64,
}

impl ModuleGeometry {
    pub fn new(position: Vector3<f64>, height: f64) -> Self {
        Self { position, height }
    }

    pub fn mass_center(&self) -> Vector3<f64> {
        self.position + Vector3::y() * (self.height / 2.0)
    }

    /// Bottom face height as seen by the engine layout, which reads the
    /// anchor as the box center.
    pub fn bottom_y(&self) -> f64 {
        self.position.y - self.height / 2.0
    }
}

// ---------------------------------------------------------------------------
// Mass model: fuel, total mass, center of mass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MassModel {
    pub dry_mass: f64,    // kg
    pub crew_mass: f64,   // kg
    initial_fuel: f64,    // kg
    fuel_mass: f64,       // kg, non-increasing, >= 0
    pub body_height: f64, // m
    pub fuel_tank: Option<ModuleGeometry>,
    pub crew_module: Option<ModuleGeometry>,
}

impl MassModel {
    pub fn new(dry_mass: f64, fuel_mass: f64, crew_mass: f64, body_height: f64) -> Self {
        let fuel = fuel_mass.max(0.0);
        Self {
            dry_mass,
            crew_mass,
            initial_fuel: fuel,
            fuel_mass: fuel,
            body_height,
            fuel_tank: None,
            crew_module: None,
        }
    }

    pub fn with_fuel_tank(mut self, tank: ModuleGeometry) -> Self {
        self.fuel_tank = Some(tank);
        self
    }

    pub fn with_crew_module(mut self, module: ModuleGeometry) -> Self {
        self.crew_module = Some(module);
        self
    }

    pub fn fuel_mass(&self) -> f64 {
        self.fuel_mass
    }

    pub fn fuel_burned(&self) -> f64 {
        self.initial_fuel - self.fuel_mass
    }

    pub fn has_fuel(&self) -> bool {
        self.fuel_mass > 0.0
    }

    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.fuel_mass + self.crew_mass
    }

    /// Burn up to `requested` kg. Returns the mass actually consumed, which
    /// never exceeds what is left in the tank.
    pub fn consume(&mut self, requested: f64) -> f64 {
        let consumed = requested.max(0.0).min(self.fuel_mass);
        self.fuel_mass -= consumed;
        consumed
    }

    /// Mass-weighted center of the tank, crew module and body, body-local.
    pub fn center_of_mass(&self) -> Result<Vector3<f64>, FlightError> {
        let tank = self
            .fuel_tank
            .ok_or(FlightError::ConfigurationMissing(Component::FuelTank))?;
        let crew = self
            .crew_module
            .ok_or(FlightError::ConfigurationMissing(Component::CrewModule))?;

        let body_center = Vector3::y() * (self.body_height / 2.0);
        let weighted = tank.mass_center() * self.fuel_mass
            + crew.mass_center() * self.crew_mass
            + body_center * self.dry_mass;
        let com = weighted / self.total_mass();

        debug!(target: "com", "center of mass {:.3?}", com.as_slice());
        Ok(com)
    }
}
