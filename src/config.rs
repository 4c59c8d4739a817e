use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::dynamics::mass::{MassModel, ModuleGeometry};
use crate::gnc::{DeadBand, GimbalActuator, StabilizationSelector};
use crate::physics::wind::WindConfig;
use crate::vehicle::EngineLayout;

// ---------------------------------------------------------------------------
// Rocket configuration (TOML)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MassConfig {
    pub dry_mass: f64,  // kg
    pub fuel_mass: f64, // kg, at ignition
    pub crew_mass: f64, // kg
}

impl Default for MassConfig {
    fn default() -> Self {
        Self { dry_mass: 150_000.0, fuel_mass: 395_700.0, crew_mass: 8_000.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropulsionConfig {
    pub burn_rate_per_engine: f64, // kg/s
    pub exhaust_velocity: f64,     // m/s
}

impl Default for PropulsionConfig {
    fn default() -> Self {
        Self { burn_rate_per_engine: 350.0, exhaust_velocity: 3_200.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizationConfig {
    /// 0..1, how hard the gimbal correction leans against body tilt.
    pub strength: f64,
    pub dead_band: DeadBand,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self { strength: 0.9, dead_band: DeadBand::default() }
    }
}

/// Body-local geometry. A `[geometry]` table lists its modules explicitly;
/// a missing tank or crew module is tolerated and the parts that need them
/// are skipped with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub body_height: f64,
    #[serde(default)]
    pub fuel_tank: Option<ModuleGeometry>,
    #[serde(default)]
    pub crew_module: Option<ModuleGeometry>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            body_height: 12.0,
            fuel_tank: Some(ModuleGeometry::new(Vector3::new(0.0, 4.0, 0.0), 8.0)),
            crew_module: Some(ModuleGeometry::new(Vector3::new(0.0, 9.0, 0.0), 3.0)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    pub mass: MassConfig,
    pub propulsion: PropulsionConfig,
    pub stabilization: StabilizationConfig,
    pub geometry: GeometryConfig,
    pub layout: EngineLayout,
    pub wind: WindConfig,
}

impl RocketConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config = toml::from_str(source).context("invalid rocket configuration")?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading rocket configuration {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn mass_model(&self) -> MassModel {
        let mut model = MassModel::new(
            self.mass.dry_mass,
            self.mass.fuel_mass,
            self.mass.crew_mass,
            self.geometry.body_height,
        );
        model.fuel_tank = self.geometry.fuel_tank;
        model.crew_module = self.geometry.crew_module;
        model
    }

    pub fn gimbal_actuator(&self) -> GimbalActuator {
        GimbalActuator::new(self.stabilization.dead_band)
    }

    /// Evaluates the layout's center engine first.
    pub fn selector(&self) -> StabilizationSelector {
        StabilizationSelector::new(self.layout.center_engine_id())
    }
}
