use std::f64::consts::{FRAC_PI_2, TAU};

use log::{info, warn};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::dynamics::mass::ModuleGeometry;
use crate::dynamics::rotation::from_to_rotation;
use crate::error::{Component, FlightError};

use super::engine::{Engine, GimbalLimits};

// ---------------------------------------------------------------------------
// Engine layout: a ring around the tank base plus an optional center engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLayout {
    pub ring_count: u32,
    pub ring_radius: f64,   // m
    pub center_engine: bool,
    pub inward_tilt: f64,   // horizontal share of the ring engines' thrust direction
    pub engine_height: f64, // m
    pub center_limits: GimbalLimits,
    pub outer_limits: GimbalLimits,
}

impl Default for EngineLayout {
    fn default() -> Self {
        Self {
            ring_count: 8,
            ring_radius: 0.4,
            center_engine: true,
            inward_tilt: 0.2,
            engine_height: 1.0,
            center_limits: GimbalLimits::CENTER,
            outer_limits: GimbalLimits::OUTER,
        }
    }
}

impl EngineLayout {
    /// Id the center engine receives: one past the ring.
    pub fn center_engine_id(&self) -> u32 {
        self.ring_count + 1
    }

    pub fn engine_count(&self) -> usize {
        self.ring_count as usize + usize::from(self.center_engine)
    }

    /// Place the engines below `tank`. Ring engines get ids 1..=ring_count
    /// starting at the back (+Z) and going around; the center engine, if
    /// any, comes last and points straight down.
    pub fn generate(&self, tank: Option<&ModuleGeometry>) -> Result<Vec<Engine>, FlightError> {
        let Some(tank) = tank else {
            let err = FlightError::ConfigurationMissing(Component::FuelTank);
            warn!(target: "layout", "engine placement skipped: {err}");
            return Err(err);
        };

        let center_id = self.center_engine_id();
        let engine_y = tank.bottom_y() - self.engine_height / 2.0;
        let mut engines = Vec::with_capacity(self.engine_count());

        for i in 0..self.ring_count {
            let angle = f64::from(i) * TAU / f64::from(self.ring_count) + FRAC_PI_2;
            let offset = Vector3::new(angle.cos() * self.ring_radius, 0.0, angle.sin() * self.ring_radius);
            let position = Vector3::new(tank.position.x + offset.x, engine_y, tank.position.z + offset.z);

            let inward = -offset.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            let thrust_dir = (-Vector3::y() + inward * self.inward_tilt).normalize();
            let base = from_to_rotation(&Vector3::y(), &-thrust_dir);

            engines.push(Engine::new(i + 1, position, base, center_id).with_limits(self.outer_limits));
        }

        if self.center_engine {
            let position = Vector3::new(tank.position.x, engine_y, tank.position.z);
            engines.push(
                Engine::new(center_id, position, UnitQuaternion::identity(), center_id)
                    .with_limits(self.center_limits),
            );
        }

        info!(target: "layout", "{} engines placed", engines.len());
        Ok(engines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::rotation::angle_between_deg;
    use approx::assert_relative_eq;

    fn tank() -> ModuleGeometry {
        ModuleGeometry::new(Vector3::new(0.0, 4.0, 0.0), 8.0)
    }

    #[test]
    fn default_layout_is_eight_plus_center() {
        let engines = EngineLayout::default().generate(Some(&tank())).unwrap();
        let ids: Vec<u32> = engines.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
        assert_eq!(engines[8].limits, GimbalLimits::CENTER);
        assert!(engines[..8].iter().all(|e| e.limits == GimbalLimits::OUTER));
    }

    #[test]
    fn ring_sits_below_tank_at_radius() {
        let engines = EngineLayout::default().generate(Some(&tank())).unwrap();
        for e in &engines[..8] {
            assert_relative_eq!(e.position.y, -0.5, epsilon = 1e-12);
            assert_relative_eq!((e.position.x.powi(2) + e.position.z.powi(2)).sqrt(), 0.4, epsilon = 1e-12);
        }
        // first engine at the back
        assert_relative_eq!(engines[0].position.z, 0.4, epsilon = 1e-12);
        assert_relative_eq!(engines[8].position, Vector3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn ring_thrust_leans_toward_the_axis() {
        let engines = EngineLayout::default().generate(Some(&tank())).unwrap();
        for e in &engines[..8] {
            let dir = e.local_thrust_direction();
            assert!(dir.y < 0.0);
            let horizontal = Vector3::new(dir.x, 0.0, dir.z);
            let inward = -Vector3::new(e.position.x, 0.0, e.position.z);
            assert_relative_eq!(horizontal.normalize(), inward.normalize(), epsilon = 1e-9);
            assert_relative_eq!(angle_between_deg(&dir, &-Vector3::y()), 0.2f64.atan().to_degrees(), epsilon = 1e-9);
        }
        assert_relative_eq!(engines[8].local_thrust_direction(), -Vector3::y());
    }

    #[test]
    fn missing_tank_skips_placement() {
        assert_eq!(
            EngineLayout::default().generate(None).unwrap_err(),
            FlightError::ConfigurationMissing(Component::FuelTank)
        );
    }

    #[test]
    fn ring_without_center() {
        let layout = EngineLayout { ring_count: 4, center_engine: false, ..Default::default() };
        let engines = layout.generate(Some(&tank())).unwrap();
        assert_eq!(engines.len(), 4);
        assert!(engines.iter().all(|e| e.id <= 4));
    }
}
