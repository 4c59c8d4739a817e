use log::{debug, warn};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::dynamics::body::RigidBody;
use crate::dynamics::rotation::{angle_between_deg, from_to_rotation, quat_angle_deg, rotate_towards};
use crate::error::{Component, FlightError};
use crate::vehicle::Engine;

// ---------------------------------------------------------------------------
// Dead-band
// ---------------------------------------------------------------------------

pub const DEFAULT_DEAD_BAND_DEG: f64 = 0.5;

/// Angle under which the actuator leaves the pivot alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeadBand {
    Fixed { deg: f64 },
    /// Narrows with the engine's moment arm and with vehicle mass.
    Dynamic { body_height: f64 },
}

impl Default for DeadBand {
    fn default() -> Self {
        DeadBand::Fixed { deg: DEFAULT_DEAD_BAND_DEG }
    }
}

impl DeadBand {
    pub fn threshold_deg<B: RigidBody + ?Sized>(&self, engine: &Engine, body: &B) -> f64 {
        match *self {
            DeadBand::Fixed { deg } => deg,
            DeadBand::Dynamic { body_height } => dynamic_dead_band(engine, body, body_height),
        }
    }
}

/// 0.5° scaled down by moment arm (relative to body height) and by mass
/// (relative to 100 t), kept within [0.05°, 0.5°].
pub fn dynamic_dead_band<B: RigidBody + ?Sized>(engine: &Engine, body: &B, body_height: f64) -> f64 {
    let base = DEFAULT_DEAD_BAND_DEG;
    let arm = (engine.world_position(body) - body.world_center_of_mass()).norm();
    let arm_factor = if body_height > 0.0 { (arm / body_height).clamp(0.0, 1.0) } else { 1.0 };
    let mass_factor = (body.mass() / 100_000.0).clamp(0.0, 1.0);
    (base * (1.0 - arm_factor) * (1.0 - mass_factor)).clamp(0.05, 0.5)
}

// ---------------------------------------------------------------------------
// Gimbal actuator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GimbalUpdate {
    /// Desired direction already within the dead-band.
    Holding,
    Moved { deflection_deg: f64, limited: bool },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GimbalActuator {
    pub dead_band: DeadBand,
}

impl GimbalActuator {
    pub fn new(dead_band: DeadBand) -> Self {
        Self { dead_band }
    }

    /// Swing the engine's pivot so its thrust direction moves toward
    /// `desired`, first rate-limited by the slew rate over `dt`, then
    /// clamped to the maximum deflection from the base orientation.
    pub fn rotate_toward<B: RigidBody + ?Sized>(
        &self,
        engine: &mut Engine,
        body: &B,
        desired: &Vector3<f64>,
        dt: f64,
    ) -> Result<GimbalUpdate, FlightError> {
        let threshold = self.dead_band.threshold_deg(engine, body);
        let id = engine.id;
        let limits = engine.limits;

        let Some(pivot) = engine.pivot_mut() else {
            let err = FlightError::ConfigurationMissing(Component::GimbalPivot { engine_id: id });
            warn!(target: "gimbal", "engine {id}: {err}");
            return Err(err);
        };

        // limits and targets are worked out in the world frame
        let rotation = body.rotation();
        let current = pivot.thrust_direction(&rotation);
        if angle_between_deg(&current, desired) < threshold {
            return Ok(GimbalUpdate::Holding);
        }

        let orientation = pivot.orientation(&rotation);
        let target = from_to_rotation(&current, desired) * orientation;
        let mut next = rotate_towards(&orientation, &target, limits.slew_rate_deg_per_s * dt);

        let base = pivot.base();
        let mut limited = false;
        if quat_angle_deg(&base, &next) > limits.max_angle_deg {
            let delta = base.inverse() * next;
            let clamped = rotate_towards(&UnitQuaternion::identity(), &delta, limits.max_angle_deg);
            next = base * clamped;
            limited = true;
        }

        pivot.set_orientation(&rotation, next);
        let deflection_deg = pivot.deflection_deg(&rotation);
        debug!(
            target: "gimbal",
            "engine {id} thrust dir {:.4?} deflection {deflection_deg:.3}°{}",
            pivot.thrust_direction(&rotation).as_slice(),
            if limited { " (at limit)" } else { "" },
        );
        Ok(GimbalUpdate::Moved { deflection_deg, limited })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::body::FreeBody;
    use approx::assert_relative_eq;

    const DT: f64 = 0.02;

    fn engine(id: u32) -> Engine {
        Engine::new(id, Vector3::new(0.0, -1.0, 0.0), UnitQuaternion::identity(), 9)
    }

    fn tilted(deg: f64) -> Vector3<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), deg.to_radians()) * -Vector3::y()
    }

    #[test]
    fn holds_inside_dead_band() {
        let body = FreeBody::new(1000.0);
        let mut e = engine(1);
        let before = e.pivot().unwrap().local_orientation();
        let update = GimbalActuator::default()
            .rotate_toward(&mut e, &body, &tilted(0.4), DT)
            .unwrap();
        assert_eq!(update, GimbalUpdate::Holding);
        assert_eq!(e.pivot().unwrap().local_orientation(), before);
    }

    #[test]
    fn step_is_rate_limited() {
        let body = FreeBody::new(1000.0);
        let mut e = engine(9);
        GimbalActuator::default()
            .rotate_toward(&mut e, &body, &tilted(10.0), DT)
            .unwrap();
        // 25°/s · 0.02 s
        assert_relative_eq!(e.pivot().unwrap().deflection_deg(&body.rotation()), 0.5, epsilon = 1e-9);
        assert_relative_eq!(angle_between_deg(&e.thrust_direction(&body), &tilted(0.5)), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn repeated_steps_converge_to_target() {
        let body = FreeBody::new(1000.0);
        let mut e = engine(9);
        let actuator = GimbalActuator::default();
        for _ in 0..100 {
            actuator.rotate_toward(&mut e, &body, &tilted(10.0), DT).unwrap();
        }
        assert!(angle_between_deg(&e.thrust_direction(&body), &tilted(10.0)) < DEFAULT_DEAD_BAND_DEG);
    }

    #[test]
    fn deflection_never_exceeds_limit() {
        let body = FreeBody::new(1000.0);
        let actuator = GimbalActuator::default();
        let mut outer = engine(2);
        let mut center = engine(9);
        let wanted = [tilted(40.0), Vector3::y(), Vector3::new(1.0, 0.2, -0.5).normalize(), tilted(-30.0)];
        for desired in wanted.iter().cycle().take(400) {
            for e in [&mut outer, &mut center] {
                actuator.rotate_toward(e, &body, desired, DT).unwrap();
                let pivot = e.pivot().unwrap();
                assert!(
                    pivot.deflection_deg(&body.rotation()) <= e.limits.max_angle_deg + 1e-9,
                    "engine {} deflected {}",
                    e.id,
                    pivot.deflection_deg(&body.rotation())
                );
            }
        }
    }

    #[test]
    fn large_step_is_clamped_to_limit_boundary() {
        let body = FreeBody::new(1000.0);
        let mut e = engine(2);
        let update = GimbalActuator::default()
            .rotate_toward(&mut e, &body, &tilted(20.0), 1.0)
            .unwrap();
        assert_eq!(update, GimbalUpdate::Moved { deflection_deg: e.pivot().unwrap().deflection_deg(&body.rotation()), limited: true });
        assert_relative_eq!(e.pivot().unwrap().deflection_deg(&body.rotation()), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn antiparallel_request_swings_to_limit() {
        let body = FreeBody::new(1000.0);
        let mut e = engine(9);
        let actuator = GimbalActuator::default();
        for _ in 0..60 {
            actuator.rotate_toward(&mut e, &body, &Vector3::y(), DT).unwrap();
        }
        assert_relative_eq!(e.pivot().unwrap().deflection_deg(&body.rotation()), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn undeflected_pivot_follows_body_tilt() {
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 20f64.to_radians());
        let body = FreeBody::new(1000.0).with_rotation(tilt);
        let mut e = engine(9);
        e.capture_base(&body.rotation());
        let update = GimbalActuator::default()
            .rotate_toward(&mut e, &body, &(tilt * -Vector3::y()), DT)
            .unwrap();
        assert_eq!(update, GimbalUpdate::Holding);
        assert_relative_eq!(e.pivot().unwrap().deflection_deg(&body.rotation()), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn world_down_from_tilted_body_is_clamped_against_base() {
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 20f64.to_radians());
        let body = FreeBody::new(1000.0).with_rotation(tilt);
        let mut e = engine(9);
        e.capture_base(&body.rotation());
        let update = GimbalActuator::default()
            .rotate_toward(&mut e, &body, &-Vector3::y(), 1.0)
            .unwrap();
        let GimbalUpdate::Moved { deflection_deg, limited } = update else {
            panic!("expected the pivot to move, got {update:?}");
        };
        assert!(limited);
        assert_relative_eq!(deflection_deg, 15.0, epsilon = 1e-9);
        assert_relative_eq!(angle_between_deg(&e.thrust_direction(&body), &-Vector3::y()), 5.0, epsilon = 1e-6);
        // stored body-relative: the pivot swung 15° inside the body
        let local = e.pivot().unwrap().local_thrust_direction();
        assert_relative_eq!(angle_between_deg(&local, &-Vector3::y()), 15.0, epsilon = 1e-6);
    }

    #[test]
    fn missing_pivot_is_reported() {
        let body = FreeBody::new(1000.0);
        let mut e = Engine::without_pivot(4, Vector3::zeros(), 9);
        let err = GimbalActuator::default()
            .rotate_toward(&mut e, &body, &tilted(10.0), DT)
            .unwrap_err();
        assert_eq!(err, FlightError::ConfigurationMissing(Component::GimbalPivot { engine_id: 4 }));
    }

    #[test]
    fn dynamic_dead_band_is_bounded() {
        let light = FreeBody::new(1_000.0);
        let heavy = FreeBody::new(500_000.0);
        let e = engine(1);
        let light_band = dynamic_dead_band(&e, &light, 10.0);
        assert_relative_eq!(light_band, 0.5 * 0.9 * 0.99, epsilon = 1e-12);
        assert_relative_eq!(dynamic_dead_band(&e, &heavy, 10.0), 0.05);
    }
}
