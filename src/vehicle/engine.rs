use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::dynamics::body::RigidBody;
use crate::dynamics::rotation::quat_angle_deg;

// ---------------------------------------------------------------------------
// Gimbal limits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GimbalLimits {
    pub max_angle_deg: f64,       // deviation from base orientation
    pub slew_rate_deg_per_s: f64, // angular rate
}

impl GimbalLimits {
    pub const CENTER: GimbalLimits = GimbalLimits { max_angle_deg: 15.0, slew_rate_deg_per_s: 25.0 };
    pub const OUTER: GimbalLimits = GimbalLimits { max_angle_deg: 5.0, slew_rate_deg_per_s: 15.0 };
}

// ---------------------------------------------------------------------------
// Gimbal pivot
// ---------------------------------------------------------------------------

/// Thrust-vectoring mount carried by the rocket body.
///
/// The current orientation is stored relative to the body, so an
/// undeflected pivot tilts with the rocket. The base is the pivot's world
/// orientation when the body was primed; deflection limits are measured
/// from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    local: UnitQuaternion<f64>, // body frame
    base: UnitQuaternion<f64>,  // world frame, captured at setup
}

impl Pivot {
    /// Pivot mounted at `mount` (body frame). Until the base is captured it
    /// assumes an unrotated body.
    pub fn new(mount: UnitQuaternion<f64>) -> Self {
        Self { local: mount, base: mount }
    }

    pub fn local_orientation(&self) -> UnitQuaternion<f64> {
        self.local
    }

    pub fn base(&self) -> UnitQuaternion<f64> {
        self.base
    }

    /// World orientation for a body at `body_rotation`.
    pub fn orientation(&self, body_rotation: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        body_rotation * self.local
    }

    /// Only the gimbal actuator moves the pivot.
    pub(crate) fn set_orientation(&mut self, body_rotation: &UnitQuaternion<f64>, world: UnitQuaternion<f64>) {
        self.local = body_rotation.inverse() * world;
    }

    pub(crate) fn capture_base(&mut self, body_rotation: &UnitQuaternion<f64>) {
        self.base = self.orientation(body_rotation);
    }

    /// Exhaust direction in the body frame: the pivot's +Y axis, negated.
    pub fn local_thrust_direction(&self) -> Vector3<f64> {
        -(self.local * Vector3::y())
    }

    pub fn thrust_direction(&self, body_rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
        body_rotation * self.local_thrust_direction()
    }

    pub fn deflection_deg(&self, body_rotation: &UnitQuaternion<f64>) -> f64 {
        quat_angle_deg(&self.base, &self.orientation(body_rotation))
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Engine {
    pub id: u32,
    pub active: bool,
    pub position: Vector3<f64>, // body-local
    pub limits: GimbalLimits,
    pivot: Option<Pivot>,
}

impl Engine {
    /// Engine with a pivot at `base`; limits follow the engine's role.
    pub fn new(id: u32, position: Vector3<f64>, base: UnitQuaternion<f64>, center_id: u32) -> Self {
        Self {
            id,
            active: false,
            position,
            limits: Self::role_limits(id, center_id),
            pivot: Some(Pivot::new(base)),
        }
    }

    /// Engine whose pivot was never assigned. Its thrust falls back to
    /// straight down and it cannot gimbal.
    pub fn without_pivot(id: u32, position: Vector3<f64>, center_id: u32) -> Self {
        Self {
            id,
            active: false,
            position,
            limits: Self::role_limits(id, center_id),
            pivot: None,
        }
    }

    pub fn with_limits(mut self, limits: GimbalLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn role_limits(id: u32, center_id: u32) -> GimbalLimits {
        if id == center_id {
            GimbalLimits::CENTER
        } else {
            GimbalLimits::OUTER
        }
    }

    pub fn pivot(&self) -> Option<&Pivot> {
        self.pivot.as_ref()
    }

    pub(crate) fn pivot_mut(&mut self) -> Option<&mut Pivot> {
        self.pivot.as_mut()
    }

    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Record the pivot's current world orientation as its base.
    pub(crate) fn capture_base(&mut self, body_rotation: &UnitQuaternion<f64>) {
        if let Some(pivot) = self.pivot.as_mut() {
            pivot.capture_base(body_rotation);
        }
    }

    pub fn local_thrust_direction(&self) -> Vector3<f64> {
        self.pivot.map_or(-Vector3::y(), |p| p.local_thrust_direction())
    }

    /// World exhaust direction; follows the body's rotation.
    pub fn thrust_direction<B: RigidBody + ?Sized>(&self, body: &B) -> Vector3<f64> {
        body.rotation() * self.local_thrust_direction()
    }

    pub fn world_position<B: RigidBody + ?Sized>(&self, body: &B) -> Vector3<f64> {
        body.transform_point(&self.position)
    }

    /// Torque about the body's world COM for a thrust of `thrust` N along
    /// the current thrust direction.
    pub fn torque<B: RigidBody + ?Sized>(&self, body: &B, thrust: f64) -> Vector3<f64> {
        let arm = self.world_position(body) - body.world_center_of_mass();
        arm.cross(&(self.thrust_direction(body) * thrust))
    }
}
