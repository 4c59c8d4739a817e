use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::dynamics::state::G0;

// ---------------------------------------------------------------------------
// Rigid-body capability interface
// ---------------------------------------------------------------------------

/// What the flight core needs from a physics body. Integration belongs to
/// the implementor; the core only reads pose and mass and pushes forces.
pub trait RigidBody {
    fn mass(&self) -> f64;
    fn set_mass(&mut self, mass: f64);

    /// Center of mass in the body-local frame.
    fn center_of_mass(&self) -> Vector3<f64>;
    fn set_center_of_mass(&mut self, com: Vector3<f64>);

    /// World position of the body origin.
    fn position(&self) -> Vector3<f64>;
    /// Body → world rotation.
    fn rotation(&self) -> UnitQuaternion<f64>;
    fn velocity(&self) -> Vector3<f64>;

    /// Continuous force (not an impulse) applied at a world point.
    fn add_force_at_position(&mut self, force: Vector3<f64>, point: Vector3<f64>);

    fn world_center_of_mass(&self) -> Vector3<f64> {
        self.transform_point(&self.center_of_mass())
    }

    fn transform_point(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.position() + self.rotation() * local
    }

    /// Body +Y in world frame.
    fn up(&self) -> Vector3<f64> {
        self.rotation() * Vector3::y()
    }

    /// Body +X in world frame.
    fn right(&self) -> Vector3<f64> {
        self.rotation() * Vector3::x()
    }
}

// ---------------------------------------------------------------------------
// FreeBody: reference implementation with a simple integrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedForce {
    pub force: Vector3<f64>,
    pub point: Vector3<f64>,
}

#[derive(Debug, Clone)]
pub struct FreeBody {
    pub pos: Vector3<f64>,         // m, world (Y-up)
    pub vel: Vector3<f64>,         // m/s, world
    pub quat: UnitQuaternion<f64>, // body→world
    pub omega: Vector3<f64>,       // rad/s, body frame
    pub inertia: Vector3<f64>,     // principal moments, kg·m^2
    pub gravity: f64,              // m/s^2, 0 disables
    mass: f64,
    com_local: Vector3<f64>,
    force_acc: Vector3<f64>,
    torque_acc: Vector3<f64>, // world frame, about world COM
    applied: Vec<AppliedForce>,
}

impl FreeBody {
    pub fn new(mass: f64) -> Self {
        Self {
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            quat: UnitQuaternion::identity(),
            omega: Vector3::zeros(),
            inertia: Vector3::new(1.0e7, 1.0e6, 1.0e7),
            gravity: G0,
            mass,
            com_local: Vector3::zeros(),
            force_acc: Vector3::zeros(),
            torque_acc: Vector3::zeros(),
            applied: Vec::new(),
        }
    }

    pub fn with_rotation(mut self, quat: UnitQuaternion<f64>) -> Self {
        self.quat = quat;
        self
    }

    pub fn with_position(mut self, pos: Vector3<f64>) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_inertia(mut self, inertia: Vector3<f64>) -> Self {
        self.inertia = inertia;
        self
    }

    pub fn without_gravity(mut self) -> Self {
        self.gravity = 0.0;
        self
    }

    /// Forces applied since the last `integrate`.
    pub fn applied_forces(&self) -> &[AppliedForce] {
        &self.applied
    }

    pub fn net_force(&self) -> Vector3<f64> {
        self.force_acc
    }

    pub fn net_torque(&self) -> Vector3<f64> {
        self.torque_acc
    }

    /// Angle between body up and world up, degrees.
    pub fn tilt_deg(&self) -> f64 {
        let cos = self.up().y.clamp(-1.0, 1.0);
        cos.acos().to_degrees()
    }

    /// Advance one step and clear the force accumulators.
    ///
    /// Translation: semi-implicit Euler with uniform gravity.
    /// Rotation: Euler's equations with diagonal inertia, then
    /// q̇ = ½ q ⊗ ω, renormalized. The ground plane y = 0 stops descent.
    pub fn integrate(&mut self, dt: f64) {
        if self.mass > 0.0 {
            let accel = self.force_acc / self.mass - Vector3::y() * self.gravity;
            self.vel += accel * dt;
        }
        self.pos += self.vel * dt;

        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = self.vel.y.max(0.0);
        }

        let torque_body = self.quat.inverse() * self.torque_acc;
        let i = self.inertia;
        let w = self.omega;
        let i_w = Vector3::new(i.x * w.x, i.y * w.y, i.z * w.z);
        let gyro = w.cross(&i_w);
        let domega = Vector3::new(
            (torque_body.x - gyro.x) / i.x,
            (torque_body.y - gyro.y) / i.y,
            (torque_body.z - gyro.z) / i.z,
        );
        self.omega += domega * dt;

        let omega_quat = Quaternion::new(0.0, self.omega.x, self.omega.y, self.omega.z);
        let dquat = self.quat.quaternion() * omega_quat * 0.5;
        self.quat = UnitQuaternion::new_normalize(self.quat.quaternion() + dquat * dt);

        self.force_acc = Vector3::zeros();
        self.torque_acc = Vector3::zeros();
        self.applied.clear();
    }
}

impl RigidBody for FreeBody {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
    }

    fn center_of_mass(&self) -> Vector3<f64> {
        self.com_local
    }

    fn set_center_of_mass(&mut self, com: Vector3<f64>) {
        self.com_local = com;
    }

    fn position(&self) -> Vector3<f64> {
        self.pos
    }

    fn rotation(&self) -> UnitQuaternion<f64> {
        self.quat
    }

    fn velocity(&self) -> Vector3<f64> {
        self.vel
    }

    fn add_force_at_position(&mut self, force: Vector3<f64>, point: Vector3<f64>) {
        let arm = point - self.world_center_of_mass();
        self.force_acc += force;
        self.torque_acc += arm.cross(&force);
        self.applied.push(AppliedForce { force, point });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_com_follows_rotation() {
        let mut body = FreeBody::new(10.0)
            .with_position(Vector3::new(1.0, 2.0, 3.0))
            .with_rotation(UnitQuaternion::from_axis_angle(
                &Vector3::z_axis(),
                std::f64::consts::FRAC_PI_2,
            ));
        body.set_center_of_mass(Vector3::new(0.0, 4.0, 0.0));
        // body +Y maps to world -X under +90° about Z
        assert_relative_eq!(body.world_center_of_mass(), Vector3::new(-3.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn force_through_com_has_no_torque() {
        let mut body = FreeBody::new(10.0).without_gravity();
        body.add_force_at_position(Vector3::new(0.0, 50.0, 0.0), Vector3::zeros());
        assert_relative_eq!(body.net_torque().norm(), 0.0);
        assert_eq!(body.applied_forces().len(), 1);
    }

    #[test]
    fn offset_force_creates_torque() {
        let mut body = FreeBody::new(10.0).without_gravity();
        body.add_force_at_position(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 10.0, 0.0));
        // r = +Y·10, F = +X → τ = r × F = -Z·10
        assert_relative_eq!(body.net_torque(), Vector3::new(0.0, 0.0, -10.0), epsilon = 1e-12);
    }

    #[test]
    fn integrate_accelerates_and_clears() {
        let mut body = FreeBody::new(2.0).without_gravity().with_position(Vector3::new(0.0, 10.0, 0.0));
        body.add_force_at_position(Vector3::new(0.0, 4.0, 0.0), body.world_center_of_mass());
        body.integrate(0.5);
        assert_relative_eq!(body.vel.y, 1.0, epsilon = 1e-12);
        assert!(body.applied_forces().is_empty());
        assert_relative_eq!(body.net_force().norm(), 0.0);
    }

    #[test]
    fn ground_stops_descent() {
        let mut body = FreeBody::new(1.0);
        for _ in 0..10 {
            body.integrate(0.02);
        }
        assert_eq!(body.pos.y, 0.0);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn quaternion_stays_unit_while_spinning() {
        let mut body = FreeBody::new(1.0).without_gravity().with_inertia(Vector3::new(1.0, 2.0, 3.0));
        body.omega = Vector3::new(0.3, 1.0, -0.2);
        for _ in 0..500 {
            body.integrate(0.01);
        }
        assert_relative_eq!(body.quat.quaternion().norm(), 1.0, epsilon = 1e-9);
    }
}
