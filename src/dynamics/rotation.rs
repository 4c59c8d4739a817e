use std::f64::consts::PI;

use nalgebra::{Unit, UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Orientation helpers (degrees at the API, radians inside)
// ---------------------------------------------------------------------------

/// Angle between two directions, degrees. Zero-length input gives 0.
pub fn angle_between_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < 1e-15 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Shortest angle between two orientations, degrees.
pub fn quat_angle_deg(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>) -> f64 {
    a.angle_to(b).to_degrees()
}

/// Shortest-arc rotation carrying `from` onto `to`.
///
/// Antiparallel inputs have no unique shortest arc; the half-turn is taken
/// about `from × x̂` (or `from × ẑ` when `from` lies on the x axis).
pub fn from_to_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    if let Some(q) = UnitQuaternion::rotation_between(from, to) {
        return q;
    }
    if from.norm() < 1e-15 || to.norm() < 1e-15 {
        return UnitQuaternion::identity();
    }
    let axis = Unit::try_new(from.cross(&Vector3::x()), 1e-9)
        .or_else(|| Unit::try_new(from.cross(&Vector3::z()), 1e-9))
        .unwrap_or_else(Vector3::y_axis);
    UnitQuaternion::from_axis_angle(&axis, PI)
}

/// Rotate `from` toward `to` by at most `max_step_deg`, along the shortest arc.
/// Reaches `to` exactly when it is within the step.
pub fn rotate_towards(
    from: &UnitQuaternion<f64>,
    to: &UnitQuaternion<f64>,
    max_step_deg: f64,
) -> UnitQuaternion<f64> {
    let delta = from.rotation_to(to);
    let Some((axis, angle)) = delta.axis_angle() else {
        return *to;
    };
    let max_step = max_step_deg.max(0.0).to_radians();
    if angle <= max_step {
        return *to;
    }
    UnitQuaternion::from_axis_angle(&axis, max_step) * from
}
