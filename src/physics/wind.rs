use std::f64::consts::TAU;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::dynamics::body::RigidBody;
use crate::physics::noise::perlin;

// ---------------------------------------------------------------------------
// Toy wind disturbance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub enabled: bool,
    pub max_force: f64,         // N, horizontal, reached at `ceiling`
    pub ceiling: f64,           // m
    pub heading_frequency: f64, // noise samples per second of sim time
    pub gust_amplitude: f64,    // N, vertical
    pub gust_frequency: f64,    // rad/s
    pub offset_up: f64,         // m along body up from the origin
    pub offset_right: f64,      // m along body right from the origin
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_force: 50.0,
            ceiling: 10_000.0,
            heading_frequency: 0.1,
            gust_amplitude: 2.0,
            gust_frequency: 0.5,
            offset_up: 10.0,
            offset_right: 1.0,
        }
    }
}

impl WindConfig {
    /// Wind force at `altitude` and simulation time `time`. A pure function
    /// of its inputs. A non-positive ceiling means full strength everywhere.
    pub fn force(&self, altitude: f64, time: f64) -> Vector3<f64> {
        let heading = perlin(time * self.heading_frequency, 0.0) * TAU;
        let horizontal = Vector3::new(heading.cos(), 0.0, heading.sin());

        let t = if self.ceiling > 0.0 { (altitude / self.ceiling).clamp(0.0, 1.0) } else { 1.0 };
        let strength = self.max_force * t;
        let vertical = (time * self.gust_frequency).sin() * self.gust_amplitude;

        horizontal * strength + Vector3::y() * vertical
    }

    /// Where the wind acts: offset from the body origin, not its COM.
    pub fn application_point<B: RigidBody + ?Sized>(&self, body: &B) -> Vector3<f64> {
        body.position() + body.up() * self.offset_up + body.right() * self.offset_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::body::FreeBody;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    #[test]
    fn same_time_same_force() {
        let wind = WindConfig::default();
        for k in 0..50 {
            let t = k as f64 * 0.37;
            assert_eq!(wind.force(2_500.0, t), wind.force(2_500.0, t));
        }
    }

    #[test]
    fn no_horizontal_wind_on_the_ground() {
        let f = WindConfig::default().force(0.0, 3.0);
        assert_relative_eq!(f.x, 0.0);
        assert_relative_eq!(f.z, 0.0);
        assert_relative_eq!(f.y, (1.5f64).sin() * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn horizontal_strength_caps_at_ceiling() {
        let wind = WindConfig::default();
        let horiz = |alt: f64| {
            let f = wind.force(alt, 7.0);
            (f.x * f.x + f.z * f.z).sqrt()
        };
        assert_relative_eq!(horiz(5_000.0), 25.0, epsilon = 1e-9);
        assert_relative_eq!(horiz(10_000.0), 50.0, epsilon = 1e-9);
        assert_relative_eq!(horiz(40_000.0), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_ceiling_gives_full_strength_without_nan() {
        let wind = WindConfig { ceiling: 0.0, ..WindConfig::default() };
        for alt in [0.0, 250.0] {
            let f = wind.force(alt, 7.0);
            assert!(f.iter().all(|c| c.is_finite()), "wind at {alt} m: {f:?}");
            assert_relative_eq!((f.x * f.x + f.z * f.z).sqrt(), 50.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn heading_at_time_zero_is_half_turn() {
        // noise is 0.5 on lattice points, so the heading is π
        let f = WindConfig::default().force(10_000.0, 0.0);
        assert_relative_eq!(f, Vector3::new(-50.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn application_point_follows_body_axes() {
        let wind = WindConfig::default();
        let upright = FreeBody::new(1.0).with_position(Vector3::new(0.0, 100.0, 0.0));
        assert_relative_eq!(wind.application_point(&upright), Vector3::new(1.0, 110.0, 0.0));

        let rolled = FreeBody::new(1.0).with_rotation(UnitQuaternion::from_axis_angle(
            &Vector3::z_axis(),
            std::f64::consts::FRAC_PI_2,
        ));
        // up → -X, right → +Y
        assert_relative_eq!(wind.application_point(&rolled), Vector3::new(-10.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
