use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.81; // m/s^2, used for TWR diagnostics and FreeBody gravity

/// World "up". The frame is Y-up: altitude is `position.y`, wind blows in XZ.
pub fn world_up() -> Vector3<f64> {
    Vector3::y()
}

// ---------------------------------------------------------------------------
// Flight state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlightPhase {
    /// Not launched. A launch toggle into this phase forces every engine off.
    #[default]
    Idle,
    Launched,
}

impl FlightPhase {
    pub fn is_launched(self) -> bool {
        self == FlightPhase::Launched
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlightState {
    pub phase: FlightPhase,
    /// Simulation time of the most recent launch toggle into `Launched`.
    pub launch_time: Option<f64>,
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed physics timestep, s.
    pub fixed_dt: f64,
    /// Variable-rate input phase period, s.
    pub frame_dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 0.02,        // 50 Hz physics
            frame_dt: 1.0 / 60.0,  // 60 Hz input polling
            max_time: 120.0,
        }
    }
}
