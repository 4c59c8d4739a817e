use std::fmt;

// ---------------------------------------------------------------------------
// Flight errors (non-fatal: surfaced as warnings, never abort a tick)
// ---------------------------------------------------------------------------

/// External piece of the rocket that setup is expected to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    GimbalPivot { engine_id: u32 },
    FuelTank,
    CrewModule,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::GimbalPivot { engine_id } => write!(f, "gimbal pivot of engine {engine_id}"),
            Component::FuelTank => f.write_str("fuel tank"),
            Component::CrewModule => f.write_str("crew module"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlightError {
    /// A required reference was not supplied at setup; the dependent
    /// operation is skipped.
    ConfigurationMissing(Component),
    /// The active engines cannot produce the required correction torque.
    TorqueInsufficient { required: f64, achieved: f64 },
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightError::ConfigurationMissing(component) => {
                write!(f, "configuration missing: {component} is not assigned")
            }
            FlightError::TorqueInsufficient { required, achieved } => write!(
                f,
                "torque insufficient: required {required:.2} N·m, got {achieved:.2} N·m"
            ),
        }
    }
}

impl std::error::Error for FlightError {}
