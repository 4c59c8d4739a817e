use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dynamics::state::FlightPhase;

// ---------------------------------------------------------------------------
// Input events (variable-rate phase)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Flip the launch flag and force every engine to match it.
    ToggleLaunch,
    ToggleEngine(u32),
    SetEngine { id: u32, active: bool },
}

/// An input event scheduled at a simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInput {
    pub time: f64,
    pub event: InputEvent,
}

impl ScheduledInput {
    pub fn new(time: f64, event: InputEvent) -> Self {
        Self { time, event }
    }
}

/// Parses `T:launch`, `T:ID` (toggle engine), `T:ID:on` and `T:ID:off`.
impl FromStr for ScheduledInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let time = parts
            .next()
            .and_then(|t| t.trim().parse::<f64>().ok())
            .ok_or_else(|| format!("'{s}': expected TIME:EVENT"))?;
        let target = parts.next().map(str::trim).ok_or_else(|| format!("'{s}': missing event"))?;

        let event = if target.eq_ignore_ascii_case("launch") {
            InputEvent::ToggleLaunch
        } else {
            let id = target
                .parse::<u32>()
                .map_err(|_| format!("'{s}': '{target}' is neither 'launch' nor an engine id"))?;
            match parts.next().map(str::trim) {
                None => InputEvent::ToggleEngine(id),
                Some("on") => InputEvent::SetEngine { id, active: true },
                Some("off") => InputEvent::SetEngine { id, active: false },
                Some(other) => return Err(format!("'{s}': unknown engine state '{other}'")),
            }
        };
        Ok(ScheduledInput { time, event })
    }
}

// ---------------------------------------------------------------------------
// Flight events recorded by the runner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventKind {
    Phase(FlightPhase),
    EngineSwitched { id: u32, active: bool },
    FuelDepleted,
    TorqueInsufficient,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Phase(FlightPhase::Launched) => f.write_str("LAUNCH"),
            EventKind::Phase(FlightPhase::Idle) => f.write_str("STOP"),
            EventKind::EngineSwitched { id, active } => {
                write!(f, "ENGINE {id} {}", if *active { "ON" } else { "OFF" })
            }
            EventKind::FuelDepleted => f.write_str("FUEL OUT"),
            EventKind::TorqueInsufficient => f.write_str("TORQUE SHORT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightEvent {
    pub time: f64,
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_launch() {
        let input: ScheduledInput = "1.5:launch".parse().unwrap();
        assert_eq!(input, ScheduledInput::new(1.5, InputEvent::ToggleLaunch));
    }

    #[test]
    fn parses_engine_toggle_and_set() {
        assert_eq!(
            "3:7".parse::<ScheduledInput>().unwrap().event,
            InputEvent::ToggleEngine(7)
        );
        assert_eq!(
            "3:7:off".parse::<ScheduledInput>().unwrap().event,
            InputEvent::SetEngine { id: 7, active: false }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("soon:launch".parse::<ScheduledInput>().is_err());
        assert!("2".parse::<ScheduledInput>().is_err());
        assert!("2:booster".parse::<ScheduledInput>().is_err());
        assert!("2:4:maybe".parse::<ScheduledInput>().is_err());
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(EventKind::EngineSwitched { id: 4, active: false }.to_string(), "ENGINE 4 OFF");
        assert_eq!(EventKind::Phase(FlightPhase::Launched).to_string(), "LAUNCH");
    }
}
