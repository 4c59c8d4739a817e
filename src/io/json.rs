use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::sim::event::FlightEvent;
use crate::sim::runner::Trajectory;

/// Summary statistics computed from a flight trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightSummary {
    pub max_altitude_m: f64,
    pub max_altitude_time: f64,
    pub max_vertical_speed: f64,
    pub max_tilt_deg: f64,
    pub fuel_used: f64,
    pub final_mass: f64,
    pub burn_duration: f64,
    pub flight_time: f64,
}

impl FlightSummary {
    /// Empty trajectories give an all-zero summary.
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let samples = &trajectory.samples;
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return Self::default();
        };

        let apex = samples
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .unwrap_or(first);

        let max_vertical_speed = samples.iter().map(|s| s.vel.y).fold(0.0_f64, f64::max);
        let max_tilt_deg = samples.iter().map(|s| s.tilt_deg).fold(0.0_f64, f64::max);

        // each sample closes one fixed step
        let burn_duration = samples
            .windows(2)
            .filter(|w| w[1].thrust > 0.0)
            .map(|w| w[1].time - w[0].time)
            .sum();

        FlightSummary {
            max_altitude_m: apex.pos.y,
            max_altitude_time: apex.time,
            max_vertical_speed,
            max_tilt_deg,
            fuel_used: first.fuel - last.fuel,
            final_mass: last.mass,
            burn_duration,
            flight_time: last.time,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    rocket: &'a str,
    performance: &'a FlightSummary,
    events: &'a [FlightEvent],
}

/// Write the flight summary and event log as pretty JSON.
pub fn write_summary<W: Write>(
    writer: &mut W,
    rocket: &str,
    summary: &FlightSummary,
    events: &[FlightEvent],
) -> Result<()> {
    let report = Report { rocket, performance: summary, events };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_summary_file(
    path: &str,
    rocket: &str,
    summary: &FlightSummary,
    events: &[FlightEvent],
) -> Result<()> {
    let mut file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    write_summary(&mut file, rocket, summary, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::FlightPhase;
    use crate::sim::event::EventKind;
    use crate::sim::runner::Sample;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn sample(time: f64, y: f64, vy: f64, fuel: f64, thrust: f64) -> Sample {
        Sample {
            time,
            pos: Vector3::new(0.0, y, 0.0),
            vel: Vector3::new(0.0, vy, 0.0),
            tilt_deg: time,
            mass: 1_000.0 + fuel,
            fuel,
            com: Vector3::zeros(),
            active_engines: 9,
            steered_engines: 1,
            thrust,
            phase: FlightPhase::Launched,
        }
    }

    fn simple_trajectory() -> Trajectory {
        Trajectory {
            samples: vec![
                sample(0.0, 0.0, 0.0, 500.0, 0.0),
                sample(10.0, 5_000.0, 100.0, 100.0, 1.0e6),
                sample(20.0, 4_000.0, -50.0, 0.0, 1.0e6),
                sample(30.0, 0.0, -80.0, 0.0, 0.0),
            ],
            events: vec![FlightEvent { time: 0.0, kind: EventKind::Phase(FlightPhase::Launched) }],
        }
    }

    #[test]
    fn summary_computes_apex_and_burn() {
        let s = FlightSummary::from_trajectory(&simple_trajectory());
        assert_relative_eq!(s.max_altitude_m, 5_000.0);
        assert_relative_eq!(s.max_altitude_time, 10.0);
        assert_relative_eq!(s.max_vertical_speed, 100.0);
        assert_relative_eq!(s.max_tilt_deg, 30.0);
        assert_relative_eq!(s.fuel_used, 500.0);
        assert_relative_eq!(s.final_mass, 1_000.0);
        assert_relative_eq!(s.burn_duration, 20.0);
        assert_relative_eq!(s.flight_time, 30.0);
    }

    #[test]
    fn empty_trajectory_gives_zeros() {
        assert_eq!(FlightSummary::from_trajectory(&Trajectory::default()), FlightSummary::default());
    }

    #[test]
    fn json_output_is_valid() {
        let traj = simple_trajectory();
        let summary = FlightSummary::from_trajectory(&traj);

        let mut buf = Vec::new();
        write_summary(&mut buf, "Test", &summary, &traj.events).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["rocket"], "Test");
        assert_eq!(value["performance"]["max_altitude_m"], 5_000.0);
        assert_eq!(value["events"][0]["kind"]["Phase"], "Launched");
    }
}
