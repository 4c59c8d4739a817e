use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gimbal_sim::dynamics::state::SimConfig;
use gimbal_sim::io::{csv, json::{self, FlightSummary}};
use gimbal_sim::sim::{InputEvent, ScheduledInput, Simulation};
use gimbal_sim::RocketConfig;

#[derive(Parser, Debug)]
#[command(name = "gimbal-sim")]
#[command(about = "Clustered-engine rocket with gimbal stabilization")]
#[command(version)]
struct Args {
    /// Rocket configuration (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated time (s)
    #[arg(short, long, default_value_t = 30.0)]
    duration: f64,

    /// Fixed physics step (s)
    #[arg(long, default_value_t = 0.02)]
    dt: f64,

    /// Launch time (s); the rocket stays on the pad when omitted
    #[arg(long)]
    launch_at: Option<f64>,

    /// Scripted input: T:launch, T:ID (toggle engine), T:ID:on, T:ID:off
    #[arg(long = "toggle", value_name = "T:ID")]
    toggles: Vec<ScheduledInput>,

    /// Initial tilt about world X (deg)
    #[arg(long, default_value_t = 0.0)]
    tilt_deg: f64,

    /// Write the sampled trajectory as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the flight summary and event log as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let rocket = match &args.config {
        Some(path) => RocketConfig::load(path)?,
        None => RocketConfig::default(),
    };
    let name = args
        .config
        .as_ref()
        .and_then(|p| p.file_stem())
        .map_or_else(|| "default".to_string(), |s| s.to_string_lossy().into_owned());

    let config = SimConfig { fixed_dt: args.dt, max_time: args.duration, ..SimConfig::default() };

    let mut script = args.toggles.clone();
    if let Some(t) = args.launch_at {
        script.push(ScheduledInput::new(t, InputEvent::ToggleLaunch));
    }

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let mut sim = Simulation::from_config(rocket, config, args.tilt_deg);
    let trajectory = sim.run(&script, args.duration)?;
    let summary = FlightSummary::from_trajectory(&trajectory);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    let mass = sim.core.mass_model();
    let propulsion = &sim.core.config().propulsion;
    println!();
    println!("====================================================================");
    println!("  GIMBAL STABILIZATION SIMULATION: {name}");
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Dry mass:      {:>10.0} kg  Crew:        {:>10.0} kg",
        mass.dry_mass, mass.crew_mass
    );
    println!(
        "  Fuel:          {:>10.0} kg  Engines:     {:>10}",
        mass.fuel_mass() + mass.fuel_burned(),
        sim.core.engines().len()
    );
    println!(
        "  Burn rate:     {:>10.1} kg/s Exhaust vel: {:>10.0} m/s",
        propulsion.burn_rate_per_engine, propulsion.exhaust_velocity
    );
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    if trajectory.events.is_empty() {
        println!("  (none)");
    }
    for event in &trajectory.events {
        println!("  {:<14} t={:>7.2}s", event.kind.to_string(), event.time);
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Max altitude:  {:>10.1} m   at t={:.2} s",
        summary.max_altitude_m, summary.max_altitude_time
    );
    println!("  Max climb:     {:>10.1} m/s", summary.max_vertical_speed);
    println!("  Max tilt:      {:>10.2} deg", summary.max_tilt_deg);
    println!("  Fuel used:     {:>10.0} kg  over {:.2} s of burn", summary.fuel_used, summary.burn_duration);
    println!("  Final mass:    {:>10.0} kg", summary.final_mass);
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>7}  {:>9}  {:>6}  {:>7}",
        "t (s)", "alt (m)", "vy (m/s)", "tilt", "fuel(kg)", "steer", "phase"
    );
    println!("  {}", "─".repeat(66));

    let samples = &trajectory.samples;
    let sample_interval = (samples.len() / 30).max(1);
    for (i, s) in samples.iter().enumerate() {
        if i % sample_interval != 0 && i != samples.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.1}  {:>9.1}  {:>7.2}  {:>9.0}  {:>6}  {:>7}",
            s.time,
            s.pos.y,
            s.vel.y,
            s.tilt_deg,
            s.fuel,
            s.steered_engines,
            if s.phase.is_launched() { "BURN" } else { "IDLE" }
        );
    }

    println!();
    println!("  Simulation: {} steps, dt={} s", samples.len().saturating_sub(1), args.dt);
    println!("====================================================================");
    println!();

    if let Some(path) = &args.csv {
        let path = path.to_string_lossy();
        csv::write_trajectory_file(&path, samples).with_context(|| format!("writing {path}"))?;
        log::info!("trajectory written to {path}");
    }
    if let Some(path) = &args.json {
        let path = path.to_string_lossy();
        json::write_summary_file(&path, &name, &summary, &trajectory.events)?;
        log::info!("summary written to {path}");
    }

    Ok(())
}
