//! Engine-level flight dynamics for a clustered-engine rocket: gimbal
//! actuation with slew and deflection limits, greedy stabilization engine
//! selection, fuel and center-of-mass bookkeeping, thrust and wind forces.

pub mod config;
pub mod dynamics;
pub mod error;
pub mod gnc;
pub mod io;
pub mod physics;
pub mod sim;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use config::RocketConfig;
pub use error::{Component, FlightError};
pub use sim::{FlightDynamicsCore, Simulation};
