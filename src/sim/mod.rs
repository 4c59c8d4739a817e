pub mod core;
pub mod event;
pub mod runner;

pub use self::core::{FlightDynamicsCore, InitDiagnostics, SkipReason, TickOutcome, TickReport};
pub use event::{EventKind, FlightEvent, InputEvent, ScheduledInput};
pub use runner::{Sample, Simulation, Trajectory};
