pub mod engine;
pub mod layout;

pub use engine::{Engine, GimbalLimits, Pivot};
pub use layout::EngineLayout;
