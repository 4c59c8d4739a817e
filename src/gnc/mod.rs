pub mod gimbal;
pub mod selector;

pub use gimbal::{DeadBand, GimbalActuator, GimbalUpdate};
pub use selector::{evaluation_order, required_torque, Selection, StabilizationSelector};
