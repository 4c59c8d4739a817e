pub mod body;
pub mod mass;
pub mod rotation;
pub mod state;

pub use body::{FreeBody, RigidBody};
pub use mass::{MassModel, ModuleGeometry};
