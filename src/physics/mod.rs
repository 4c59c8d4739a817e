pub mod noise;
pub mod wind;

pub use wind::WindConfig;
