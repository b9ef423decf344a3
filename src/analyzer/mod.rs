//! Version calculation on top of the commit graph analyses

pub mod accumulator;
pub mod version_calculator;

pub use accumulator::VersionAccumulator;
pub use version_calculator::{VersionCalculator, VersionResult, VersionVariables};
