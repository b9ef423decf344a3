pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod graph;
pub mod telemetry;
pub mod ui;

pub use analyzer::{VersionCalculator, VersionResult};
pub use error::{MainlineError, Result};
