//! Command-line workflow, separated from argument parsing

pub mod orchestration;

pub use orchestration::{calculate_in, run_calculation, CalculationArgs};
