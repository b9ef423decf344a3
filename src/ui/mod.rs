//! User interface module - output formatting for the binary.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_result, format_configured_branches,
    format_version_console, format_version_json, OutputFormat,
};
