//! Pure formatting functions for UI output.
//!
//! Formatting is kept apart from printing so it can be tested; styling goes
//! through `console`, which drops colors when the stream is not a terminal.

use console::style;

use crate::analyzer::VersionResult;
use crate::boundary::BoundaryWarning;
use crate::config::Config;

/// How the calculated version is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

/// Human-readable summary of a result.
pub fn format_version_console(result: &VersionResult) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            style("Version:").bold(),
            style(result.version).green().bold()
        ),
        format!("  Branch:  {}", result.branch),
        format!("  Commit:  {}", result.sha),
        format!(
            "  Commits since version source: {}",
            result.version.commits_since_source
        ),
    ];

    match (&result.version_source_tag, result.version_source_sha) {
        (Some(tag), Some(sha)) => lines.push(format!("  Source:  {} ({})", style(tag).cyan(), sha)),
        (None, Some(sha)) => lines.push(format!("  Source:  {}", sha)),
        _ => {}
    }

    lines.join("\n")
}

/// Pretty-printed JSON of the result's version variables.
pub fn format_version_json(result: &VersionResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// One line per configured branch: key, pattern, increment and sources.
pub fn format_configured_branches(config: &Config) -> String {
    let mut lines = vec![style("Configured branches:").bold().to_string()];

    for branch in &config.branches {
        let mut line = format!(
            "  - {} ({}) increment={}",
            style(&branch.key).cyan(),
            branch.regex,
            branch.increment
        );
        if branch.is_main_line {
            line.push_str(" main-line");
        }
        if !branch.source_branches.is_empty() {
            line.push_str(&format!(" sources=[{}]", branch.source_branches.join(", ")));
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Print the result in the requested format.
pub fn display_result(result: &VersionResult, format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Console => println!("{}", format_version_console(result)),
        OutputFormat::Json => println!("{}", format_version_json(result)?),
    }
    Ok(())
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}
