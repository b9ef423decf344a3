use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use git_mainline::cli::{run_calculation, CalculationArgs};
use git_mainline::config;
use git_mainline::telemetry::init_tracing;
use git_mainline::ui::{self, OutputFormat};

#[derive(clap::Parser)]
#[command(
    name = "git-mainline",
    version,
    about = "Calculate a semantic version from git history using the mainline strategy"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Branch to version (defaults to the checked-out branch)")]
    branch: Option<String>,

    #[arg(short, long, default_value = ".", help = "Path inside the git repository")]
    path: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Console, help = "Output format")]
    output: OutputFormat,

    #[arg(short, long, help = "Log calculation details to stderr")]
    verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    log_json: bool,

    #[arg(long, help = "Show configured branches and exit")]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Warnings reach the user through the result, not the log
    let level = if args.verbose { Level::DEBUG } else { Level::ERROR };
    init_tracing(args.log_json, level);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    if args.list {
        println!("{}", ui::format_configured_branches(&config));
        return Ok(());
    }

    let calculation = CalculationArgs {
        path: args.path,
        branch: args.branch,
    };

    let result = match run_calculation(&calculation, &config) {
        Ok(result) => result,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    for warning in &result.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_result(&result, args.output)?;

    Ok(())
}
