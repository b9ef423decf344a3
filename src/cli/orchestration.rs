//! Calculation workflow behind the `git-mainline` binary
//!
//! Keeps clap out of the workflow so it can be driven programmatically:
//! open the repository, snapshot the graph, resolve configuration and
//! calculate.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::analyzer::{VersionCalculator, VersionResult};
use crate::config::{Config, ConfigResolver};
use crate::git::{Git2Repository, Repository};
use crate::graph::CommitGraph;

/// Arguments for one calculation
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationArgs {
    /// Repository path; discovery walks up from here
    pub path: PathBuf,

    /// Branch to version; the checked-out branch when `None`
    pub branch: Option<String>,
}

impl Default for CalculationArgs {
    fn default() -> Self {
        CalculationArgs {
            path: PathBuf::from("."),
            branch: None,
        }
    }
}

/// Open the repository at `args.path` and calculate the requested branch
pub fn run_calculation(args: &CalculationArgs, config: &Config) -> Result<VersionResult> {
    let repo = Git2Repository::open(&args.path)
        .with_context(|| format!("Failed to open git repository at '{}'", args.path.display()))?;
    calculate_in(&repo, args.branch.as_deref(), config)
}

/// Calculate a branch of any repository reader
pub fn calculate_in<R: Repository + ?Sized>(
    repo: &R,
    branch: Option<&str>,
    config: &Config,
) -> Result<VersionResult> {
    let branch = match branch {
        Some(name) => name.to_string(),
        None => repo
            .head_branch()?
            .context("HEAD is not on a branch; pass --branch")?,
    };

    let resolver = ConfigResolver::new(config).context("Invalid configuration")?;
    let graph = CommitGraph::load(repo).context("Failed to read commit graph")?;
    debug!(branch = %branch, commits = graph.len(), "starting calculation");

    let mut calculator = VersionCalculator::new(&graph, &resolver);
    let result = calculator
        .calculate(&branch)
        .with_context(|| format!("Failed to calculate version of '{}'", branch))?;
    Ok(result)
}
