use crate::domain::branch::friendly_name;
use crate::domain::{IncrementDirectives, IncrementStrategy, TagPrefix, Version};
use crate::error::{MainlineError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "gitmainline.toml";

/// Represents the complete configuration for git-mainline.
///
/// Contains the ordered branch table plus the commit message and tag rules
/// shared by every branch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default = "default_fallback_version")]
    pub fallback_version: String,

    #[serde(default)]
    pub commit_message_incrementing: CommitMessageIncrementing,

    #[serde(default)]
    pub conventional_commits: bool,

    #[serde(default = "default_major_message")]
    pub major_version_bump_message: String,

    #[serde(default = "default_minor_message")]
    pub minor_version_bump_message: String,

    #[serde(default = "default_patch_message")]
    pub patch_version_bump_message: String,

    #[serde(default = "default_no_bump_message")]
    pub no_bump_message: String,

    #[serde(default)]
    pub commit_increment: CommitIncrementPolicy,

    #[serde(default = "default_branches")]
    pub branches: Vec<BranchConfig>,
}

/// Where explicit increments are read from
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CommitMessageIncrementing {
    /// Plain commits, merge messages and merged-in commits
    #[default]
    Enabled,
    /// Only merge commit messages
    MergeMessageOnly,
    Disabled,
}

/// How a branch's own increment applies to commits without a directive
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CommitIncrementPolicy {
    /// Once per walk, and only if nothing else incremented
    #[default]
    Once,
    PerCommit,
}

/// One entry of the branch table
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchConfig {
    pub key: String,
    pub regex: String,

    #[serde(default)]
    pub increment: IncrementStrategy,

    #[serde(default)]
    pub is_main_line: bool,

    /// Keys of other entries, in priority order
    #[serde(default)]
    pub source_branches: Vec<String>,

    #[serde(default)]
    pub commit_increment: Option<CommitIncrementPolicy>,
}

impl BranchConfig {
    fn new(
        key: &str,
        regex: &str,
        increment: IncrementStrategy,
        is_main_line: bool,
        source_branches: &[&str],
    ) -> Self {
        BranchConfig {
            key: key.to_string(),
            regex: regex.to_string(),
            increment,
            is_main_line,
            source_branches: source_branches.iter().map(|s| s.to_string()).collect(),
            commit_increment: None,
        }
    }
}

/// Resolved, read-only policy for one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveBranchConfig {
    pub key: String,
    pub increment: IncrementStrategy,
    pub is_main_line: bool,
    pub source_branches: Vec<String>,
    pub commit_increment: CommitIncrementPolicy,
}

fn default_tag_prefix() -> String {
    "[vV]?".to_string()
}

fn default_fallback_version() -> String {
    "0.0.0".to_string()
}

fn default_major_message() -> String {
    r"\+semver:\s?(breaking|major)".to_string()
}

fn default_minor_message() -> String {
    r"\+semver:\s?(feature|minor)".to_string()
}

fn default_patch_message() -> String {
    r"\+semver:\s?(fix|patch)".to_string()
}

fn default_no_bump_message() -> String {
    r"\+semver:\s?(none|skip)".to_string()
}

/// Returns the default branch table, most specific entries first.
fn default_branches() -> Vec<BranchConfig> {
    use IncrementStrategy::{Minor, Patch};

    vec![
        BranchConfig::new("main", r"^(master|main)$", Patch, true, &[]),
        BranchConfig::new("develop", r"^dev(elop)?(ment)?$", Minor, false, &["main"]),
        BranchConfig::new("release", r"^releases?[/-]", Minor, false, &["develop", "main"]),
        BranchConfig::new(
            "feature",
            r"^features?[/-]",
            Minor,
            false,
            &["develop", "main", "release"],
        ),
        BranchConfig::new("hotfix", r"^hotfix(es)?[/-]", Patch, false, &["main", "release"]),
        BranchConfig::new("unknown", r".*", Patch, false, &["develop", "main"]),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_prefix: default_tag_prefix(),
            fallback_version: default_fallback_version(),
            commit_message_incrementing: CommitMessageIncrementing::default(),
            conventional_commits: false,
            major_version_bump_message: default_major_message(),
            minor_version_bump_message: default_minor_message(),
            patch_version_bump_message: default_patch_message(),
            no_bump_message: default_no_bump_message(),
            commit_increment: CommitIncrementPolicy::default(),
            branches: default_branches(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitmainline.toml` in current directory
/// 3. `<config dir>/.gitmainline.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

struct ResolvedEntry {
    pattern: Regex,
    effective: EffectiveBranchConfig,
}

/// Pure branch-name to policy lookup, compiled once per run
pub struct ConfigResolver {
    entries: Vec<ResolvedEntry>,
    directives: IncrementDirectives,
    tag_prefix: TagPrefix,
    fallback_version: Version,
    message_incrementing: CommitMessageIncrementing,
}

impl ConfigResolver {
    /// Compile every pattern in the configuration
    ///
    /// Fails on invalid regexes, an unparsable fallback version, or source
    /// branch keys that name no entry.
    pub fn new(config: &Config) -> Result<Self> {
        let mut entries = Vec::with_capacity(config.branches.len());

        for branch in &config.branches {
            let pattern = Regex::new(&branch.regex).map_err(|e| {
                MainlineError::config(format!(
                    "Invalid regex '{}' for branch '{}': {}",
                    branch.regex, branch.key, e
                ))
            })?;

            for source in &branch.source_branches {
                if !config.branches.iter().any(|b| &b.key == source) {
                    return Err(MainlineError::config(format!(
                        "Branch '{}' lists unknown source branch '{}'",
                        branch.key, source
                    )));
                }
            }

            entries.push(ResolvedEntry {
                pattern,
                effective: EffectiveBranchConfig {
                    key: branch.key.clone(),
                    increment: branch.increment,
                    is_main_line: branch.is_main_line,
                    source_branches: branch.source_branches.clone(),
                    commit_increment: branch.commit_increment.unwrap_or(config.commit_increment),
                },
            });
        }

        let directives = IncrementDirectives::new(
            &config.major_version_bump_message,
            &config.minor_version_bump_message,
            &config.patch_version_bump_message,
            &config.no_bump_message,
            config.conventional_commits,
        )?;

        Ok(ConfigResolver {
            entries,
            directives,
            tag_prefix: TagPrefix::new(&config.tag_prefix)?,
            fallback_version: Version::parse(&config.fallback_version)?,
            message_incrementing: config.commit_message_incrementing,
        })
    }

    /// Policy for a branch name; first matching entry wins
    pub fn resolve(&self, branch_name: &str) -> Option<&EffectiveBranchConfig> {
        let name = friendly_name(branch_name);
        self.entries
            .iter()
            .find(|entry| entry.pattern.is_match(name))
            .map(|entry| &entry.effective)
    }

    /// Policy by configuration key
    pub fn by_key(&self, key: &str) -> Option<&EffectiveBranchConfig> {
        self.entries
            .iter()
            .find(|entry| entry.effective.key == key)
            .map(|entry| &entry.effective)
    }

    /// Whether a branch name belongs to the entry with this key
    ///
    /// A name belongs to a key only when that key is the first entry its
    /// name resolves to, so `develop` is never mistaken for `unknown`.
    pub fn belongs_to(&self, branch_name: &str, key: &str) -> bool {
        self.resolve(branch_name)
            .map(|effective| effective.key == key)
            .unwrap_or(false)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.effective.key.as_str())
    }

    pub fn directives(&self) -> &IncrementDirectives {
        &self.directives
    }

    pub fn tag_prefix(&self) -> &TagPrefix {
        &self.tag_prefix
    }

    pub fn fallback_version(&self) -> Version {
        self.fallback_version
    }

    pub fn message_incrementing(&self) -> CommitMessageIncrementing {
        self.message_incrementing
    }
}
