use crate::error::{MainlineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic version plus the number of commits since its source
///
/// Fields only ever grow during a single calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub commits_since_source: u64,
}

impl Version {
    /// Create a new version with no commits since source
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            commits_since_source: 0,
        }
    }

    /// Parse a bare `X.Y.Z` literal (pre-release and build metadata are ignored)
    pub fn parse(literal: &str) -> Result<Self> {
        let parsed = semver::Version::parse(literal.trim()).map_err(|e| {
            MainlineError::version(format!("Invalid version '{}': {}", literal, e))
        })?;
        Ok(Version::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Bump version according to the increment strategy
    pub fn bump(&self, increment: IncrementStrategy) -> Self {
        match increment {
            IncrementStrategy::Major => Version {
                major: self.major + 1,
                minor: 0,
                patch: 0,
                ..*self
            },
            IncrementStrategy::Minor => Version {
                minor: self.minor + 1,
                patch: 0,
                ..*self
            },
            IncrementStrategy::Patch => Version {
                patch: self.patch + 1,
                ..*self
            },
            IncrementStrategy::None => *self,
        }
    }

    /// Compare only the `major.minor.patch` triple
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Which version component a branch, merge or commit bumps
///
/// Variants are ordered by strength so the strongest of several candidates
/// can be picked with `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IncrementStrategy {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for IncrementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IncrementStrategy::None => "none",
            IncrementStrategy::Patch => "patch",
            IncrementStrategy::Minor => "minor",
            IncrementStrategy::Major => "major",
        };
        f.write_str(name)
    }
}
