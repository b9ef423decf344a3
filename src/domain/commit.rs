use crate::domain::IncrementStrategy;
use crate::error::{MainlineError, Result};
use git2::Oid;
use regex::Regex;
use std::sync::OnceLock;

/// A node in the commit graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: Oid,
    /// First parent is the mainline side of a merge
    pub parents: Vec<Oid>,
    /// Seconds since the epoch
    pub timestamp: i64,
    pub message: String,
}

impl Commit {
    pub fn new(id: Oid, parents: Vec<Oid>, timestamp: i64, message: impl Into<String>) -> Self {
        Commit {
            id,
            parents,
            timestamp,
            message: message.into(),
        }
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Parsed representation of a conventional commit header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

fn conventional_header() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| Regex::new(r"^([a-z]+)(?:\(([^)]+)\))?(!?):\s*(.*)").ok())
        .as_ref()
}

impl ParsedCommit {
    /// Parse a commit message according to the conventional commits format
    ///
    /// Supports `type(scope)!: description`, `type(scope): description`,
    /// `type!: description` and `type: description`. Returns `None` for
    /// messages that do not follow the convention.
    pub fn parse(message: &str) -> Option<Self> {
        let header = message.lines().next().unwrap_or("");
        let captures = conventional_header()?.captures(header)?;

        let r#type = captures.get(1)?.as_str().to_string();
        let scope = captures.get(2).map(|m| m.as_str().to_string());
        let has_exclamation = captures.get(3).map(|m| m.as_str()) == Some("!");
        let description = captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let is_breaking_change = has_exclamation
            || message.contains("BREAKING CHANGE:")
            || message.contains("BREAKING-CHANGE:");

        Some(ParsedCommit {
            r#type,
            scope,
            description,
            is_breaking_change,
        })
    }

    /// Increment implied by the header, if any
    pub fn increment(&self) -> Option<IncrementStrategy> {
        if self.is_breaking_change {
            return Some(IncrementStrategy::Major);
        }
        match self.r#type.as_str() {
            "feat" | "feature" => Some(IncrementStrategy::Minor),
            "fix" | "perf" => Some(IncrementStrategy::Patch),
            _ => None,
        }
    }
}

/// Compiled rules for reading explicit increments out of commit messages
#[derive(Debug, Clone)]
pub struct IncrementDirectives {
    major: Regex,
    minor: Regex,
    patch: Regex,
    none: Regex,
    conventional_commits: bool,
}

impl IncrementDirectives {
    pub fn new(
        major: &str,
        minor: &str,
        patch: &str,
        none: &str,
        conventional_commits: bool,
    ) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(&format!("(?im){}", pattern)).map_err(|e| {
                MainlineError::config(format!("Invalid bump message pattern '{}': {}", pattern, e))
            })
        };

        Ok(IncrementDirectives {
            major: compile(major)?,
            minor: compile(minor)?,
            patch: compile(patch)?,
            none: compile(none)?,
            conventional_commits,
        })
    }

    /// Explicit increment encoded in a message
    ///
    /// `+semver:` style directives take precedence over conventional commit
    /// headers. Among several directives the strongest wins, except that an
    /// explicit "none" silences a message with no other directive.
    pub fn parse(&self, message: &str) -> Option<IncrementStrategy> {
        if self.major.is_match(message) {
            return Some(IncrementStrategy::Major);
        }
        if self.minor.is_match(message) {
            return Some(IncrementStrategy::Minor);
        }
        if self.patch.is_match(message) {
            return Some(IncrementStrategy::Patch);
        }
        if self.none.is_match(message) {
            return Some(IncrementStrategy::None);
        }

        if self.conventional_commits {
            return ParsedCommit::parse(message).and_then(|parsed| parsed.increment());
        }

        None
    }
}
