use git2::Oid;
use thiserror::Error;

/// Unified error type for version calculation
#[derive(Error, Debug)]
pub enum MainlineError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Commit {commit} referenced by {referenced_by} is missing from the repository")]
    MissingCommit { commit: Oid, referenced_by: Oid },

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in git-mainline
pub type Result<T> = std::result::Result<T, MainlineError>;

impl MainlineError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        MainlineError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        MainlineError::Version(msg.into())
    }

    /// Create a branch-not-found error
    pub fn branch_not_found(name: impl Into<String>) -> Self {
        MainlineError::BranchNotFound(name.into())
    }
}
