use git2::Oid;
use std::fmt;

/// Non-fatal conditions met while calculating a version.
/// The calculation continues on a degraded path and reports these to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// None of the configured source branches exists; the branch is
    /// versioned as if it were its own main line
    NoDivergenceSource {
        branch: String,
        sources: Vec<String>,
    },
    /// No configured branch could be tied to a merge; it adds no increment
    AmbiguousMergeAttribution { merge: Oid, parent: Oid },
    /// Tag exists but cannot be parsed as a semantic version
    UnparsableTag { tag: String, reason: String },
    /// Source branch keys lead back to a key already being calculated
    ConfigurationCycle { branch: String },
}

fn short(id: &Oid) -> String {
    let full = id.to_string();
    full[..7.min(full.len())].to_string()
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoDivergenceSource { branch, sources } => {
                write!(
                    f,
                    "No source branch of '{}' found (looked for: {}); versioning from its oldest root",
                    branch,
                    sources.join(", ")
                )
            }
            BoundaryWarning::AmbiguousMergeAttribution { merge, parent } => {
                write!(
                    f,
                    "Cannot tell which branch merge {} brought in (parent {}); no increment applied",
                    short(merge),
                    short(parent)
                )
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::ConfigurationCycle { branch } => {
                write!(
                    f,
                    "Source branches of '{}' form a cycle; versioning from its oldest root",
                    branch
                )
            }
        }
    }
}
