use git2::Oid;

/// A named pointer at a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub tip: Oid,
}

impl Branch {
    /// Create a new branch
    pub fn new(name: impl Into<String>, tip: Oid) -> Self {
        Branch {
            name: name.into(),
            tip,
        }
    }

    /// Name without a `refs/heads/` or `origin/` style prefix
    pub fn friendly_name(&self) -> &str {
        friendly_name(&self.name)
    }
}

/// Strip reference prefixes so `refs/heads/develop`, `origin/develop` and
/// `develop` all read as `develop`
pub fn friendly_name(name: &str) -> &str {
    let name = name
        .strip_prefix("refs/heads/")
        .or_else(|| name.strip_prefix("refs/remotes/"))
        .unwrap_or(name);
    name.strip_prefix("origin/").unwrap_or(name)
}
