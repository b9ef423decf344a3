use crate::domain::Version;
use crate::error::{MainlineError, Result};
use regex::Regex;

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }
}

/// Tag prefix rule (e.g. `[vV]?`, `release-`) used to read versions from tags
#[derive(Debug, Clone)]
pub struct TagPrefix {
    pattern: Regex,
}

impl TagPrefix {
    /// Compile a prefix pattern; it is anchored at the start of the tag name
    pub fn new(prefix: &str) -> Result<Self> {
        let pattern = Regex::new(&format!("^(?:{})", prefix)).map_err(|e| {
            MainlineError::config(format!("Invalid tag prefix '{}': {}", prefix, e))
        })?;
        Ok(TagPrefix { pattern })
    }

    /// Extract the version part of a tag (e.g. "v1.2.3" -> "1.2.3")
    pub fn version_part<'a>(&self, tag: &'a Tag) -> &'a str {
        match self.pattern.find(&tag.name) {
            Some(m) => &tag.name[m.end()..],
            None => &tag.name,
        }
    }

    /// Parse the version a tag denotes
    pub fn parse_version(&self, tag: &Tag) -> Result<Version> {
        Version::parse(self.version_part(tag))
    }
}
