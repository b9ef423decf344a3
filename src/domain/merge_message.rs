use crate::domain::branch::friendly_name;
use regex::Regex;
use std::sync::OnceLock;

/// Branch names recovered from a merge commit's message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMessage {
    /// The merged-in branch, with any remote prefix removed
    pub source: String,
    pub target: Option<String>,
    pub pull_request: Option<u64>,
}

fn formats() -> &'static [Regex] {
    static FORMATS: OnceLock<Vec<Regex>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        [
            // git merge / git pull
            r"^Merge (?:remote-tracking )?branch '(?P<source>[^']+)'(?: of \S+)?(?: into (?P<target>\S+))?",
            // GitHub
            r"^Merge pull request #(?P<pr>\d+) (?:from|in) (?:[^/\s]+/)?(?P<source>\S+)(?: into (?P<target>\S+))?",
            // Bitbucket
            r"^Merged in (?P<source>\S+?)(?: \(pull request #(?P<pr>\d+)\))?(?: into (?P<target>\S+))?$",
            // Azure DevOps, default title
            r"^Merged PR (?P<pr>\d+): Merge (?P<source>\S+) (?:to|into) (?P<target>\S+)$",
            // Azure DevOps, custom title; the last "from .. into .." wins
            r"^Merged PR (?P<pr>\d+): (?:.* )?from (?P<source>\S+) into (?P<target>\S+)$",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

impl MergeMessage {
    /// Read the merged-in branch out of a merge commit message
    ///
    /// Returns `None` when the first line follows none of the known merge
    /// message formats.
    pub fn parse(message: &str) -> Option<Self> {
        let summary = message.lines().next().unwrap_or("").trim();

        formats().iter().find_map(|format| {
            let captures = format.captures(summary)?;
            let source = friendly_name(captures.name("source")?.as_str()).to_string();
            Some(MergeMessage {
                source,
                target: captures
                    .name("target")
                    .map(|m| friendly_name(m.as_str()).to_string()),
                pull_request: captures.name("pr").and_then(|m| m.as_str().parse().ok()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_merge_message() {
        let parsed = MergeMessage::parse("Merge branch 'feature/login'").unwrap();
        assert_eq!(parsed.source, "feature/login");
        assert_eq!(parsed.target, None);

        let parsed = MergeMessage::parse("Merge branch 'feature/a' into develop\n\nbody").unwrap();
        assert_eq!(parsed.source, "feature/a");
        assert_eq!(parsed.target.as_deref(), Some("develop"));
    }

    #[test]
    fn test_remote_tracking_branch() {
        let parsed =
            MergeMessage::parse("Merge remote-tracking branch 'origin/release/2.0' into main")
                .unwrap();
        assert_eq!(parsed.source, "release/2.0");
        assert_eq!(parsed.target.as_deref(), Some("main"));
    }

    #[test]
    fn test_pull_request() {
        let parsed = MergeMessage::parse("Merge pull request #42 from octocat/hotfix/crash").unwrap();
        assert_eq!(parsed.source, "hotfix/crash");
        assert_eq!(parsed.pull_request, Some(42));
    }

    #[test]
    fn test_bitbucket_style() {
        let parsed = MergeMessage::parse("Merged in feature/pay (pull request #7)").unwrap();
        assert_eq!(parsed.source, "feature/pay");
        assert_eq!(parsed.pull_request, Some(7));
        assert_eq!(parsed.target, None);
    }

    #[test]
    fn test_azure_devops_default_title() {
        let parsed = MergeMessage::parse("Merged PR 12: Merge feature/report to develop").unwrap();
        assert_eq!(parsed.source, "feature/report");
        assert_eq!(parsed.target.as_deref(), Some("develop"));
        assert_eq!(parsed.pull_request, Some(12));
    }

    #[test]
    fn test_azure_devops_custom_title() {
        let parsed =
            MergeMessage::parse("Merged PR 12: Add report from feature/report into develop")
                .unwrap();
        assert_eq!(parsed.source, "feature/report");
        assert_eq!(parsed.target.as_deref(), Some("develop"));
        assert_eq!(parsed.pull_request, Some(12));

        let parsed = MergeMessage::parse(
            "Merged PR 31: Import data from csv from feature/import into develop",
        )
        .unwrap();
        assert_eq!(parsed.source, "feature/import");
    }

    #[test]
    fn test_azure_devops_title_without_branches_is_none() {
        assert!(MergeMessage::parse("Merged PR 12: Add report").is_none());
    }

    #[test]
    fn test_plain_message_is_none() {
        assert!(MergeMessage::parse("fix: handle empty input").is_none());
        assert!(MergeMessage::parse("").is_none());
    }
}
