use crate::domain::Commit;
use crate::error::Result;
use crate::git::{BranchRef, TagRef};
use git2::{BranchType, ErrorCode, ObjectType, Oid, Repository as Git2Repo};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }
}

impl super::Repository for Git2Repository {
    fn list_branches(&self) -> Result<Vec<BranchRef>> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let name = match branch.name()? {
                Some(name) => name.to_string(),
                None => continue,
            };

            // Symbolic or unborn branches have no direct target
            match branch.get().target() {
                Some(tip) => branches.push(BranchRef { name, tip }),
                None => debug!(branch = %name, "skipping branch without target"),
            }
        }

        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            match reference.peel(ObjectType::Commit) {
                Ok(object) => tags.push(TagRef {
                    name: name.to_string(),
                    target: object.id(),
                }),
                Err(e) => debug!(tag = %name, error = %e, "skipping tag that is not a commit"),
            }
        }

        Ok(tags)
    }

    fn get_commit(&self, id: Oid) -> Result<Option<Commit>> {
        let commit = match self.repo.find_commit(id) {
            Ok(commit) => commit,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Commit {
            id,
            parents: commit.parent_ids().collect(),
            timestamp: commit.time().seconds(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        }))
    }

    fn head_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }

        Ok(head.shorthand().map(|s| s.to_string()))
    }
}
