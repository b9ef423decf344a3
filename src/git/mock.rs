use crate::domain::Commit;
use crate::error::Result;
use crate::git::{BranchRef, Repository, TagRef};
use git2::Oid;
use std::collections::HashMap;

const EPOCH: i64 = 1_700_000_000;

/// In-memory repository for tests
///
/// Besides the raw `add_*` setters it offers a small fixture vocabulary
/// (`commit`, `branch`, `checkout`, `merge`, `tag`) that mirrors the git
/// porcelain, so scenarios read like the command sequence that built them.
/// Commit ids and timestamps are deterministic.
pub struct MockRepository {
    commits: HashMap<Oid, Commit>,
    branches: Vec<BranchRef>,
    tags: Vec<TagRef>,
    head: Option<String>,
    next_id: u64,
}

impl MockRepository {
    /// Create an empty repository with `main` checked out but unborn
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            branches: Vec::new(),
            tags: Vec::new(),
            head: Some("main".to_string()),
            next_id: 0,
        }
    }

    /// Add a commit to the mock repository
    pub fn add_commit(&mut self, commit: Commit) {
        self.commits.insert(commit.id, commit);
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.push(TagRef {
            name: name.into(),
            target: oid,
        });
    }

    /// Set a branch head, creating the branch if needed
    pub fn set_branch_head(&mut self, branch: impl Into<String>, oid: Oid) {
        let name = branch.into();
        match self.branches.iter_mut().find(|b| b.name == name) {
            Some(existing) => existing.tip = oid,
            None => self.branches.push(BranchRef { name, tip: oid }),
        }
    }

    /// Next deterministic commit id
    pub fn next_oid(&mut self) -> Oid {
        self.next_id += 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0xc0;
        bytes[12..].copy_from_slice(&self.next_id.to_be_bytes());
        Oid::from_bytes(&bytes).unwrap_or_else(|_| Oid::zero())
    }

    /// Tip of a branch, if it exists and has commits
    pub fn tip(&self, branch: &str) -> Option<Oid> {
        self.branches.iter().find(|b| b.name == branch).map(|b| b.tip)
    }

    /// Name of the checked-out branch
    pub fn current_branch(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Commit on the checked-out branch (like `git commit --allow-empty -m`)
    pub fn commit(&mut self, message: &str) -> Oid {
        let parents = self.head_tip().into_iter().collect();
        self.commit_with_parents(message, parents)
    }

    /// Create a branch at the current tip and check it out (`git checkout -b`)
    pub fn branch(&mut self, name: &str) {
        if let Some(tip) = self.head_tip() {
            self.set_branch_head(name, tip);
        }
        self.head = Some(name.to_string());
    }

    /// Switch to an existing branch
    pub fn checkout(&mut self, name: &str) {
        self.head = Some(name.to_string());
    }

    /// Non-fast-forward merge of `from` into the checked-out branch
    pub fn merge(&mut self, from: &str) -> Oid {
        let into = self.head.clone().unwrap_or_default();
        let message = format!("Merge branch '{}' into {}", from, into);
        self.merge_with_message(from, &message)
    }

    /// Non-fast-forward merge with an explicit message
    pub fn merge_with_message(&mut self, from: &str, message: &str) -> Oid {
        let mut parents: Vec<Oid> = self.head_tip().into_iter().collect();
        parents.extend(self.tip(from));
        self.commit_with_parents(message, parents)
    }

    /// Tag the tip of the checked-out branch
    pub fn tag(&mut self, name: &str) {
        if let Some(tip) = self.head_tip() {
            self.add_tag(name, tip);
        }
    }

    /// Delete a branch reference (its commits stay reachable through others)
    pub fn delete_branch(&mut self, name: &str) {
        self.branches.retain(|b| b.name != name);
    }

    fn head_tip(&self) -> Option<Oid> {
        self.head.as_deref().and_then(|name| self.tip(name))
    }

    fn commit_with_parents(&mut self, message: &str, parents: Vec<Oid>) -> Oid {
        let id = self.next_oid();
        let timestamp = EPOCH + (self.next_id as i64) * 60;
        self.add_commit(Commit::new(id, parents, timestamp, message));

        if let Some(head) = self.head.clone() {
            self.set_branch_head(head, id);
        }
        id
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn list_branches(&self) -> Result<Vec<BranchRef>> {
        Ok(self.branches.clone())
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }

    fn get_commit(&self, id: Oid) -> Result<Option<Commit>> {
        Ok(self.commits.get(&id).cloned())
    }

    fn head_branch(&self) -> Result<Option<String>> {
        Ok(self.head.clone())
    }
}
