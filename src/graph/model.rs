use super::{CommitIdx, CommitSet};
use crate::domain::branch::friendly_name;
use crate::domain::{Branch, Commit, Tag};
use crate::error::{MainlineError, Result};
use crate::git::{BranchRef, Repository, TagRef};
use git2::Oid;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Immutable snapshot of the commit DAG for one calculation
///
/// Commits live in an arena addressed by [`CommitIdx`]; parent adjacency is
/// stored as index lists.
#[derive(Debug)]
pub struct CommitGraph {
    commits: Vec<Commit>,
    index: HashMap<Oid, CommitIdx>,
    parents: Vec<Vec<CommitIdx>>,
    branches: Vec<Branch>,
    tags: HashMap<CommitIdx, Vec<Tag>>,
}

impl CommitGraph {
    /// Read every commit reachable from the repository's branches
    ///
    /// # Returns
    /// * `Ok(CommitGraph)` - A validated snapshot
    /// * `Err(MissingCommit)` - If a branch tip or a parent cannot be found
    pub fn load<R: Repository + ?Sized>(repo: &R) -> Result<Self> {
        let branches = repo.list_branches()?;
        let tags = repo.list_tags()?;

        let mut commits = Vec::new();
        let mut seen: HashSet<Oid> = HashSet::new();
        let mut worklist: Vec<(Oid, Oid)> = branches.iter().map(|b| (b.tip, b.tip)).collect();

        while let Some((id, referenced_by)) = worklist.pop() {
            if !seen.insert(id) {
                continue;
            }

            let commit = repo.get_commit(id)?.ok_or(MainlineError::MissingCommit {
                commit: id,
                referenced_by,
            })?;

            for parent in commit.parents.iter().rev() {
                worklist.push((*parent, id));
            }
            commits.push(commit);
        }

        debug!(
            commits = commits.len(),
            branches = branches.len(),
            "loaded commit graph"
        );
        Self::from_commits(commits, branches, tags)
    }

    /// Build a graph from already materialized commits
    ///
    /// Tags whose target is not part of the graph are ignored.
    pub fn from_commits(
        commits: Vec<Commit>,
        branches: Vec<BranchRef>,
        tags: Vec<TagRef>,
    ) -> Result<Self> {
        let index: HashMap<Oid, CommitIdx> = commits
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, CommitIdx(i as u32)))
            .collect();

        let mut parents = Vec::with_capacity(commits.len());

        for commit in &commits {
            let mut resolved = Vec::with_capacity(commit.parents.len());
            for parent in &commit.parents {
                let idx = index
                    .get(parent)
                    .copied()
                    .ok_or(MainlineError::MissingCommit {
                        commit: *parent,
                        referenced_by: commit.id,
                    })?;
                resolved.push(idx);
            }
            parents.push(resolved);
        }

        let mut graph_branches = Vec::with_capacity(branches.len());
        for branch in branches {
            if !index.contains_key(&branch.tip) {
                return Err(MainlineError::MissingCommit {
                    commit: branch.tip,
                    referenced_by: branch.tip,
                });
            }
            graph_branches.push(Branch::new(branch.name, branch.tip));
        }

        let mut tag_map: HashMap<CommitIdx, Vec<Tag>> = HashMap::new();
        for tag in tags {
            if let Some(idx) = index.get(&tag.target) {
                tag_map.entry(*idx).or_default().push(Tag::new(tag.name));
            }
        }

        Ok(CommitGraph {
            commits,
            index,
            parents,
            branches: graph_branches,
            tags: tag_map,
        })
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn commit(&self, idx: CommitIdx) -> &Commit {
        &self.commits[idx.index()]
    }

    pub fn idx_of(&self, id: Oid) -> Option<CommitIdx> {
        self.index.get(&id).copied()
    }

    pub fn parents(&self, idx: CommitIdx) -> &[CommitIdx] {
        &self.parents[idx.index()]
    }

    pub fn first_parent(&self, idx: CommitIdx) -> Option<CommitIdx> {
        self.parents[idx.index()].first().copied()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Find a branch by exact name, falling back to its friendly name
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches
            .iter()
            .find(|b| b.name == name)
            .or_else(|| {
                let wanted = friendly_name(name);
                self.branches.iter().find(|b| b.friendly_name() == wanted)
            })
    }

    /// Index of a branch tip; every listed branch is guaranteed to resolve
    pub fn tip_of(&self, branch: &Branch) -> Option<CommitIdx> {
        self.idx_of(branch.tip)
    }

    pub fn tags_at(&self, idx: CommitIdx) -> &[Tag] {
        self.tags.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First-parent chain from `tip` back to a root, newest first
    ///
    /// Stops early if a commit repeats, so a malformed cyclic input cannot
    /// loop forever.
    pub fn first_parent_chain(&self, tip: CommitIdx) -> Vec<CommitIdx> {
        let mut chain = Vec::new();
        let mut visited = CommitSet::new(self.len());
        let mut current = Some(tip);

        while let Some(idx) = current {
            if !visited.insert(idx) {
                debug!(commit = %self.commit(idx).id, "first-parent chain revisits a commit");
                break;
            }
            chain.push(idx);
            current = self.first_parent(idx);
        }

        chain
    }
}
