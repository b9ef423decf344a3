//! Memoized exclusive-commit computation.
//!
//! The question "which commits reachable from X are not reachable from any
//! of Y1..Yn" is asked repeatedly while resolving divergence points and
//! attributing merges. On a repository where hundreds of branches converge
//! on shared ancestors, answering it by recursing per branch and merging
//! fresh collections at each level explodes. Here every distinct
//! `(start, context)` pair is computed exactly once with a single bounded
//! worklist traversal and the result is shared by `Rc` afterwards.
//!
//! # Invariants
//! - An [`ExclusionContext`] is canonical: sorted and de-duplicated, so
//!   contexts built from the same commits in any order hash and compare
//!   equal.
//! - Cache hits return the stored `Rc`; nothing is copied.
//! - The number of traversals equals the number of distinct keys requested.

use super::{AncestryIndex, CommitGraph, CommitIdx, CommitSet};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::trace;

/// Canonical signature of a set of excluded starting points
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExclusionContext {
    tips: Vec<CommitIdx>,
}

impl ExclusionContext {
    pub fn new(tips: impl IntoIterator<Item = CommitIdx>) -> Self {
        let mut tips: Vec<CommitIdx> = tips.into_iter().collect();
        tips.sort_unstable();
        tips.dedup();
        ExclusionContext { tips }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(tip: CommitIdx) -> Self {
        ExclusionContext { tips: vec![tip] }
    }

    pub fn tips(&self) -> &[CommitIdx] {
        &self.tips
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }
}

impl FromIterator<CommitIdx> for ExclusionContext {
    fn from_iter<I: IntoIterator<Item = CommitIdx>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Commits reachable from a start but not from its exclusion context
///
/// Stored sorted; these sets are usually small compared to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExclusiveCommits {
    commits: Vec<CommitIdx>,
}

impl ExclusiveCommits {
    fn from_unsorted(mut commits: Vec<CommitIdx>) -> Self {
        commits.sort_unstable();
        ExclusiveCommits { commits }
    }

    pub fn contains(&self, idx: CommitIdx) -> bool {
        self.commits.binary_search(&idx).is_ok()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CommitIdx> + '_ {
        self.commits.iter().copied()
    }
}

/// Run-scoped memo of exclusive commit sets
///
/// Entries are grouped by context first so lookups borrow the caller's
/// context instead of cloning it into a composite key.
#[derive(Debug, Default)]
pub struct ConvergenceCache {
    entries: HashMap<ExclusionContext, HashMap<CommitIdx, Rc<ExclusiveCommits>>>,
    excluded: HashMap<ExclusionContext, Rc<CommitSet>>,
    computations: usize,
}

impl ConvergenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits reachable from `start` that no tip of `context` can reach
    ///
    /// An empty context yields the full ancestry of `start`; a `start`
    /// already reachable from the context yields an empty set.
    pub fn exclusive(
        &mut self,
        graph: &CommitGraph,
        ancestry: &mut AncestryIndex,
        start: CommitIdx,
        context: &ExclusionContext,
    ) -> Rc<ExclusiveCommits> {
        if let Some(hit) = self.entries.get(context).and_then(|m| m.get(&start)) {
            return Rc::clone(hit);
        }

        let result = if context.is_empty() {
            let all = ancestry.reachable(graph, start);
            ExclusiveCommits::from_unsorted(all.iter().collect())
        } else {
            let excluded = self.excluded_ancestry(graph, ancestry, context);
            Self::walk_exclusive(graph, start, &excluded)
        };

        self.computations += 1;
        trace!(
            start = %start,
            context = context.tips().len(),
            exclusive = result.len(),
            "computed exclusive commits"
        );

        let result = Rc::new(result);
        self.entries
            .entry(context.clone())
            .or_default()
            .insert(start, Rc::clone(&result));
        result
    }

    /// Number of memoized `(start, context)` pairs
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of traversals actually performed
    pub fn computations(&self) -> usize {
        self.computations
    }

    fn excluded_ancestry(
        &mut self,
        graph: &CommitGraph,
        ancestry: &mut AncestryIndex,
        context: &ExclusionContext,
    ) -> Rc<CommitSet> {
        if let [only] = context.tips() {
            return ancestry.reachable(graph, *only);
        }

        if let Some(union) = self.excluded.get(context) {
            return Rc::clone(union);
        }

        let mut union = CommitSet::new(graph.len());
        for tip in context.tips() {
            union.union_with(&ancestry.reachable(graph, *tip));
        }

        let union = Rc::new(union);
        self.excluded.insert(context.clone(), Rc::clone(&union));
        union
    }

    fn walk_exclusive(graph: &CommitGraph, start: CommitIdx, excluded: &CommitSet) -> ExclusiveCommits {
        let mut visited = HashSet::new();
        let mut found = Vec::new();
        let mut worklist = vec![start];

        while let Some(idx) = worklist.pop() {
            // Everything behind an excluded commit is excluded too
            if excluded.contains(idx) || !visited.insert(idx) {
                continue;
            }
            found.push(idx);
            worklist.extend(graph.parents(idx).iter().copied());
        }

        ExclusiveCommits::from_unsorted(found)
    }
}
