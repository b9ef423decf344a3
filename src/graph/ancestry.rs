use super::{CommitGraph, CommitIdx, CommitSet};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Memoized "everything reachable from here" sets
///
/// Each starting commit is expanded at most once per run. Later queries
/// return the same shared set. While walking, a commit whose own set is
/// already memoized is merged in wholesale instead of being re-expanded.
#[derive(Debug, Default)]
pub struct AncestryIndex {
    memo: HashMap<CommitIdx, Rc<CommitSet>>,
    computations: usize,
}

impl AncestryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commits reachable from `start` by parent edges, `start` included
    pub fn reachable(&mut self, graph: &CommitGraph, start: CommitIdx) -> Rc<CommitSet> {
        if let Some(set) = self.memo.get(&start) {
            return Rc::clone(set);
        }

        let mut reached = CommitSet::new(graph.len());
        let mut worklist = vec![start];

        while let Some(idx) = worklist.pop() {
            if reached.contains(idx) {
                continue;
            }

            if idx != start {
                if let Some(known) = self.memo.get(&idx) {
                    reached.union_with(known);
                    continue;
                }
            }

            reached.insert(idx);
            worklist.extend(graph.parents(idx).iter().copied());
        }

        self.computations += 1;
        trace!(start = %start, reachable = reached.len(), "computed ancestry");

        let reached = Rc::new(reached);
        self.memo.insert(start, Rc::clone(&reached));
        reached
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    pub fn is_ancestor(
        &mut self,
        graph: &CommitGraph,
        ancestor: CommitIdx,
        descendant: CommitIdx,
    ) -> bool {
        self.reachable(graph, descendant).contains(ancestor)
    }

    /// Number of memoized starting commits
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Number of traversals actually performed
    pub fn computations(&self) -> usize {
        self.computations
    }
}
