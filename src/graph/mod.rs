//! Commit graph analysis
//!
//! This module holds the in-memory DAG snapshot and the run-scoped analyses
//! built on top of it:
//!
//! - [model::CommitGraph]: arena of commits with parent and child adjacency
//! - [ancestry::AncestryIndex]: memoized reachability sets
//! - [convergence::ConvergenceCache]: memoized exclusive commit sets
//! - [divergence::DivergenceResolver]: where a branch left its source
//! - [walker::MainlineWalker]: first-parent event stream with merge attribution
//!
//! A [GraphSession] ties one graph borrow to the two memo tables so callers
//! thread a single value through a calculation.

pub mod ancestry;
pub mod commit_set;
pub mod convergence;
pub mod divergence;
pub mod model;
pub mod walker;

pub use ancestry::AncestryIndex;
pub use commit_set::{CommitIdx, CommitSet};
pub use convergence::{ConvergenceCache, ExclusionContext, ExclusiveCommits};
pub use divergence::{Divergence, DivergenceResolver};
pub use model::CommitGraph;
pub use walker::{Attribution, MainlineEvent, MainlineWalker, MergeAttributor, MergeEvent, MergedBranch};

use std::rc::Rc;

/// Memo tables for one calculation run over one graph
///
/// The session cannot outlive the graph it borrows; dropping it releases
/// every cached set.
pub struct GraphSession<'g> {
    graph: &'g CommitGraph,
    ancestry: AncestryIndex,
    convergence: ConvergenceCache,
}

impl<'g> GraphSession<'g> {
    pub fn new(graph: &'g CommitGraph) -> Self {
        GraphSession {
            graph,
            ancestry: AncestryIndex::new(),
            convergence: ConvergenceCache::new(),
        }
    }

    pub fn graph(&self) -> &'g CommitGraph {
        self.graph
    }

    pub fn reachable(&mut self, start: CommitIdx) -> Rc<CommitSet> {
        self.ancestry.reachable(self.graph, start)
    }

    pub fn is_ancestor(&mut self, ancestor: CommitIdx, descendant: CommitIdx) -> bool {
        self.ancestry.is_ancestor(self.graph, ancestor, descendant)
    }

    pub fn exclusive(&mut self, start: CommitIdx, context: &ExclusionContext) -> Rc<ExclusiveCommits> {
        self.convergence
            .exclusive(self.graph, &mut self.ancestry, start, context)
    }

    pub fn ancestry(&self) -> &AncestryIndex {
        &self.ancestry
    }

    pub fn convergence(&self) -> &ConvergenceCache {
        &self.convergence
    }
}
