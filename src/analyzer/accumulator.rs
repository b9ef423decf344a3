use crate::config::{CommitIncrementPolicy, CommitMessageIncrementing, EffectiveBranchConfig};
use crate::domain::{IncrementDirectives, IncrementStrategy, Version};
use crate::graph::{CommitGraph, MainlineEvent, MergeEvent};
use tracing::trace;

/// Folds mainline events into a version
///
/// Increments only ever move the version forward. Plain commits count
/// toward `commits_since_source`; merges do not.
///
/// Under the `Once` policy the owner's increment is held back until
/// [`finish`](Self::finish) and dropped if a merge already incremented. A
/// directive on one commit never cancels the default owed by another.
pub struct VersionAccumulator<'a> {
    version: Version,
    owner: &'a EffectiveBranchConfig,
    directives: &'a IncrementDirectives,
    incrementing: CommitMessageIncrementing,
    pending_default: bool,
    merge_incremented: bool,
}

impl<'a> VersionAccumulator<'a> {
    /// Start from `base`, defaulting plain commits to `owner`'s increment
    pub fn new(
        base: Version,
        owner: &'a EffectiveBranchConfig,
        directives: &'a IncrementDirectives,
        incrementing: CommitMessageIncrementing,
    ) -> Self {
        VersionAccumulator {
            version: base,
            owner,
            directives,
            incrementing,
            pending_default: false,
            merge_incremented: false,
        }
    }

    pub fn apply(&mut self, graph: &CommitGraph, event: &MainlineEvent) {
        match event {
            MainlineEvent::Commit(idx) => {
                self.version.commits_since_source += 1;

                let directive = match self.incrementing {
                    CommitMessageIncrementing::Enabled => {
                        self.directives.parse(&graph.commit(*idx).message)
                    }
                    _ => None,
                };

                match (directive, self.owner.commit_increment) {
                    (Some(increment), _) => self.increment(increment),
                    (None, CommitIncrementPolicy::PerCommit) => self.increment(self.owner.increment),
                    (None, CommitIncrementPolicy::Once) => self.pending_default = true,
                }
            }
            MainlineEvent::Merge(merge) => {
                let increment = self.merge_increment(graph, merge);
                if increment != IncrementStrategy::None {
                    self.merge_incremented = true;
                }
                self.increment(increment);
            }
        }
    }

    /// Strongest of the merged branch's increment and any directives
    fn merge_increment(&self, graph: &CommitGraph, merge: &MergeEvent) -> IncrementStrategy {
        let mut increment = merge
            .branch
            .as_ref()
            .map(|branch| branch.config.increment)
            .unwrap_or_default();

        let read = |message: &str| self.directives.parse(message).unwrap_or_default();

        match self.incrementing {
            CommitMessageIncrementing::Enabled => {
                increment = increment.max(read(&graph.commit(merge.merge).message));
                for idx in merge.merged_commits.iter() {
                    increment = increment.max(read(&graph.commit(idx).message));
                }
            }
            CommitMessageIncrementing::MergeMessageOnly => {
                increment = increment.max(read(&graph.commit(merge.merge).message));
            }
            CommitMessageIncrementing::Disabled => {}
        }

        increment
    }

    fn increment(&mut self, increment: IncrementStrategy) {
        if increment == IncrementStrategy::None {
            return;
        }
        self.version = self.version.bump(increment);
        trace!(%increment, version = %self.version, "applied increment");
    }

    /// Current version, before any pending default is applied
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn finish(mut self) -> Version {
        if self.pending_default && !self.merge_incremented {
            self.increment(self.owner.increment);
        }
        self.version
    }
}
