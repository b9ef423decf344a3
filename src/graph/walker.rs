use super::{CommitGraph, CommitIdx, ExclusionContext, ExclusiveCommits, GraphSession};
use crate::config::{ConfigResolver, EffectiveBranchConfig};
use crate::domain::branch::friendly_name;
use crate::domain::MergeMessage;
use std::cell::OnceCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::debug;

/// How a merge was tied to a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    /// A live branch still contains the merged-in parent
    Ancestry,
    /// The branch name was read from the merge commit message
    MergeMessage,
}

/// The configured branch a merge is judged to represent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBranch {
    pub name: String,
    pub config: EffectiveBranchConfig,
    pub attribution: Attribution,
}

/// One merged-in parent of a merge commit on the mainline
#[derive(Debug, Clone)]
pub struct MergeEvent {
    pub merge: CommitIdx,
    pub mainline_parent: CommitIdx,
    pub merged_parent: CommitIdx,
    /// `None` when no configured branch could be tied to the merge
    pub branch: Option<MergedBranch>,
    /// Commits the merge brought in that the mainline did not have
    pub merged_commits: Rc<ExclusiveCommits>,
}

#[derive(Debug, Clone)]
pub enum MainlineEvent {
    Commit(CommitIdx),
    Merge(MergeEvent),
}

/// A configured branch that may have brought in merged commits
struct Candidate {
    name: String,
    config: EffectiveBranchConfig,
    tip: CommitIdx,
    /// Tips of the branches its configured source keys resolve to
    sources: Vec<CommitIdx>,
}

/// Decides which configured branch a merge commit brought in
pub struct MergeAttributor<'c> {
    config: &'c ConfigResolver,
    target: String,
    candidates: OnceCell<Vec<Candidate>>,
}

impl<'c> MergeAttributor<'c> {
    /// `target` is the branch being walked; it is never a candidate
    pub fn new(config: &'c ConfigResolver, target: impl Into<String>) -> Self {
        MergeAttributor {
            config,
            target: target.into(),
            candidates: OnceCell::new(),
        }
    }

    /// Attribute the `merged` parent of `merge`
    ///
    /// A live branch is a candidate when its history contains `merged` but
    /// not `merge`, and none of its source branches reached `merged` on
    /// their own. Sources that already contain `merge` hold `merged` only
    /// through it and are ignored. The candidate with the smallest history
    /// wins, ties going to repository order. With no candidate the merge
    /// message is read.
    ///
    /// Only per-tip ancestry sets are consulted, so attributing any number
    /// of merges adds no convergence cache entries.
    pub fn attribute(
        &self,
        session: &mut GraphSession<'_>,
        merge: CommitIdx,
        merged: CommitIdx,
    ) -> Option<MergedBranch> {
        let graph = session.graph();
        let candidates = self.candidates.get_or_init(|| self.collect_candidates(graph));
        let mut nearest: Option<(usize, &Candidate)> = None;

        for candidate in candidates {
            let reachable = session.reachable(candidate.tip);
            if !reachable.contains(merged) || reachable.contains(merge) {
                continue;
            }

            let inherited = candidate.sources.iter().any(|&source| {
                let from_source = session.reachable(source);
                from_source.contains(merged) && !from_source.contains(merge)
            });
            if inherited {
                continue;
            }

            let size = reachable.len();
            if nearest.map_or(true, |(best, _)| size < best) {
                nearest = Some((size, candidate));
            }
        }

        if let Some((size, candidate)) = nearest {
            debug!(merge = %graph.commit(merge).id, branch = %candidate.name, size, "attributed merge by ancestry");
            return Some(MergedBranch {
                name: candidate.name.clone(),
                config: candidate.config.clone(),
                attribution: Attribution::Ancestry,
            });
        }

        let parsed = MergeMessage::parse(&graph.commit(merge).message)?;
        let config = self.config.resolve(&parsed.source)?;
        debug!(merge = %graph.commit(merge).id, branch = %parsed.source, "attributed merge by message");
        Some(MergedBranch {
            name: parsed.source,
            config: config.clone(),
            attribution: Attribution::MergeMessage,
        })
    }

    fn collect_candidates(&self, graph: &CommitGraph) -> Vec<Candidate> {
        let target = friendly_name(&self.target);
        let mut candidates = Vec::new();

        for branch in graph.branches() {
            if branch.friendly_name() == target {
                continue;
            }
            let (Some(config), Some(tip)) = (self.config.resolve(&branch.name), graph.tip_of(branch))
            else {
                continue;
            };

            let sources = graph
                .branches()
                .iter()
                .filter(|source| {
                    source.name != branch.name
                        && config
                            .source_branches
                            .iter()
                            .any(|key| self.config.belongs_to(&source.name, key))
                })
                .filter_map(|source| graph.tip_of(source))
                .collect();

            candidates.push(Candidate {
                name: branch.name.clone(),
                config: config.clone(),
                tip,
                sources,
            });
        }

        candidates
    }
}

enum WalkState {
    Unvisited,
    Walking {
        chain: Vec<CommitIdx>,
        position: usize,
        pending: VecDeque<MainlineEvent>,
    },
    Done,
}

/// Oldest-to-newest events along the first-parent chain of a tip
///
/// The walk starts after `from` (or at the root when `from` is `None`) and
/// ends at `tip`. Order is the reverse of the first-parent chain: every
/// commit follows its parent, so commit timestamps are never consulted and
/// clock skew between authors cannot reorder the walk. A merge yields one [`MergeEvent`] per merged-in parent.
/// Attribution happens as events are pulled, and the walker is single pass:
/// once exhausted it keeps returning `None`.
pub struct MainlineWalker<'s, 'g, 'a> {
    session: &'s mut GraphSession<'g>,
    attributor: &'a MergeAttributor<'a>,
    from: Option<CommitIdx>,
    tip: CommitIdx,
    state: WalkState,
}

impl<'s, 'g, 'a> MainlineWalker<'s, 'g, 'a> {
    pub fn new(
        session: &'s mut GraphSession<'g>,
        attributor: &'a MergeAttributor<'a>,
        from: Option<CommitIdx>,
        tip: CommitIdx,
    ) -> Self {
        MainlineWalker {
            session,
            attributor,
            from,
            tip,
            state: WalkState::Unvisited,
        }
    }

    fn mainline_chain(&self) -> Vec<CommitIdx> {
        let mut chain: Vec<CommitIdx> = self
            .session
            .graph()
            .first_parent_chain(self.tip)
            .into_iter()
            .take_while(|idx| Some(*idx) != self.from)
            .collect();
        chain.reverse();
        chain
    }

    fn merge_events(&mut self, merge: CommitIdx) -> Vec<MainlineEvent> {
        let parents = self.session.graph().parents(merge);
        let mainline = parents[0];

        parents[1..]
            .iter()
            .map(|&merged| {
                let merged_commits = self
                    .session
                    .exclusive(merged, &ExclusionContext::single(mainline));
                let branch = self
                    .attributor
                    .attribute(self.session, merge, merged);
                MainlineEvent::Merge(MergeEvent {
                    merge,
                    mainline_parent: mainline,
                    merged_parent: merged,
                    branch,
                    merged_commits,
                })
            })
            .collect()
    }
}

impl Iterator for MainlineWalker<'_, '_, '_> {
    type Item = MainlineEvent;

    fn next(&mut self) -> Option<MainlineEvent> {
        loop {
            let idx = match &mut self.state {
                WalkState::Unvisited => {
                    let chain = self.mainline_chain();
                    self.state = WalkState::Walking {
                        chain,
                        position: 0,
                        pending: VecDeque::new(),
                    };
                    continue;
                }
                WalkState::Walking {
                    chain,
                    position,
                    pending,
                } => {
                    if let Some(event) = pending.pop_front() {
                        return Some(event);
                    }
                    match chain.get(*position) {
                        Some(idx) => {
                            *position += 1;
                            *idx
                        }
                        None => {
                            self.state = WalkState::Done;
                            return None;
                        }
                    }
                }
                WalkState::Done => return None,
            };

            if self.session.graph().parents(idx).len() < 2 {
                return Some(MainlineEvent::Commit(idx));
            }

            let events = self.merge_events(idx);
            if let WalkState::Walking { pending, .. } = &mut self.state {
                pending.extend(events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::Commit;
    use crate::git::MockRepository;
    use crate::graph::CommitGraph;
    use git2::Oid;

    fn describe(graph: &CommitGraph, events: &[MainlineEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| match event {
                MainlineEvent::Commit(idx) => graph.commit(*idx).message.clone(),
                MainlineEvent::Merge(merge) => format!(
                    "merge:{}",
                    merge.branch.as_ref().map(|b| b.name.as_str()).unwrap_or("?")
                ),
            })
            .collect()
    }

    fn walk(repo: &MockRepository, target: &str, from: Option<Oid>) -> Vec<String> {
        let graph = CommitGraph::load(repo).unwrap();
        let resolver = ConfigResolver::new(&Config::default()).unwrap();
        let attributor = MergeAttributor::new(&resolver, target);
        let tip = graph.tip_of(graph.branch(target).unwrap()).unwrap();
        let from = from.and_then(|id| graph.idx_of(id));

        let mut session = GraphSession::new(&graph);
        let events: Vec<MainlineEvent> =
            MainlineWalker::new(&mut session, &attributor, from, tip).collect();
        describe(&graph, &events)
    }

    #[test]
    fn test_walks_oldest_first_including_root() {
        let mut repo = MockRepository::new();
        repo.commit("one");
        repo.commit("two");
        repo.commit("three");

        assert_eq!(walk(&repo, "main", None), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_from_is_excluded() {
        let mut repo = MockRepository::new();
        repo.commit("one");
        let two = repo.commit("two");
        repo.commit("three");

        assert_eq!(walk(&repo, "main", Some(two)), vec!["three"]);
    }

    #[test]
    fn test_merge_attributed_by_ancestry() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        repo.commit("d1");
        repo.branch("feature/a");
        repo.commit("f1");
        repo.checkout("develop");
        repo.merge("feature/a");

        assert_eq!(
            walk(&repo, "develop", None),
            vec!["root", "d1", "merge:feature/a"]
        );
    }

    #[test]
    fn test_nearest_branch_wins() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        repo.branch("feature/long");
        repo.commit("f1");
        repo.branch("feature/short");
        repo.checkout("feature/long");
        repo.commit("f2");
        repo.checkout("develop");
        repo.merge_with_message("feature/short", "integrate");

        // Both contain f1; feature/long is listed first but moved past it
        assert_eq!(
            walk(&repo, "develop", None),
            vec!["root", "merge:feature/short"]
        );
    }

    #[test]
    fn test_branch_forked_from_merged_source_is_not_attributed() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        repo.commit("d1");
        repo.commit("d2");
        repo.branch("feature/late");
        repo.commit("f1");
        repo.checkout("main");
        repo.merge_with_message("develop", "release");
        repo.checkout("develop");
        repo.commit("d3");
        repo.commit("d4");

        // feature/late has the smaller history but only holds d2 through develop
        assert_eq!(walk(&repo, "main", None), vec!["root", "merge:develop"]);
    }

    #[test]
    fn test_attribution_adds_no_convergence_entries() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        repo.commit("d1");
        for name in ["feature/a", "feature/b", "feature/c"] {
            repo.checkout("develop");
            repo.branch(name);
            repo.commit(name);
        }
        repo.checkout("main");
        repo.merge("develop");

        let graph = CommitGraph::load(&repo).unwrap();
        let resolver = ConfigResolver::new(&Config::default()).unwrap();
        let attributor = MergeAttributor::new(&resolver, "main");
        let tip = graph.tip_of(graph.branch("main").unwrap()).unwrap();
        let mut session = GraphSession::new(&graph);

        let events: Vec<MainlineEvent> =
            MainlineWalker::new(&mut session, &attributor, None, tip).collect();
        assert_eq!(describe(&graph, &events), vec!["root", "merge:develop"]);
        // Only the merged commits of the one merge are cached
        assert_eq!(session.convergence().len(), 1);
    }

    #[test]
    fn test_merge_message_fallback_after_branch_deleted() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        repo.branch("hotfix/crash");
        repo.commit("fix");
        repo.checkout("develop");
        repo.merge("hotfix/crash");
        repo.delete_branch("hotfix/crash");

        let graph = CommitGraph::load(&repo).unwrap();
        let resolver = ConfigResolver::new(&Config::default()).unwrap();
        let attributor = MergeAttributor::new(&resolver, "develop");
        let tip = graph.tip_of(graph.branch("develop").unwrap()).unwrap();
        let mut session = GraphSession::new(&graph);

        let merge = MainlineWalker::new(&mut session, &attributor, None, tip)
            .find_map(|event| match event {
                MainlineEvent::Merge(merge) => Some(merge),
                MainlineEvent::Commit(_) => None,
            })
            .unwrap();

        let branch = merge.branch.unwrap();
        assert_eq!(branch.name, "hotfix/crash");
        assert_eq!(branch.config.key, "hotfix");
        assert_eq!(branch.attribution, Attribution::MergeMessage);
        assert_eq!(merge.merged_commits.len(), 1);
    }

    #[test]
    fn test_unattributable_merge_has_no_branch() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        repo.branch("topic");
        repo.commit("work");
        repo.checkout("develop");
        repo.merge_with_message("topic", "squash it all");
        repo.delete_branch("topic");

        assert_eq!(walk(&repo, "develop", None), vec!["root", "merge:?"]);
    }

    #[test]
    fn test_octopus_merge_yields_event_per_parent() {
        let mut repo = MockRepository::new();
        let root = repo.commit("root");
        repo.branch("feature/a");
        let a = repo.commit("a");
        repo.checkout("main");
        repo.branch("feature/b");
        let b = repo.commit("b");

        let octopus = repo.next_oid();
        repo.add_commit(Commit::new(octopus, vec![root, a, b], 0, "octopus"));
        repo.set_branch_head("main", octopus);

        assert_eq!(
            walk(&repo, "main", None),
            vec!["root", "merge:feature/a", "merge:feature/b"]
        );
    }

    #[test]
    fn test_exhausted_walker_stays_done() {
        let mut repo = MockRepository::new();
        repo.commit("only");

        let graph = CommitGraph::load(&repo).unwrap();
        let resolver = ConfigResolver::new(&Config::default()).unwrap();
        let attributor = MergeAttributor::new(&resolver, "main");
        let tip = graph.tip_of(graph.branch("main").unwrap()).unwrap();
        let mut session = GraphSession::new(&graph);
        let mut walker = MainlineWalker::new(&mut session, &attributor, None, tip);

        assert!(matches!(walker.next(), Some(MainlineEvent::Commit(_))));
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }
}
