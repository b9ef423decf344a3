use super::{CommitGraph, CommitIdx, ExclusionContext, ExclusiveCommits, GraphSession};
use crate::config::{ConfigResolver, EffectiveBranchConfig};
use crate::domain::branch::friendly_name;
use crate::domain::Branch;
use tracing::debug;

/// Where a branch's own history starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// Main-line branches have no source; their whole history is their own
    MainLine,
    /// The branch left `branch` (configured as `key`) at `point`
    ///
    /// `point` is `None` when the two histories share no commit.
    Source {
        branch: String,
        key: String,
        point: Option<CommitIdx>,
    },
    /// None of the configured source keys matches a branch in the repository
    Unresolved { sources: Vec<String> },
}

struct Candidate<'g, 'k> {
    branch: &'g Branch,
    key: &'k str,
    tip: CommitIdx,
}

/// Finds the commit at which a branch left its configured source
pub struct DivergenceResolver<'c> {
    config: &'c ConfigResolver,
}

impl<'c> DivergenceResolver<'c> {
    pub fn new(config: &'c ConfigResolver) -> Self {
        DivergenceResolver { config }
    }

    /// Resolve the divergence of `target`, whose history ends at `tip`
    ///
    /// Candidates are tried in configuration order. The first one against
    /// which the target has exclusive commits is selected; when the target
    /// has nothing of its own against any of them, the first candidate is.
    pub fn resolve(
        &self,
        session: &mut GraphSession<'_>,
        target: &str,
        tip: CommitIdx,
        owner: &EffectiveBranchConfig,
    ) -> Divergence {
        if owner.is_main_line {
            return Divergence::MainLine;
        }

        let graph = session.graph();
        let candidates = self.candidates(graph, target, owner);
        let Some(first) = candidates.first() else {
            debug!(branch = target, sources = ?owner.source_branches, "no source branch in repository");
            return Divergence::Unresolved {
                sources: owner.source_branches.clone(),
            };
        };

        let mut selected = None;
        for candidate in &candidates {
            let exclusive = session.exclusive(tip, &ExclusionContext::single(candidate.tip));
            if !exclusive.is_empty() {
                selected = Some((candidate, exclusive));
                break;
            }
        }

        let (source, exclusive) = match selected {
            Some(found) => found,
            None => (first, session.exclusive(tip, &ExclusionContext::single(first.tip))),
        };

        let point = divergence_point(graph, tip, &exclusive);
        debug!(
            branch = target,
            source = %source.branch.name,
            key = source.key,
            exclusive = exclusive.len(),
            point = ?point.map(|idx| graph.commit(idx).id),
            "resolved divergence"
        );

        Divergence::Source {
            branch: source.branch.name.clone(),
            key: source.key.to_string(),
            point,
        }
    }

    fn candidates<'g, 'k>(
        &self,
        graph: &'g CommitGraph,
        target: &str,
        owner: &'k EffectiveBranchConfig,
    ) -> Vec<Candidate<'g, 'k>> {
        let target = friendly_name(target);
        let mut candidates: Vec<Candidate<'g, 'k>> = Vec::new();

        for key in &owner.source_branches {
            for branch in graph.branches() {
                if branch.friendly_name() == target
                    || !self.config.belongs_to(&branch.name, key)
                    || candidates.iter().any(|c| c.branch.name == branch.name)
                {
                    continue;
                }
                if let Some(tip) = graph.tip_of(branch) {
                    candidates.push(Candidate {
                        branch,
                        key: key.as_str(),
                        tip,
                    });
                }
            }
        }

        candidates
    }
}

/// First commit on the first-parent chain from `tip` that is not exclusive
///
/// An empty exclusive set makes `tip` itself the point. `None` means the
/// chain reached a root without leaving the exclusive set.
pub fn divergence_point(
    graph: &CommitGraph,
    tip: CommitIdx,
    exclusive: &ExclusiveCommits,
) -> Option<CommitIdx> {
    let mut current = Some(tip);
    let mut steps = 0;

    while let Some(idx) = current {
        if !exclusive.contains(idx) {
            return Some(idx);
        }
        steps += 1;
        if steps > exclusive.len() {
            break;
        }
        current = graph.first_parent(idx);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BranchConfig, Config};
    use crate::domain::{Commit, IncrementStrategy};
    use crate::git::MockRepository;
    use git2::Oid;

    fn resolve(repo: &MockRepository, config: &Config, target: &str) -> (CommitGraph, Divergence) {
        let graph = CommitGraph::load(repo).unwrap();
        let divergence = {
            let resolver = ConfigResolver::new(config).unwrap();
            let owner = resolver.resolve(target).unwrap().clone();
            let tip = graph.tip_of(graph.branch(target).unwrap()).unwrap();
            let mut session = GraphSession::new(&graph);
            DivergenceResolver::new(&resolver).resolve(&mut session, target, tip, &owner)
        };
        (graph, divergence)
    }

    fn point_of(graph: &CommitGraph, divergence: &Divergence) -> Option<Oid> {
        match divergence {
            Divergence::Source { point, .. } => point.map(|idx| graph.commit(idx).id),
            other => panic!("expected a source, got {:?}", other),
        }
    }

    #[test]
    fn test_main_line_has_no_source() {
        let mut repo = MockRepository::new();
        repo.commit("root");

        let (_, divergence) = resolve(&repo, &Config::default(), "main");
        assert_eq!(divergence, Divergence::MainLine);
    }

    #[test]
    fn test_develop_diverges_from_main() {
        let mut repo = MockRepository::new();
        let root = repo.commit("root");
        repo.branch("develop");
        repo.commit("d1");
        repo.commit("d2");

        let (graph, divergence) = resolve(&repo, &Config::default(), "develop");
        assert_eq!(point_of(&graph, &divergence), Some(root));
        match divergence {
            Divergence::Source { branch, key, .. } => {
                assert_eq!(branch, "main");
                assert_eq!(key, "main");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_priority_order_beats_recency() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        let d1 = repo.commit("d1");
        repo.branch("feature/x");
        repo.commit("f1");
        // main moves on later, it is still lower priority
        repo.checkout("main");
        repo.commit("m2");

        let (graph, divergence) = resolve(&repo, &Config::default(), "feature/x");
        assert_eq!(point_of(&graph, &divergence), Some(d1));
        match divergence {
            Divergence::Source { branch, .. } => assert_eq!(branch, "develop"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_branch_without_own_commits_diverges_at_tip() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        let d1 = repo.commit("d1");
        repo.checkout("main");
        repo.commit("m2");
        repo.checkout("develop");
        repo.branch("release/1.0");

        let config = Config {
            branches: vec![
                BranchConfig {
                    key: "main".to_string(),
                    regex: "^main$".to_string(),
                    increment: IncrementStrategy::Patch,
                    is_main_line: true,
                    source_branches: vec![],
                    commit_increment: None,
                },
                BranchConfig {
                    key: "develop".to_string(),
                    regex: "^develop$".to_string(),
                    increment: IncrementStrategy::Minor,
                    is_main_line: false,
                    source_branches: vec!["main".to_string()],
                    commit_increment: None,
                },
                BranchConfig {
                    key: "release".to_string(),
                    regex: "^release/".to_string(),
                    increment: IncrementStrategy::None,
                    is_main_line: false,
                    source_branches: vec!["develop".to_string()],
                    commit_increment: None,
                },
            ],
            ..Config::default()
        };

        let (graph, divergence) = resolve(&repo, &config, "release/1.0");
        assert_eq!(point_of(&graph, &divergence), Some(d1));
    }

    #[test]
    fn test_all_empty_selects_first_candidate() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("develop");
        repo.commit("d1");
        repo.branch("hotfix/1");
        repo.checkout("develop");
        repo.commit("d2");

        // develop moved on, so the hotfix has nothing of its own against it
        let mut config = Config::default();
        config.branches[4].source_branches = vec!["develop".to_string()];
        let (graph, divergence) = resolve(&repo, &config, "hotfix/1");
        match &divergence {
            Divergence::Source { branch, .. } => assert_eq!(branch, "develop"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(point_of(&graph, &divergence), repo.tip("hotfix/1"));
    }

    #[test]
    fn test_missing_sources_are_unresolved() {
        let mut repo = MockRepository::new();
        repo.commit("root");
        repo.branch("feature/x");
        repo.commit("f1");
        repo.delete_branch("main");

        let (_, divergence) = resolve(&repo, &Config::default(), "feature/x");
        assert_eq!(
            divergence,
            Divergence::Unresolved {
                sources: vec![
                    "develop".to_string(),
                    "main".to_string(),
                    "release".to_string()
                ]
            }
        );
    }

    #[test]
    fn test_disjoint_histories_have_no_point() {
        let mut repo = MockRepository::new();
        let a = Oid::from_bytes(&[1; 20]).unwrap();
        let b = Oid::from_bytes(&[2; 20]).unwrap();
        repo.add_commit(Commit::new(a, vec![], 0, "main root"));
        repo.add_commit(Commit::new(b, vec![], 1, "develop root"));
        repo.set_branch_head("main", a);
        repo.set_branch_head("develop", b);

        let (graph, divergence) = resolve(&repo, &Config::default(), "develop");
        assert_eq!(point_of(&graph, &divergence), None);
    }
}
