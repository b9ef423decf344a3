use git_mainline::analyzer::VersionCalculator;
use git_mainline::config::{Config, ConfigResolver};
use git_mainline::git::MockRepository;
use git_mainline::graph::{CommitGraph, CommitIdx, ExclusionContext, GraphSession};
use std::rc::Rc;

const BRANCHES: usize = 500;
const DEPTH: usize = 3;

/// BRANCHES feature branches of DEPTH commits each, all forked from one root
fn fan_out() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.commit("shared ancestor");
    for i in 0..BRANCHES {
        repo.checkout("main");
        repo.branch(&format!("feature/{}", i));
        for d in 0..DEPTH {
            repo.commit(&format!("feature {} commit {}", i, d));
        }
    }
    repo
}

fn tips(graph: &CommitGraph) -> Vec<CommitIdx> {
    graph
        .branches()
        .iter()
        .filter(|b| b.name.starts_with("feature/"))
        .map(|b| graph.tip_of(b).unwrap())
        .collect()
}

#[test]
fn test_each_exclusive_set_is_computed_once() {
    let repo = fan_out();
    let graph = CommitGraph::load(&repo).unwrap();
    let root = graph.tip_of(graph.branch("main").unwrap()).unwrap();
    let tips = tips(&graph);
    assert_eq!(tips.len(), BRANCHES);

    let mut session = GraphSession::new(&graph);
    let context = ExclusionContext::single(root);

    let first: Vec<_> = tips.iter().map(|t| session.exclusive(*t, &context)).collect();
    let second: Vec<_> = tips.iter().map(|t| session.exclusive(*t, &context)).collect();

    assert!(first.iter().zip(&second).all(|(a, b)| Rc::ptr_eq(a, b)));
    assert_eq!(session.convergence().computations(), BRANCHES);
    assert_eq!(session.convergence().len(), BRANCHES);
    // The shared context's ancestry is built once and reused
    assert_eq!(session.ancestry().computations(), 1);

    let total: usize = first.iter().map(|set| set.len()).sum();
    assert_eq!(total, BRANCHES * DEPTH);
}

#[test]
fn test_context_order_does_not_create_new_entries() {
    let repo = fan_out();
    let graph = CommitGraph::load(&repo).unwrap();
    let tips = tips(&graph);
    let mut session = GraphSession::new(&graph);

    let (a, b, c) = (tips[0], tips[1], tips[2]);
    let forward = session.exclusive(a, &ExclusionContext::new([b, c]));
    let backward = session.exclusive(a, &ExclusionContext::new([c, b, c]));

    assert!(Rc::ptr_eq(&forward, &backward));
    assert_eq!(forward.len(), DEPTH);
    assert_eq!(session.convergence().computations(), 1);
}

#[test]
fn test_every_pair_against_its_neighbour() {
    let repo = fan_out();
    let graph = CommitGraph::load(&repo).unwrap();
    let tips = tips(&graph);
    let mut session = GraphSession::new(&graph);

    for pair in tips.windows(2) {
        let exclusive = session.exclusive(pair[0], &ExclusionContext::single(pair[1]));
        assert_eq!(exclusive.len(), DEPTH);
    }

    // One ancestry per distinct excluded tip
    assert_eq!(session.ancestry().len(), BRANCHES - 1);
    assert_eq!(session.convergence().computations(), BRANCHES - 1);
}

#[test]
fn test_develop_with_many_merged_features() {
    let mut repo = MockRepository::new();
    repo.commit("root");
    repo.branch("develop");
    repo.commit("develop work");
    for i in 0..BRANCHES {
        let name = format!("feature/{}", i);
        repo.checkout("develop");
        repo.branch(&name);
        repo.commit(&format!("feature {}", i));
        repo.checkout("develop");
        repo.merge(&name);
    }

    let graph = CommitGraph::load(&repo).unwrap();
    let resolver = ConfigResolver::new(&Config::default()).unwrap();
    let mut calculator = VersionCalculator::new(&graph, &resolver);
    let result = calculator.calculate("develop").unwrap();

    assert_eq!(result.version.to_string(), format!("0.{}.0", BRANCHES));
    assert_eq!(result.version.commits_since_source, 2);
    assert!(result.warnings.is_empty());

    let session = calculator.session();
    assert!(session.convergence().computations() <= 3 * BRANCHES);
    assert!(session.ancestry().len() <= graph.len());
}

const RELEASES: usize = 30;
const COMMITS_PER_RELEASE: usize = 10;
const FEATURES_PER_RELEASE: usize = 15;

/// develop released into main repeatedly while every feature stays alive
fn release_flow() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.commit("root");
    repo.branch("develop");
    for r in 0..RELEASES {
        repo.checkout("develop");
        for c in 0..COMMITS_PER_RELEASE {
            repo.commit(&format!("release {} work {}", r, c));
        }
        for f in 0..FEATURES_PER_RELEASE {
            repo.checkout("develop");
            repo.branch(&format!("feature/{}-{}", r, f));
            repo.commit(&format!("feature {}-{}", r, f));
        }
        repo.checkout("main");
        repo.merge("develop");
    }
    repo
}

#[test]
fn test_release_merges_with_many_live_branches_stay_linear() {
    let repo = release_flow();
    let graph = CommitGraph::load(&repo).unwrap();
    assert_eq!(graph.branches().len(), 2 + RELEASES * FEATURES_PER_RELEASE);

    let resolver = ConfigResolver::new(&Config::default()).unwrap();
    let mut calculator = VersionCalculator::new(&graph, &resolver);
    let result = calculator.calculate("main").unwrap();

    // Every release merge is attributed to develop, never to a feature forked from it
    assert_eq!(result.version.to_string(), format!("0.{}.0", RELEASES));
    assert!(result.warnings.is_empty());

    let session = calculator.session();
    // One cached set per merge, holding only that release's commits
    assert_eq!(session.convergence().len(), RELEASES);
    assert_eq!(session.convergence().computations(), RELEASES);
    // Ancestry is kept per branch tip and per mainline parent, not per merge and branch
    assert!(session.ancestry().len() <= graph.branches().len() + RELEASES);
}
