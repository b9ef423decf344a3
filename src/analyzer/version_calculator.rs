use crate::analyzer::VersionAccumulator;
use crate::boundary::BoundaryWarning;
use crate::config::{ConfigResolver, EffectiveBranchConfig};
use crate::domain::Version;
use crate::error::{MainlineError, Result};
use crate::graph::{
    CommitGraph, CommitIdx, Divergence, DivergenceResolver, GraphSession, MainlineEvent,
    MainlineWalker, MergeAttributor,
};
use git2::Oid;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

/// Outcome of one version calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionResult {
    pub version: Version,
    pub branch: String,
    pub sha: Oid,
    /// Tag the version was counted from, if any
    pub version_source_tag: Option<String>,
    pub version_source_sha: Option<Oid>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Flat, serializable view of a [`VersionResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionVariables {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub major_minor_patch: String,
    pub sem_ver: String,
    pub commits_since_version_source: u64,
    pub branch_name: String,
    pub sha: String,
    pub version_source_tag: Option<String>,
    pub version_source_sha: Option<String>,
    pub warnings: Vec<String>,
}

impl VersionResult {
    pub fn variables(&self) -> VersionVariables {
        VersionVariables {
            major: self.version.major,
            minor: self.version.minor,
            patch: self.version.patch,
            major_minor_patch: self.version.to_string(),
            sem_ver: self.version.to_string(),
            commits_since_version_source: self.version.commits_since_source,
            branch_name: self.branch.clone(),
            sha: self.sha.to_string(),
            version_source_tag: self.version_source_tag.clone(),
            version_source_sha: self.version_source_sha.map(|id| id.to_string()),
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Serialize for VersionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.variables().serialize(serializer)
    }
}

/// Version of one commit as seen by one branch configuration
struct Calculated {
    version: Version,
    source_tag: Option<String>,
    source: Option<CommitIdx>,
}

struct NearestTag {
    position: usize,
    commit: CommitIdx,
    name: String,
    version: Version,
}

/// Calculates mainline versions over one graph snapshot
///
/// The calculator owns the run's memo tables; calculating several branches
/// with the same calculator shares them.
pub struct VersionCalculator<'g, 'c> {
    session: GraphSession<'g>,
    config: &'c ConfigResolver,
    warnings: Vec<BoundaryWarning>,
}

impl<'g, 'c> VersionCalculator<'g, 'c> {
    pub fn new(graph: &'g CommitGraph, config: &'c ConfigResolver) -> Self {
        VersionCalculator {
            session: GraphSession::new(graph),
            config,
            warnings: Vec::new(),
        }
    }

    pub fn session(&self) -> &GraphSession<'g> {
        &self.session
    }

    /// Calculate the version of a branch tip
    ///
    /// # Returns
    /// * `Ok(VersionResult)` - The version plus any non-fatal warnings
    /// * `Err(BranchNotFound)` - If the branch is not in the graph
    /// * `Err(Config)` - If no configured branch matches its name
    pub fn calculate(&mut self, branch_name: &str) -> Result<VersionResult> {
        let config = self.config;
        let graph = self.session.graph();

        let branch = graph
            .branch(branch_name)
            .ok_or_else(|| MainlineError::branch_not_found(branch_name))?;
        let owner = config.resolve(&branch.name).ok_or_else(|| {
            MainlineError::config(format!(
                "Branch '{}' matches no configured branch",
                branch.name
            ))
        })?;
        let tip = graph
            .tip_of(branch)
            .ok_or_else(|| MainlineError::branch_not_found(branch_name))?;

        let mut stack = Vec::new();
        let calculated = self.version_at(&branch.name, owner, tip, &mut stack)?;

        let result = VersionResult {
            version: calculated.version,
            branch: branch.name.clone(),
            sha: branch.tip,
            version_source_tag: calculated.source_tag,
            version_source_sha: calculated.source.map(|idx| graph.commit(idx).id),
            warnings: std::mem::take(&mut self.warnings),
        };

        info!(
            branch = %result.branch,
            key = %owner.key,
            version = %result.version,
            commits = result.version.commits_since_source,
            warnings = result.warnings.len(),
            "calculated version"
        );
        Ok(result)
    }

    fn version_at(
        &mut self,
        branch: &str,
        owner: &EffectiveBranchConfig,
        commit: CommitIdx,
        stack: &mut Vec<String>,
    ) -> Result<Calculated> {
        let config = self.config;
        let graph = self.session.graph();
        let chain = graph.first_parent_chain(commit);
        let tag = self.nearest_tag(&chain);

        let divergence = if stack.contains(&owner.key) {
            self.warn(BoundaryWarning::ConfigurationCycle {
                branch: branch.to_string(),
            });
            None
        } else {
            Some(DivergenceResolver::new(config).resolve(&mut self.session, branch, commit, owner))
        };

        let divergence_position = match &divergence {
            Some(Divergence::Source {
                point: Some(point), ..
            }) => chain.iter().position(|idx| idx == point),
            _ => None,
        };

        let tag = tag.filter(|tag| {
            divergence_position.map_or(true, |position| tag.position <= position)
        });

        let (base, from) = if let Some(tag) = tag {
            debug!(branch, tag = %tag.name, version = %tag.version, "counting from tag");
            let base = Calculated {
                version: tag.version,
                source_tag: Some(tag.name),
                source: Some(tag.commit),
            };
            (base, Some(tag.commit))
        } else {
            match divergence {
                Some(Divergence::Source {
                    branch: source,
                    key,
                    point: Some(point),
                }) => {
                    let source_config = config.by_key(&key).ok_or_else(|| {
                        MainlineError::config(format!("Unknown source branch key '{}'", key))
                    })?;

                    stack.push(owner.key.clone());
                    let base = self.version_at(&source, source_config, point, stack);
                    stack.pop();

                    let base = base?;
                    debug!(branch, source = %source, version = %base.version, "counting from source branch");
                    (base, Some(point))
                }
                other => {
                    if let Some(Divergence::Unresolved { sources }) = other {
                        self.warn(BoundaryWarning::NoDivergenceSource {
                            branch: branch.to_string(),
                            sources,
                        });
                    }
                    let base = Calculated {
                        version: config.fallback_version(),
                        source_tag: None,
                        source: chain.last().copied(),
                    };
                    (base, None)
                }
            }
        };

        let attributor = MergeAttributor::new(config, branch);
        let mut accumulator = VersionAccumulator::new(
            base.version,
            owner,
            config.directives(),
            config.message_incrementing(),
        );

        let walker = MainlineWalker::new(&mut self.session, &attributor, from, commit);
        let mut unattributed = Vec::new();
        for event in walker {
            if let MainlineEvent::Merge(merge) = &event {
                if merge.branch.is_none() {
                    unattributed.push(BoundaryWarning::AmbiguousMergeAttribution {
                        merge: graph.commit(merge.merge).id,
                        parent: graph.commit(merge.merged_parent).id,
                    });
                }
            }
            accumulator.apply(graph, &event);
        }
        for warning in unattributed {
            self.warn(warning);
        }

        Ok(Calculated {
            version: accumulator.finish(),
            ..base
        })
    }

    /// Closest commit on `chain` carrying a version tag
    ///
    /// Several version tags on one commit resolve to the highest.
    fn nearest_tag(&mut self, chain: &[CommitIdx]) -> Option<NearestTag> {
        let graph = self.session.graph();
        let prefix = self.config.tag_prefix();

        for (position, &commit) in chain.iter().enumerate() {
            let mut best: Option<NearestTag> = None;

            for tag in graph.tags_at(commit) {
                match prefix.parse_version(tag) {
                    Ok(version) => {
                        if best
                            .as_ref()
                            .map_or(true, |b| version.triple() > b.version.triple())
                        {
                            best = Some(NearestTag {
                                position,
                                commit,
                                name: tag.name.clone(),
                                version,
                            });
                        }
                    }
                    Err(e) => self.warn(BoundaryWarning::UnparsableTag {
                        tag: tag.name.clone(),
                        reason: e.to_string(),
                    }),
                }
            }

            if best.is_some() {
                return best;
            }
        }

        None
    }

    fn warn(&mut self, warning: BoundaryWarning) {
        if self.warnings.contains(&warning) {
            return;
        }
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}
