//! Repository reading abstraction layer
//!
//! This module provides a trait-based abstraction over the read-only git
//! operations the version calculation needs, allowing for multiple
//! implementations including real git repositories and in-memory mocks.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! # Usage
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations. The calculation engine never talks to a repository
//! directly; it reads one snapshot through
//! [CommitGraph::load](crate::graph::CommitGraph::load).
//!
//! ```rust
//! # use git_mainline::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! for branch in repo.list_branches()? {
//!     let tip = repo.get_commit(branch.tip)?;
//!     println!("{} -> {:?}", branch.name, tip.map(|c| c.message));
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::Commit;
use crate::error::Result;
use git2::Oid;

/// A branch as listed by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    pub name: String,
    pub tip: Oid,
}

/// A tag as listed by the repository, peeled to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub target: Oid,
}

/// Read-only repository access
///
/// Implementations must present a consistent snapshot for the duration of
/// one calculation.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations should map
/// underlying errors (like `git2::Error`) to
/// [crate::error::MainlineError] variants.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): In-memory implementation for tests
pub trait Repository {
    /// List branches in a stable order
    ///
    /// The order is used as the final tie-break when several branches are
    /// equally good candidates, so it must not change within a run.
    fn list_branches(&self) -> Result<Vec<BranchRef>>;

    /// List tags with their peeled commit targets
    ///
    /// Tags pointing at anything other than a commit are skipped.
    fn list_tags(&self) -> Result<Vec<TagRef>>;

    /// Look up a commit
    ///
    /// # Returns
    /// * `Ok(Some(Commit))` - The commit with its ordered parents
    /// * `Ok(None)` - If no such commit exists (e.g. a shallow clone boundary)
    /// * `Err` - If the repository could not be read
    fn get_commit(&self, id: Oid) -> Result<Option<Commit>>;

    /// Name of the checked-out branch, if HEAD points at one
    fn head_branch(&self) -> Result<Option<String>>;
}
