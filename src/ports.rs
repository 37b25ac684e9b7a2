//! Seams between the scan engine and the version-control layer.
//!
//! The scanner and coordinator only talk to these traits; `crate::git`
//! provides the git2-backed implementations.

use crate::domain::Commit;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Lazily produced sequence of items that may each fail
pub type FallibleIter<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// Read access to one opened repository's history
///
/// A handle is owned by exactly one scan task, so implementations only need
/// to be `Send`.
pub trait History: Send {
    /// Commits reachable from HEAD, newest committer time first.
    /// A repository without commits yields an empty sequence.
    fn commits(&self) -> Result<FallibleIter<'_, Commit>>;

    /// Resolve a commit by its full id
    fn find_commit(&self, id: &str) -> Result<Commit>;

    /// Patch text of every path changed between `parent` and `child`, one
    /// item per path, in diff order
    fn patches(&self, parent: &Commit, child: &Commit) -> Result<FallibleIter<'_, String>>;
}

/// Opens a directory as a repository
pub trait RepoOpener: Send + Sync {
    type Repo: History + 'static;

    fn open(&self, path: &Path) -> Result<Self::Repo>;
}

/// Clock abstraction for testability
pub trait Clock: Send + Sync {
    /// Get the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
