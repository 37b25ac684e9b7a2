use chrono::{DateTime, FixedOffset};
use std::path::PathBuf;

/// Git commit information, as read from a repository's history
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub id: String,
    pub author: Author,
    pub authored: Timestamp,
    pub committed: Timestamp,
    pub parents: Vec<String>,
}

impl Commit {
    /// Abbreviated commit id (first 8 hex characters)
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// A linear commit has exactly one parent; only those are diffed
    pub fn is_linear(&self) -> bool {
        self.parents.len() == 1
    }
}

/// Commit author information
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Commit timestamp (Unix timestamp with timezone offset in minutes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub offset_minutes: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, offset_minutes: i32) -> Self {
        Self {
            seconds,
            offset_minutes,
        }
    }

    /// The instant in the timezone the commit was recorded in
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.offset_minutes * 60)?;
        DateTime::from_timestamp(self.seconds, 0).map(|utc| utc.with_timezone(&offset))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%dT%H:%M")),
            None => write!(f, "{}", self.seconds),
        }
    }
}

/// A commit whose introduced change matched the pattern
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub commit: Commit,
    pub repository: String,
}

/// Result of scanning one repository: its matches in history-walk order, or
/// the error that ended the walk
pub type ScanOutcome = crate::error::Result<Vec<MatchRecord>>;

/// All matches of one repository
#[derive(Debug, Clone, PartialEq)]
pub struct RepoMatches {
    pub name: String,
    pub path: PathBuf,
    pub matches: Vec<MatchRecord>,
}

/// A directory entry that could not be opened as a repository
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub name: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Aggregate of a successful run, repositories in discovery order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    pub repositories: Vec<RepoMatches>,
    pub skipped: Vec<SkippedEntry>,
}

impl RunReport {
    /// Every match, grouped by repository in discovery order
    pub fn matches(&self) -> impl Iterator<Item = &MatchRecord> {
        self.repositories.iter().flat_map(|repo| repo.matches.iter())
    }

    pub fn match_count(&self) -> usize {
        self.repositories.iter().map(|repo| repo.matches.len()).sum()
    }
}
