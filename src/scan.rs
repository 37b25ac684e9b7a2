use crate::bounds::BoundPolicy;
use crate::domain::{MatchRecord, RepoMatches, RunReport, ScanOutcome, SkippedEntry};
use crate::error::{Result, ScanError};
use crate::ports::RepoOpener;
use crate::scanner::scan_repository;
use crossbeam_channel::RecvError;
use regex::Regex;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// An opened repository, owned by exactly one scan task
pub struct RepositoryHandle<R> {
    pub name: String,
    pub path: PathBuf,
    pub history: R,
}

impl<R> fmt::Display for RepositoryHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Repositories found under a root directory, in file-name order
pub struct Discovery<R> {
    pub repositories: Vec<RepositoryHandle<R>>,
    pub skipped: Vec<SkippedEntry>,
}

/// Message from a scan task back to the coordinator
#[derive(Debug)]
struct TaskReport {
    index: usize,
    outcome: ScanOutcome,
}

/// Phases of a run, logged as the coordinator moves through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Discovering,
    Scanning { in_flight: usize },
    Aggregating,
    Succeeded,
    Failed,
}

/// Open every immediate subdirectory of `base_path` as a repository.
///
/// Entries that are not directories are ignored; directories that fail to
/// open are logged and recorded as skipped. Only an unreadable `base_path`
/// is an error.
pub fn discover<O: RepoOpener>(opener: &O, base_path: &Path) -> Result<Discovery<O::Repo>> {
    let mut repositories = Vec::new();
    let mut skipped = Vec::new();

    for entry in WalkDir::new(base_path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ScanError::Discovery {
            path: base_path.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let name = entry.file_name().to_string_lossy().to_string();
        match opener.open(&path) {
            Ok(history) => repositories.push(RepositoryHandle {
                name,
                path,
                history,
            }),
            Err(e) => {
                warn!("Skipping {}: {:#}", name, e);
                skipped.push(SkippedEntry {
                    name,
                    path,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(Discovery {
        repositories,
        skipped,
    })
}

/// Fans repository scans out to a worker pool and collects their outcomes
///
/// The first failing repository fails the whole run; matches already
/// collected from other repositories are discarded.
#[derive(Debug, Clone)]
pub struct Coordinator<O> {
    opener: O,
    bounds: BoundPolicy,
    jobs: Option<NonZeroUsize>,
}

impl<O: RepoOpener> Coordinator<O> {
    pub fn new(opener: O, bounds: BoundPolicy) -> Self {
        Self {
            opener,
            bounds,
            jobs: None,
        }
    }

    /// Cap the number of repositories scanned at once (default: available parallelism)
    pub fn with_jobs(mut self, jobs: NonZeroUsize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn run(&self, regex: &Regex, root: &Path) -> Result<RunReport> {
        debug!("Run phase: {:?}", RunPhase::Discovering);
        let discovery = discover(&self.opener, root)?;
        info!(
            "Discovered {} repositories under {} ({} skipped)",
            discovery.repositories.len(),
            root.display(),
            discovery.skipped.len()
        );

        let repositories = match self.scan_all(regex, discovery.repositories) {
            Ok(repositories) => repositories,
            Err(e) => {
                debug!("Run phase: {:?}", RunPhase::Failed);
                return Err(e);
            }
        };

        let report = RunReport {
            repositories,
            skipped: discovery.skipped,
        };
        info!(
            "Scanned {} repositories, {} matches",
            report.repositories.len(),
            report.match_count()
        );
        debug!("Run phase: {:?}", RunPhase::Succeeded);
        Ok(report)
    }

    fn worker_count(&self, tasks: usize) -> usize {
        let jobs = self
            .jobs
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get);
        jobs.min(tasks).max(1)
    }

    /// Scan every repository and return their matches in discovery order
    fn scan_all(
        &self,
        regex: &Regex,
        repositories: Vec<RepositoryHandle<O::Repo>>,
    ) -> Result<Vec<RepoMatches>> {
        let total = repositories.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.worker_count(total);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("histgrep-scan-{}", i))
            .panic_handler(|_| error!("A scan task panicked"))
            .build()
            .map_err(|source| ScanError::WorkerPool { source })?;

        // Sized so that no task ever blocks on delivery
        let (tx, rx) = crossbeam_channel::bounded::<TaskReport>(total);
        let abort = Arc::new(AtomicBool::new(false));
        let mut slots: Vec<(String, PathBuf, Option<Vec<MatchRecord>>)> = Vec::with_capacity(total);

        for (index, repo) in repositories.into_iter().enumerate() {
            slots.push((repo.name.clone(), repo.path.clone(), None));

            let tx = tx.clone();
            let abort = Arc::clone(&abort);
            let regex = regex.clone();
            let bounds = self.bounds;
            pool.spawn(move || {
                if abort.load(Ordering::SeqCst) {
                    debug!("Not starting {}: run already failed", repo.name);
                    return;
                }
                debug!("Scanning {}", repo);
                let outcome = scan_repository(&regex, &bounds, &repo.name, &repo.history);
                match &outcome {
                    Ok(matches) => debug!("Finished {}: {} matches", repo.name, matches.len()),
                    Err(e) => debug!("Failed {}: {}", repo.name, e),
                }
                // The receiver is gone once the run has failed
                let _ = tx.send(TaskReport { index, outcome });
            });
        }
        // Only the tasks hold senders now, so disconnection means all are done
        drop(tx);

        let mut pending = total;
        while pending > 0 {
            debug!("Run phase: {:?}", RunPhase::Scanning { in_flight: pending });
            match rx.recv() {
                Ok(TaskReport { index, outcome }) => {
                    pending -= 1;
                    match outcome {
                        Ok(matches) => slots[index].2 = Some(matches),
                        Err(e) => {
                            warn!("Aborting run: {}", e);
                            abort.store(true, Ordering::SeqCst);
                            return Err(e);
                        }
                    }
                }
                Err(RecvError) => {
                    // Every sender is gone but some task never reported
                    let repository = slots
                        .iter()
                        .find(|(_, _, matches)| matches.is_none())
                        .map(|(name, _, _)| name.clone())
                        .unwrap_or_default();
                    return Err(ScanError::TaskLost { repository });
                }
            }
        }

        debug!("Run phase: {:?}", RunPhase::Aggregating);
        Ok(slots
            .into_iter()
            .map(|(name, path, matches)| RepoMatches {
                name,
                path,
                matches: matches.unwrap_or_default(),
            })
            .collect())
    }
}
