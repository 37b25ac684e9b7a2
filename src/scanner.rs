use crate::bounds::BoundPolicy;
use crate::domain::{Commit, MatchRecord, ScanOutcome};
use crate::error::ScanError;
use crate::matcher::commit_matches;
use crate::ports::History;
use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, trace};

/// What the walk does after a commit has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Walk one repository's history newest-first and collect the linear commits
/// whose change matches `regex`.
///
/// Reaching the match limit or the age cutoff ends the walk successfully. Any
/// failure to list commits, resolve a parent or diff two trees fails the whole
/// repository.
pub fn scan_repository<H: History + ?Sized>(
    regex: &Regex,
    bounds: &BoundPolicy,
    repository: &str,
    history: &H,
) -> ScanOutcome {
    walk(regex, bounds, repository, history).map_err(|source| ScanError::History {
        repository: repository.to_string(),
        source,
    })
}

fn walk<H: History + ?Sized>(
    regex: &Regex,
    bounds: &BoundPolicy,
    repository: &str,
    history: &H,
) -> Result<Vec<MatchRecord>> {
    let mut matches = Vec::new();
    let mut examined = 0usize;

    let commits = history.commits().context("Failed to list commits")?;
    for commit in commits {
        let commit = commit.context("Failed to read commit")?;
        let parent_id = match commit.parents.as_slice() {
            [parent_id] => parent_id.clone(),
            [] => {
                trace!("{}: skipping root commit {}", repository, commit.short_id());
                continue;
            }
            _ => {
                trace!("{}: skipping merge commit {}", repository, commit.short_id());
                continue;
            }
        };

        examined += 1;
        if visit(regex, bounds, repository, history, commit, &parent_id, &mut matches)? == Step::Stop {
            debug!(
                "{}: stopping after {} commits with {} matches",
                repository,
                examined,
                matches.len()
            );
            break;
        }
    }

    Ok(matches)
}

/// Examine one linear commit, then apply the bounds
fn visit<H: History + ?Sized>(
    regex: &Regex,
    bounds: &BoundPolicy,
    repository: &str,
    history: &H,
    commit: Commit,
    parent_id: &str,
    matches: &mut Vec<MatchRecord>,
) -> Result<Step> {
    let parent = history
        .find_commit(parent_id)
        .with_context(|| format!("Failed to resolve parent of {}", commit.short_id()))?;

    let too_old = bounds.too_old(&commit);
    if commit_matches(regex, history, &parent, &commit)? {
        matches.push(MatchRecord {
            commit,
            repository: repository.to_string(),
        });
    }

    if bounds.match_limit_reached(matches.len()) || too_old {
        Ok(Step::Stop)
    } else {
        Ok(Step::Continue)
    }
}
