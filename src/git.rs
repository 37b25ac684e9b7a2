use crate::domain::{Author, Commit, Timestamp};
use crate::ports::{FallibleIter, History, RepoOpener};
use anyhow::{Context, Result};
use git2::{Oid, Patch, Repository as GitRepository, Sort};
use std::path::Path;

/// History adapter that implements `History` using git2
pub struct GitHistory {
    repo: GitRepository,
}

impl GitHistory {
    pub fn open<P: AsRef<Path>>(repo_path: P) -> Result<Self> {
        let repo_path = repo_path.as_ref();
        let repo = GitRepository::open(repo_path)
            .with_context(|| format!("Failed to open git repository at {}", repo_path.display()))?;
        Ok(Self { repo })
    }

    fn lookup(&self, oid: Oid) -> Result<git2::Commit<'_>> {
        self.repo
            .find_commit(oid)
            .with_context(|| format!("Failed to find commit {}", oid))
    }
}

impl std::fmt::Debug for GitHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHistory")
            .field("path", &self.repo.path())
            .finish()
    }
}

fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    let author = commit.author();
    let authored = author.when();
    let committed = commit.committer().when();

    Commit {
        id: commit.id().to_string(),
        author: Author {
            name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
            email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        },
        authored: Timestamp::new(authored.seconds(), authored.offset_minutes()),
        committed: Timestamp::new(committed.seconds(), committed.offset_minutes()),
        parents: commit.parent_ids().map(|oid| oid.to_string()).collect(),
    }
}

impl History for GitHistory {
    fn commits(&self) -> Result<FallibleIter<'_, Commit>> {
        // An unborn HEAD has nothing to walk
        if self.repo.is_empty().context("Failed to inspect HEAD")? {
            return Ok(Box::new(std::iter::empty()));
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head().context("Failed to resolve HEAD")?;

        Ok(Box::new(revwalk.map(move |oid| {
            let oid = oid.context("Failed to walk history")?;
            Ok(to_commit(&self.lookup(oid)?))
        })))
    }

    fn find_commit(&self, id: &str) -> Result<Commit> {
        let oid = Oid::from_str(id).with_context(|| format!("Invalid commit id {:?}", id))?;
        Ok(to_commit(&self.lookup(oid)?))
    }

    fn patches(&self, parent: &Commit, child: &Commit) -> Result<FallibleIter<'_, String>> {
        let parent_tree = self
            .lookup(Oid::from_str(&parent.id)?)?
            .tree()
            .with_context(|| format!("Failed to read tree of {}", parent.short_id()))?;
        let child_tree = self
            .lookup(Oid::from_str(&child.id)?)?
            .tree()
            .with_context(|| format!("Failed to read tree of {}", child.short_id()))?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&parent_tree), Some(&child_tree), None)
            .context("Failed to diff trees")?;

        let deltas = diff.deltas().len();
        Ok(Box::new((0..deltas).filter_map(move |idx| {
            // Unchanged deltas have no patch; binary ones still render their header
            let mut patch = match Patch::from_diff(&diff, idx) {
                Ok(Some(patch)) => patch,
                Ok(None) => return None,
                Err(e) => return Some(Err(anyhow::Error::new(e).context("Failed to build patch"))),
            };
            Some(
                patch
                    .to_buf()
                    .map(|buf| String::from_utf8_lossy(&buf).into_owned())
                    .context("Failed to render patch"),
            )
        })))
    }
}

/// Opens directories with git2
#[derive(Debug, Default, Clone, Copy)]
pub struct GitOpener;

impl GitOpener {
    pub fn new() -> Self {
        Self
    }
}

impl RepoOpener for GitOpener {
    type Repo = GitHistory;

    fn open(&self, path: &Path) -> Result<GitHistory> {
        GitHistory::open(path)
    }
}
