#![allow(dead_code)]

use anyhow::Result;
use git2::{Oid, Repository, Signature, Time};
use std::fs;
use std::path::{Path, PathBuf};

/// Base timestamp for test commits: 2023-11-14T22:13:20Z
pub const T0: i64 = 1_700_000_000;

/// A git repository built commit by commit, without a working tree checkout
pub struct TestRepo {
    pub path: PathBuf,
    pub repo: Repository,
}

impl TestRepo {
    pub fn init(path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&path)?;
        let repo = Repository::init(&path)?;
        Ok(Self { path, repo })
    }

    /// Commit `content` to `file` on top of HEAD
    pub fn commit(&self, file: &str, content: &str, author: &str, seconds: i64) -> Result<Oid> {
        let parent = self.head()?;
        let tree = self.tree_with(parent, file, content)?;
        let signature = Signature::new(author, "dev@example.com", &Time::new(seconds, 0))?;
        let parent_commit = match parent {
            Some(oid) => Some(self.repo.find_commit(oid)?),
            None => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent_commit.iter().collect();
        let tree = self.repo.find_tree(tree)?;
        Ok(self
            .repo
            .commit(Some("HEAD"), &signature, &signature, "change", &tree, &parents)?)
    }

    /// Commit on top of `parent` without moving HEAD
    pub fn side_commit(&self, parent: Oid, file: &str, content: &str, seconds: i64) -> Result<Oid> {
        let tree = self.tree_with(Some(parent), file, content)?;
        let signature = Signature::new("Side Dev", "side@example.com", &Time::new(seconds, 0))?;
        let parent = self.repo.find_commit(parent)?;
        let tree = self.repo.find_tree(tree)?;
        Ok(self
            .repo
            .commit(None, &signature, &signature, "side change", &tree, &[&parent])?)
    }

    /// Merge `other` into HEAD, taking `other`'s tree
    pub fn merge(&self, other: Oid, seconds: i64) -> Result<Oid> {
        let head = self
            .head()?
            .ok_or_else(|| anyhow::anyhow!("cannot merge into an empty repository"))?;
        let ours = self.repo.find_commit(head)?;
        let theirs = self.repo.find_commit(other)?;
        let tree = theirs.tree()?;
        let signature = Signature::new("Merge Dev", "merge@example.com", &Time::new(seconds, 0))?;
        Ok(self
            .repo
            .commit(Some("HEAD"), &signature, &signature, "merge", &tree, &[&ours, &theirs])?)
    }

    /// Delete the loose object file of `oid`, corrupting the repository
    pub fn remove_object(&self, oid: Oid) -> Result<()> {
        let hex = oid.to_string();
        let object = self.repo.path().join("objects").join(&hex[..2]).join(&hex[2..]);
        fs::remove_file(object)?;
        Ok(())
    }

    fn head(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(_) => Ok(None),
        }
    }

    fn tree_with(&self, base: Option<Oid>, file: &str, content: &str) -> Result<Oid> {
        let base_tree = match base {
            Some(oid) => Some(self.repo.find_commit(oid)?.tree()?),
            None => None,
        };
        let mut builder = self.repo.treebuilder(base_tree.as_ref())?;
        let blob = self.repo.blob(content.as_bytes())?;
        builder.insert(file, blob, 0o100644)?;
        Ok(builder.write()?)
    }
}

/// Create a plain directory that is not a repository
pub fn plain_dir(base: &Path, name: &str) -> Result<PathBuf> {
    let path = base.join(name);
    fs::create_dir_all(&path)?;
    fs::write(path.join("notes.txt"), "just some notes")?;
    Ok(path)
}
