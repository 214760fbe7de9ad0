//! Disposable clone of the target repository
//!
//! A [`Workspace`] owns one temporary directory for its whole life:
//! `clone_remote` populates it, `commit_and_push` turns the caller's file
//! changes into a single commit on a fresh branch and pushes it, and
//! `teardown` removes the directory again.
//!
//! The branch is a local ref copied from HEAD, so everything up to the push
//! is local and repeatable; the push is the only network write.

mod transport;

pub use transport::{GitTransport, HttpsTransport, PushFailure, push_ref};

use crate::RepoName;
use crate::error::{BoxError, Error, Result};
use crate::types::{CommitRequest, Credentials};
use chrono::{DateTime, Utc};
use git2::build::CheckoutBuilder;
use git2::{Commit, IndexAddOption, Oid, Repository, Signature, Time};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Name of the remote created by cloning
const ORIGIN: &str = "origin";

/// Prefix of the temporary directory
const DIR_PREFIX: &str = "repo_";

/// A cloned repository in a temporary directory
pub struct Workspace {
    name: RepoName,
    credentials: Credentials,
    transport: Arc<dyn GitTransport>,
    path: PathBuf,
    dir: Option<TempDir>,
    repo: Option<Repository>,
}

impl Workspace {
    /// Allocate a fresh temporary directory under `parent`
    pub fn new(
        name: RepoName,
        credentials: Credentials,
        transport: Arc<dyn GitTransport>,
        parent: &Path,
    ) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), repo = %name, "allocated workspace");

        Ok(Self {
            name,
            credentials,
            transport,
            path,
            dir: Some(dir),
            repo: None,
        })
    }

    /// Directory the repository is (or will be) cloned into
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `clone_remote` has succeeded
    pub const fn is_cloned(&self) -> bool {
        self.repo.is_some()
    }

    /// Shallow-clone the remote repository into the workspace directory
    pub fn clone_remote(&mut self) -> Result<()> {
        if self.dir.is_none() {
            return Err(Error::Internal("workspace already torn down".to_string()));
        }

        let url = self.transport.clone_url(&self.name);
        let repo = self
            .transport
            .clone_repo(&url, &self.path, &self.credentials)
            .map_err(|source| Error::Clone {
                url: url.clone(),
                source,
            })?;

        debug!(url, "cloned");
        self.repo = Some(repo);
        Ok(())
    }

    /// Commit the changes made by `mutate` to a new branch and push it
    ///
    /// Creates `refs/heads/<branch>` at HEAD, checks it out, and hands the
    /// worktree to `mutate`. If `mutate` fails nothing is committed or
    /// pushed. Otherwise every worktree change is staged, committed with the
    /// returned message and author, and pushed to `origin`.
    ///
    /// Returns the id of the new commit.
    pub fn commit_and_push<F>(&mut self, branch: &str, mutate: F) -> Result<String>
    where
        F: FnOnce(&Path) -> std::result::Result<CommitRequest, BoxError>,
    {
        let repo = self.repo.as_ref().ok_or(Error::NotCloned)?;

        let head = repo.head()?.peel_to_commit()?;
        let branch_ref = format!("refs/heads/{branch}");
        repo.reference(&branch_ref, head.id(), false, "prland: create branch")?;
        repo.set_head(&branch_ref)?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
        debug!(branch, base = %head.id(), "checked out new branch");

        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::Internal("cloned repository has no worktree".to_string()))?;
        let request = mutate(workdir).map_err(Error::Mutation)?;

        let oid = commit_all(repo, &head, &request, Utc::now())?;
        debug!(branch, commit = %oid, "committed");

        repo.reference(
            &format!("refs/remotes/{ORIGIN}/{branch}"),
            oid,
            true,
            "prland: record remote-tracking ref",
        )?;

        self.transport
            .push(
                repo,
                ORIGIN,
                &format!("{branch_ref}:{branch_ref}"),
                &self.credentials,
            )
            .map_err(|e| Error::Push {
                branch: branch.to_string(),
                message: e.to_string(),
            })?;

        debug!(branch, commit = %oid, "pushed");
        Ok(oid.to_string())
    }

    /// Remove the workspace directory
    ///
    /// Safe to call more than once and after any earlier failure; only the
    /// first call does anything. A directory that is already gone counts as
    /// removed.
    pub fn teardown(&mut self) -> Result<()> {
        // Close the repository before deleting its files
        self.repo = None;

        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "removed workspace"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "workspace already gone");
            }
            Err(source) => {
                warn!(path = %self.path.display(), error = %source, "failed to remove workspace");
                return Err(Error::Teardown {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        }
        Ok(())
    }
}

/// Stage every worktree change and commit it on top of `parent`
fn commit_all(
    repo: &Repository,
    parent: &Commit<'_>,
    request: &CommitRequest,
    now: DateTime<Utc>,
) -> Result<Oid> {
    let mut index = repo.index().map_err(Error::Commit)?;
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .map_err(Error::Commit)?;
    // add_all does not see deletions
    index.update_all(["*"], None).map_err(Error::Commit)?;
    index.write().map_err(Error::Commit)?;

    let tree_id = index.write_tree().map_err(Error::Commit)?;
    if tree_id == parent.tree_id() {
        return Err(Error::EmptyCommit);
    }
    let tree = repo.find_tree(tree_id).map_err(Error::Commit)?;

    let when = request.author.resolve_time(now);
    let signature = Signature::new(
        &request.author.name,
        &request.author.email,
        &Time::new(when.timestamp(), 0),
    )
    .map_err(Error::Commit)?;

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        &request.message,
        &tree,
        &[parent],
    )
    .map_err(Error::Commit)
}
