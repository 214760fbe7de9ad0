//! Local bare repository standing in for the GitHub remote

#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use prland::RepoName;
use prland::types::Credentials;
use prland::workspace::{GitTransport, PushFailure, push_ref};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// A bare repository with one commit on `main`
pub struct LocalRemote {
    _temp: TempDir,
    path: PathBuf,
}

impl LocalRemote {
    /// Create a bare repo containing `README.md` on `main`
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("remote.git");
        let repo = Repository::init_bare(&path).expect("init bare repo");

        commit_file(&repo, "refs/heads/main", "README.md", "# fixture\n", &[]);
        repo.set_head("refs/heads/main").expect("set HEAD");

        Self { _temp: temp, path }
    }

    /// Path of the bare repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Repository {
        Repository::open_bare(&self.path).expect("open bare repo")
    }

    /// Put an unrelated commit on `branch`
    pub fn create_unrelated_branch(&self, branch: &str) -> Oid {
        let repo = self.open();
        commit_file(
            &repo,
            &format!("refs/heads/{branch}"),
            "OTHER.md",
            "unrelated\n",
            &[],
        )
    }

    /// Tip of `branch`, if it exists
    pub fn branch_tip(&self, branch: &str) -> Option<Oid> {
        let repo = self.open();
        repo.find_reference(&format!("refs/heads/{branch}"))
            .ok()
            .and_then(|r| r.target())
    }

    /// Commit time (seconds) of the tip of `branch`
    pub fn tip_time(&self, branch: &str) -> i64 {
        let repo = self.open();
        let oid = self.branch_tip(branch).expect("branch exists");
        repo.find_commit(oid).expect("commit").time().seconds()
    }

    /// Author name and message of the tip of `branch`
    pub fn tip_author_and_message(&self, branch: &str) -> (String, String) {
        let repo = self.open();
        let oid = self.branch_tip(branch).expect("branch exists");
        let commit = repo.find_commit(oid).expect("commit");
        (
            commit.author().name().unwrap_or_default().to_string(),
            commit.message().unwrap_or_default().to_string(),
        )
    }

    /// Content of `file` at the tip of `branch`
    pub fn file_at(&self, branch: &str, file: &str) -> Option<String> {
        let repo = self.open();
        let oid = self.branch_tip(branch)?;
        let tree = repo.find_commit(oid).ok()?.tree().ok()?;
        let entry = tree.get_path(Path::new(file)).ok()?;
        let blob = repo.find_blob(entry.id()).ok()?;
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Parent ids of the tip of `branch`
    pub fn tip_parents(&self, branch: &str) -> Vec<Oid> {
        let repo = self.open();
        let oid = self.branch_tip(branch).expect("branch exists");
        repo.find_commit(oid).expect("commit").parent_ids().collect()
    }
}

fn commit_file(repo: &Repository, refname: &str, file: &str, content: &str, parents: &[Oid]) -> Oid {
    let blob = repo.blob(content.as_bytes()).expect("write blob");
    let mut builder = repo.treebuilder(None).expect("treebuilder");
    builder.insert(file, blob, 0o100_644).expect("insert entry");
    let tree = repo.find_tree(builder.write().expect("write tree")).expect("find tree");
    let signature = Signature::now("Fixture", "fixture@example.com").expect("signature");
    let parents: Vec<_> = parents
        .iter()
        .map(|id| repo.find_commit(*id).expect("parent"))
        .collect();
    let parent_refs: Vec<_> = parents.iter().collect();

    repo.commit(
        Some(refname),
        &signature,
        &signature,
        "Fixture commit",
        &tree,
        &parent_refs,
    )
    .expect("commit")
}

/// Transport that clones from and pushes to a local path
///
/// Records pushes and can be told to fail them.
pub struct LocalTransport {
    remote: PathBuf,
    push_calls: Mutex<Vec<String>>,
    error_on_push: Mutex<Option<String>>,
}

impl LocalTransport {
    /// Transport for `remote`
    pub fn new(remote: &Path) -> Self {
        Self {
            remote: remote.to_path_buf(),
            push_calls: Mutex::new(Vec::new()),
            error_on_push: Mutex::new(None),
        }
    }

    /// Make `push` fail without contacting the remote
    pub fn fail_push(&self, msg: &str) {
        *self.error_on_push.lock().unwrap() = Some(msg.to_string());
    }

    /// Refspecs pushed so far
    pub fn get_push_calls(&self) -> Vec<String> {
        self.push_calls.lock().unwrap().clone()
    }
}

impl GitTransport for LocalTransport {
    fn clone_url(&self, _name: &RepoName) -> String {
        self.remote.to_string_lossy().into_owned()
    }

    fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        _credentials: &Credentials,
    ) -> Result<Repository, git2::Error> {
        Repository::clone(url, dest)
    }

    fn push(
        &self,
        repo: &Repository,
        remote: &str,
        refspec: &str,
        _credentials: &Credentials,
    ) -> Result<(), PushFailure> {
        self.push_calls.lock().unwrap().push(refspec.to_string());

        if let Some(msg) = self.error_on_push.lock().unwrap().as_ref() {
            return Err(PushFailure::Transport(msg.clone()));
        }

        push_ref(repo, remote, refspec, None)
    }
}
