//! Git network capability: clone and push
//!
//! Everything that touches a remote goes through [`GitTransport`], so the
//! workspace protocol can run against a local bare repository in tests.

use crate::RepoName;
use crate::types::Credentials;
use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, PushOptions, RemoteCallbacks, Repository};
use std::cell::RefCell;
use std::path::Path;
use tracing::debug;

/// Clone/push capability used by [`Workspace`](super::Workspace)
pub trait GitTransport: Send + Sync {
    /// URL the repository is cloned from and pushed to
    fn clone_url(&self, name: &RepoName) -> String;

    /// Clone `url` into `dest`
    fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        credentials: &Credentials,
    ) -> Result<Repository, git2::Error>;

    /// Push `refspec` to `remote`
    ///
    /// Returns the rejection message if the server refused the ref update.
    fn push(
        &self,
        repo: &Repository,
        remote: &str,
        refspec: &str,
        credentials: &Credentials,
    ) -> Result<(), PushFailure>;
}

/// Why a push did not land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFailure {
    /// Network, auth, or protocol failure
    Transport(String),
    /// Server rejected the ref update
    Rejected {
        /// Ref that was rejected
        refname: String,
        /// Server-provided reason
        reason: String,
    },
}

impl std::fmt::Display for PushFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "{msg}"),
            Self::Rejected { refname, reason } => write!(f, "{refname} rejected: {reason}"),
        }
    }
}

/// HTTPS transport against GitHub (or GitHub Enterprise)
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    host: String,
    depth: i32,
}

impl HttpsTransport {
    /// Create a transport for `host` (None for github.com), cloning at depth 1
    pub fn new(host: Option<String>) -> Self {
        Self {
            host: host.unwrap_or_else(|| "github.com".to_string()),
            depth: 1,
        }
    }
}

impl Default for HttpsTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Basic-auth callbacks with the stored credentials
fn auth_callbacks(credentials: &Credentials) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        Cred::userpass_plaintext(credentials.username(), credentials.token())
    });
    callbacks
}

impl GitTransport for HttpsTransport {
    fn clone_url(&self, name: &RepoName) -> String {
        format!("https://{}/{}/{}", self.host, name.owner(), name.repo())
    }

    fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        credentials: &Credentials,
    ) -> Result<Repository, git2::Error> {
        debug!(url, depth = self.depth, "cloning");
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(auth_callbacks(credentials));
        fetch.depth(self.depth);

        RepoBuilder::new().fetch_options(fetch).clone(url, dest)
    }

    fn push(
        &self,
        repo: &Repository,
        remote: &str,
        refspec: &str,
        credentials: &Credentials,
    ) -> Result<(), PushFailure> {
        push_ref(repo, remote, refspec, Some(credentials))
    }
}

/// Push `refspec`, turning per-ref rejections into [`PushFailure::Rejected`]
///
/// libgit2 reports a rejected ref through the update callback rather than
/// as an error from `push`, so both have to be checked.
pub fn push_ref(
    repo: &Repository,
    remote: &str,
    refspec: &str,
    credentials: Option<&Credentials>,
) -> Result<(), PushFailure> {
    debug!(remote, refspec, "pushing");
    let rejection: RefCell<Option<PushFailure>> = RefCell::new(None);

    let mut callbacks = credentials.map_or_else(RemoteCallbacks::new, auth_callbacks);
    callbacks.push_update_reference(|refname, status| {
        if let Some(reason) = status {
            *rejection.borrow_mut() = Some(PushFailure::Rejected {
                refname: refname.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(())
    });

    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);

    let mut origin = repo
        .find_remote(remote)
        .map_err(|e| PushFailure::Transport(e.message().to_string()))?;
    origin
        .push(&[refspec], Some(&mut options))
        .map_err(|e| PushFailure::Transport(e.message().to_string()))?;
    drop(options);

    rejection.into_inner().map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_url_defaults_to_github() {
        let name = RepoName::parse("octocat/Hello-World").unwrap();
        assert_eq!(
            HttpsTransport::default().clone_url(&name),
            "https://github.com/octocat/Hello-World"
        );
        assert_eq!(
            HttpsTransport::new(Some("git.example.com".to_string())).clone_url(&name),
            "https://git.example.com/octocat/Hello-World"
        );
    }

    #[test]
    fn test_rejection_names_ref() {
        let failure = PushFailure::Rejected {
            refname: "refs/heads/feat".to_string(),
            reason: "protected branch".to_string(),
        };
        assert_eq!(failure.to_string(), "refs/heads/feat rejected: protected branch");
    }
}
