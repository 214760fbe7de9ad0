//! Error types for prland

use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by caller-supplied mutation callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while landing a change
#[derive(Error, Debug)]
pub enum Error {
    /// Repository identifier is not `<owner>/<repo>`
    #[error("invalid repository name '{0}': expected <owner>/<repository>")]
    InvalidRepoName(String),

    /// Shallow clone failed
    #[error("failed to clone {url}: {source}")]
    Clone {
        /// Clone URL
        url: String,
        /// Underlying git error
        #[source]
        source: git2::Error,
    },

    /// Workspace operation attempted before `clone`
    #[error("workspace has not been cloned")]
    NotCloned,

    /// Caller-supplied mutation callback failed
    #[error("mutation failed: {0}")]
    Mutation(#[source] BoxError),

    /// Creating the commit failed
    #[error("failed to commit: {0}")]
    Commit(#[source] git2::Error),

    /// Mutation left the worktree unchanged
    #[error("mutation produced no changes to commit")]
    EmptyCommit,

    /// Pushing the branch failed or was rejected
    #[error("failed to push {branch}: {message}")]
    Push {
        /// Branch being pushed
        branch: String,
        /// Transport error or rejection reason
        message: String,
    },

    /// Local git operation failed (ref creation, checkout)
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Pull request creation failed
    #[error("failed to create pull request: {0}")]
    PrCreate(#[source] Box<Self>),

    /// Fetching pull request state failed
    #[error("failed to fetch pull request #{number}: {source}")]
    PrFetch {
        /// PR number
        number: u64,
        /// Underlying error
        #[source]
        source: Box<Self>,
    },

    /// Controller used before a pull request was created
    #[error("no pull request has been created")]
    NoPullRequest,

    /// Listing commit statuses failed; polling is aborted
    #[error("failed to list statuses for {sha}: {source}")]
    StatusTransport {
        /// Commit being polled
        sha: String,
        /// Underlying error
        #[source]
        source: Box<Self>,
    },

    /// Status check reported failure or error
    #[error("status check '{context}' on {sha} is in state '{state}', aborting")]
    StatusFailed {
        /// Commit the check is attached to
        sha: String,
        /// Status check name
        context: String,
        /// Reported state
        state: String,
    },

    /// No terminal state observed before the deadline
    #[error("timed out after {timeout:?} waiting for status check '{context}' on {sha}")]
    StatusTimeout {
        /// Commit being polled
        sha: String,
        /// Status check name
        context: String,
        /// Deadline that elapsed
        timeout: Duration,
    },

    /// PR mergeable flag is false or not yet computed
    #[error("pull request #{number} is not mergeable (mergeable: {mergeable:?})")]
    NotMergeable {
        /// PR number
        number: u64,
        /// Flag as reported by the platform
        mergeable: Option<bool>,
    },

    /// Merge call failed or did not merge
    #[error("failed to merge pull request #{number}: {message}")]
    Merge {
        /// PR number
        number: u64,
        /// Failure description
        message: String,
    },

    /// Removing the workspace directory failed
    #[error("failed to remove workspace {path}: {source}")]
    Teardown {
        /// Workspace directory
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform error
    #[error("platform error: {0}")]
    Platform(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violated
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

/// Result type alias for prland operations
pub type Result<T> = std::result::Result<T, Error>;
