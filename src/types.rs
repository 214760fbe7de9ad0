//! Core types for prland

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// GitHub username and personal access token
///
/// Used for both the git transport (basic auth) and the REST API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    /// Create credentials from a username and token
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Username for basic auth
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Access token
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Commit author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Author name
    pub name: String,
    /// Author email
    pub email: String,
    /// Commit time; `None` or the zero value means "now"
    pub when: Option<DateTime<Utc>>,
}

impl Author {
    /// Create an author whose commit time is taken at commit
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when: None,
        }
    }

    /// Set an explicit commit time
    #[must_use]
    pub const fn at(mut self, when: DateTime<Utc>) -> Self {
        self.when = Some(when);
        self
    }

    /// Commit time to record, substituting `now` for an unset or zero time
    pub fn resolve_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.when {
            Some(when) if when != DateTime::<Utc>::default() => when,
            _ => now,
        }
    }
}

/// What the mutation callback hands back: how to commit its changes
#[derive(Debug, Clone)]
pub struct CommitRequest {
    /// Commit message
    pub message: String,
    /// Commit author (also used as committer)
    pub author: Author,
}

impl CommitRequest {
    /// Create a commit request
    pub fn new(message: impl Into<String>, author: Author) -> Self {
        Self {
            message: message.into(),
            author,
        }
    }
}

/// A pull request as returned by creation
#[derive(Debug, Clone)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Head commit SHA
    pub head_sha: String,
}

/// Current PR state relevant to merging
#[derive(Debug, Clone)]
pub struct PullRequestState {
    /// PR number
    pub number: u64,
    /// Head commit SHA
    pub head_sha: String,
    /// Whether PR can be merged (no conflicts)
    /// - `Some(true)` = mergeable
    /// - `Some(false)` = has conflicts
    /// - `None` = unknown (GitHub still computing)
    pub mergeable: Option<bool>,
}

/// State reported by a commit status entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    /// Still running
    Pending,
    /// Passed
    Success,
    /// Failed
    Failure,
    /// Errored
    Error,
    /// Anything else the platform may report
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Error => write!(f, "error"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One entry of a commit's status list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitStatus {
    /// Status check name
    pub context: String,
    /// Reported state
    pub state: StatusState,
}

impl CommitStatus {
    /// Create a status entry
    pub fn new(context: impl Into<String>, state: StatusState) -> Self {
        Self {
            context: context.into(),
            state,
        }
    }
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
