//! `<owner>/<repository>` identifiers

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// One or more non-slash characters, a slash, one or more non-slash characters
static REPO_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^/]+)/([^/]+)$").expect("valid regex"));

/// A validated repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName {
    owner: String,
    repo: String,
}

impl RepoName {
    /// Parse `<owner>/<repository>`
    ///
    /// Exactly one `/` with non-empty components on both sides; anything else
    /// is rejected before any network access happens.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = REPO_NAME
            .captures(input)
            .ok_or_else(|| Error::InvalidRepoName(input.to_string()))?;

        Ok(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
        })
    }

    /// Repository owner (user or organization)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepoName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
