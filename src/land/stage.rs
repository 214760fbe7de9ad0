//! Stages of a landing run

use std::fmt;

/// A completed step of the landing state machine
///
/// Stages complete strictly in declaration order; a failure at any point
/// ends the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandStage {
    /// Repository shallow-cloned into the workspace
    Cloned,
    /// Branch committed and pushed
    BranchPushed {
        /// Branch name
        branch: String,
        /// New commit id
        commit: String,
    },
    /// Pull request opened
    PrCreated {
        /// PR number
        number: u64,
        /// Web URL for the PR
        url: String,
    },
    /// Status check on the PR head passed
    PrStatusResolved {
        /// PR head commit
        sha: String,
    },
    /// Pull request merged
    Merged {
        /// Merge commit
        sha: String,
    },
    /// Status check on the merge commit passed
    MergeStatusResolved {
        /// Merge commit
        sha: String,
    },
}

impl fmt::Display for LandStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloned => write!(f, "cloned repository"),
            Self::BranchPushed { branch, commit } => {
                write!(f, "pushed {branch} at {}", short_sha(commit))
            }
            Self::PrCreated { number, url } => write!(f, "opened PR #{number} {url}"),
            Self::PrStatusResolved { sha } => write!(f, "PR head {} passed", short_sha(sha)),
            Self::Merged { sha } => write!(f, "merged as {}", short_sha(sha)),
            Self::MergeStatusResolved { sha } => {
                write!(f, "merge commit {} passed", short_sha(sha))
            }
        }
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
