//! Pull request lifecycle: create, fetch, merge

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::PullRequestState;
use std::sync::Arc;
use tracing::debug;

/// What is known about the pull request being landed
///
/// The number is fixed at creation. The merge commit is only ever set by a
/// successful [`PullRequestController::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    number: u64,
    html_url: String,
    head_sha: Option<String>,
    merge_sha: Option<String>,
}

impl PullRequestRecord {
    /// PR number
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Web URL for the PR
    pub fn html_url(&self) -> &str {
        &self.html_url
    }

    /// Head commit SHA, as last fetched
    pub fn head_sha(&self) -> Option<&str> {
        self.head_sha.as_deref()
    }

    /// Merge commit SHA, once merged
    pub fn merge_sha(&self) -> Option<&str> {
        self.merge_sha.as_deref()
    }
}

/// Drives one pull request through its lifecycle
pub struct PullRequestController {
    platform: Arc<dyn PlatformService>,
    record: Option<PullRequestRecord>,
}

impl PullRequestController {
    /// Create a controller with no pull request yet
    pub fn new(platform: Arc<dyn PlatformService>) -> Self {
        Self {
            platform,
            record: None,
        }
    }

    /// The pull request record, once created
    pub const fn record(&self) -> Option<&PullRequestRecord> {
        self.record.as_ref()
    }

    /// Consume the controller, returning the record
    pub fn into_record(self) -> Option<PullRequestRecord> {
        self.record
    }

    /// Open a pull request from `head` into `base`
    pub async fn create(
        &mut self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<&PullRequestRecord> {
        if let Some(existing) = &self.record {
            return Err(Error::Internal(format!(
                "pull request #{} already created",
                existing.number
            )));
        }

        let pr = self
            .platform
            .create_pr(head, base, title, body)
            .await
            .map_err(|e| Error::PrCreate(Box::new(e)))?;

        debug!(pr_number = pr.number, head, base, "pull request opened");
        Ok(self.record.insert(PullRequestRecord {
            number: pr.number,
            html_url: pr.html_url,
            head_sha: Some(pr.head_sha).filter(|sha| !sha.is_empty()),
            merge_sha: None,
        }))
    }

    /// Fetch the current head commit and mergeable flag
    pub async fn fetch(&mut self) -> Result<PullRequestState> {
        let record = self.record.as_mut().ok_or(Error::NoPullRequest)?;
        let number = record.number;

        let state = self
            .platform
            .get_pr(number)
            .await
            .map_err(|e| Error::PrFetch {
                number,
                source: Box::new(e),
            })?;

        record.head_sha = Some(state.head_sha.clone());
        Ok(state)
    }

    /// Merge the pull request if the platform says it is mergeable
    ///
    /// A false or not-yet-computed mergeable flag fails with
    /// [`Error::NotMergeable`] without attempting the merge. Returns the
    /// merge commit SHA.
    pub async fn merge(&mut self) -> Result<String> {
        let state = self.fetch().await?;
        let number = state.number;

        if state.mergeable != Some(true) {
            return Err(Error::NotMergeable {
                number,
                mergeable: state.mergeable,
            });
        }

        let result = self
            .platform
            .merge_pr(number)
            .await
            .map_err(|e| Error::Merge {
                number,
                message: e.to_string(),
            })?;

        if !result.merged {
            return Err(Error::Merge {
                number,
                message: result
                    .message
                    .unwrap_or_else(|| "platform reported the PR as not merged".to_string()),
            });
        }
        let sha = result.sha.ok_or_else(|| Error::Merge {
            number,
            message: "merge response carried no commit SHA".to_string(),
        })?;

        debug!(pr_number = number, merge_sha = %sha, "pull request merged");
        if let Some(record) = self.record.as_mut() {
            record.merge_sha = Some(sha.clone());
        }
        Ok(sha)
    }
}
