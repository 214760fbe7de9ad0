//! Platform services for GitHub
//!
//! The pull-request and status APIs sit behind [`PlatformService`] so the
//! landing flow can run against an in-memory implementation in tests.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    CommitStatus, Credentials, MergeResult, PlatformConfig, PullRequest, PullRequestState,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Platform service trait for PR and status operations
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Open a pull request from `head` into `base`
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest>;

    /// Get the current head commit and mergeable flag of a PR
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequestState>;

    /// List the most recent commit statuses for `sha` (first page only)
    async fn list_statuses(&self, sha: &str, per_page: u8) -> Result<Vec<CommitStatus>>;

    /// Merge a PR with a merge commit
    async fn merge_pr(&self, pr_number: u64) -> Result<MergeResult>;
}

/// Create the production platform service for `config`
pub fn create_platform_service(
    config: &PlatformConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn PlatformService>> {
    let service = GitHubService::new(
        credentials.token(),
        config.owner.clone(),
        config.repo.clone(),
        config.host.clone(),
    )?;
    Ok(Arc::new(service))
}
