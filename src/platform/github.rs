//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{CommitStatus, MergeResult, PullRequest, PullRequestState, StatusState};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    owner: String,
    repo: String,
    /// Token for raw HTTP requests (status listing)
    token: String,
    /// HTTP client for raw requests (status listing)
    http_client: Client,
    /// API host for raw requests
    api_host: String,
}

/// Status entry as returned by the REST API
#[derive(Deserialize)]
struct RawStatus {
    #[serde(default)]
    context: Option<String>,
    state: StatusState,
}

impl From<RawStatus> for CommitStatus {
    fn from(raw: RawStatus) -> Self {
        Self {
            context: raw.context.unwrap_or_default(),
            state: raw.state,
        }
    }
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        let api_host = if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
            format!("{h}/api/v3")
        } else {
            "api.github.com".to_string()
        };

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("prland")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            owner,
            repo,
            token: token.to_string(),
            http_client,
            api_host,
        })
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        debug!(head, base, "creating PR");
        let pulls = self.client.pulls(&self.owner, &self.repo);
        let mut builder = pulls.create(title, head, base);

        if let Some(body_text) = body {
            builder = builder.body(body_text);
        }

        let pr = builder.send().await?;

        let result = PullRequest {
            number: pr.number,
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            head_sha: pr.head.sha.clone(),
        };
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequestState> {
        debug!(pr_number, "getting PR");
        let pr = self
            .client
            .pulls(&self.owner, &self.repo)
            .get(pr_number)
            .await?;

        let state = PullRequestState {
            number: pr.number,
            head_sha: pr.head.sha.clone(),
            mergeable: pr.mergeable,
        };
        debug!(pr_number, head_sha = %state.head_sha, mergeable = ?state.mergeable, "got PR");
        Ok(state)
    }

    async fn list_statuses(&self, sha: &str, per_page: u8) -> Result<Vec<CommitStatus>> {
        let url = format!(
            "https://{}/repos/{}/{}/commits/{}/statuses",
            self.api_host, self.owner, self.repo, sha
        );

        let response = self
            .http_client
            .get(&url)
            .query(&[("per_page", per_page)])
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch commit statuses: {e}")))?
            .error_for_status()
            .map_err(|e| Error::GitHubApi(format!("Commit statuses request failed: {e}")))?;

        let statuses: Vec<RawStatus> = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse commit statuses: {e}")))?;

        debug!(sha, count = statuses.len(), "listed commit statuses");
        Ok(statuses.into_iter().map(Into::into).collect())
    }

    async fn merge_pr(&self, pr_number: u64) -> Result<MergeResult> {
        debug!(pr_number, "merging PR");

        let result = self
            .client
            .pulls(&self.owner, &self.repo)
            .merge(pr_number)
            .method(octocrab::params::pulls::MergeMethod::Merge)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {e}")))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }
}
