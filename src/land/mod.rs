//! Landing orchestration
//!
//! One run walks the stages in [`LandStage`] order:
//! clone → commit and push → open PR → wait on PR head → merge → wait on
//! merge commit. The first failure ends the run. Completed remote actions
//! (a pushed branch, an opened PR) are left in place; the workspace
//! directory is always removed.

mod stage;

pub use stage::LandStage;

use crate::RepoName;
use crate::error::{BoxError, Error, Result};
use crate::platform::PlatformService;
use crate::pr::{PullRequestController, PullRequestRecord};
use crate::progress::{ProgressCallback, TracingProgress};
use crate::status::{StatusWaiter, WaitConfig};
use crate::types::{CommitRequest, Credentials};
use crate::workspace::{GitTransport, Workspace};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// What to land and how to judge it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandRequest {
    /// Branch to create and push
    pub branch: String,
    /// Branch the PR targets
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: Option<String>,
    /// Status check that must pass on the PR head
    pub pr_check: String,
    /// Status check that must pass on the merge commit
    pub merge_check: String,
}

impl LandRequest {
    /// Land `branch` into `base`, requiring `check` before and after merge
    pub fn new(
        branch: impl Into<String>,
        base: impl Into<String>,
        title: impl Into<String>,
        check: impl Into<String>,
    ) -> Self {
        let check = check.into();
        Self {
            branch: branch.into(),
            base: base.into(),
            title: title.into(),
            body: None,
            pr_check: check.clone(),
            merge_check: check,
        }
    }

    /// Set the PR body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Use a different status check on the merge commit
    #[must_use]
    pub fn with_merge_check(mut self, check: impl Into<String>) -> Self {
        self.merge_check = check.into();
        self
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct LandReport {
    /// `Ok` if every stage completed
    pub outcome: Result<()>,
    /// Stages completed, in order
    pub stages: Vec<LandStage>,
    /// The pull request, if one was opened (also on failure)
    pub pull_request: Option<PullRequestRecord>,
    /// Workspace directory used by the run
    pub workspace_path: Option<PathBuf>,
    /// Cleanup failure; never changes `outcome`
    pub teardown_error: Option<Error>,
}

impl LandReport {
    /// Whether every stage completed
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The last stage reached
    pub fn last_stage(&self) -> Option<&LandStage> {
        self.stages.last()
    }

    /// Collapse into the run's result, dropping any teardown error
    pub fn into_result(self) -> Result<PullRequestRecord> {
        self.outcome?;
        self.pull_request
            .ok_or_else(|| Error::Internal("run succeeded without a pull request".to_string()))
    }
}

/// Runs the landing workflow
pub struct Lander {
    platform: Arc<dyn PlatformService>,
    transport: Arc<dyn GitTransport>,
    credentials: Credentials,
    progress: Arc<dyn ProgressCallback>,
    wait: WaitConfig,
    work_dir: PathBuf,
}

impl Lander {
    /// Create a lander that clones under the current directory
    pub fn new(
        platform: Arc<dyn PlatformService>,
        transport: Arc<dyn GitTransport>,
        credentials: Credentials,
    ) -> Self {
        Self {
            platform,
            transport,
            credentials,
            progress: Arc::new(TracingProgress),
            wait: WaitConfig::default(),
            work_dir: PathBuf::from("."),
        }
    }

    /// Report progress to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Use custom polling parameters for both status waits
    #[must_use]
    pub const fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Allocate workspaces under `dir` instead of the current directory
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Land the changes made by `mutate` on `name`
    ///
    /// Never returns early: the report carries the outcome, the stages
    /// reached, and any teardown failure. Clone, commit, push and teardown
    /// run on the blocking thread pool.
    pub async fn land<F>(&self, name: &RepoName, request: &LandRequest, mutate: F) -> LandReport
    where
        F: FnOnce(&Path) -> std::result::Result<CommitRequest, BoxError> + Send + 'static,
    {
        let mut stages = Vec::new();
        let mut controller = PullRequestController::new(Arc::clone(&self.platform));

        let workspace = match Workspace::new(
            name.clone(),
            self.credentials.clone(),
            Arc::clone(&self.transport),
            &self.work_dir,
        ) {
            Ok(workspace) => workspace,
            Err(e) => {
                return LandReport {
                    outcome: Err(e),
                    stages,
                    pull_request: None,
                    workspace_path: None,
                    teardown_error: None,
                };
            }
        };
        let workspace_path = workspace.path().to_path_buf();
        let workspace = Arc::new(Mutex::new(workspace));

        let outcome = self
            .drive(&workspace, &mut controller, &mut stages, request, mutate)
            .await;
        if let Err(e) = &outcome {
            warn!(repo = %name, error = %e, stage = ?stages.last(), "landing failed");
        }

        let teardown_error = on_blocking_pool(&workspace, Workspace::teardown)
            .await
            .err();

        LandReport {
            outcome,
            stages,
            pull_request: controller.into_record(),
            workspace_path: Some(workspace_path),
            teardown_error,
        }
    }

    async fn drive<F>(
        &self,
        workspace: &Arc<Mutex<Workspace>>,
        controller: &mut PullRequestController,
        stages: &mut Vec<LandStage>,
        request: &LandRequest,
        mutate: F,
    ) -> Result<()>
    where
        F: FnOnce(&Path) -> std::result::Result<CommitRequest, BoxError> + Send + 'static,
    {
        on_blocking_pool(workspace, Workspace::clone_remote).await?;
        self.advance(stages, LandStage::Cloned).await;

        let branch = request.branch.clone();
        let commit =
            on_blocking_pool(workspace, move |ws| ws.commit_and_push(&branch, mutate)).await?;
        self.advance(
            stages,
            LandStage::BranchPushed {
                branch: request.branch.clone(),
                commit,
            },
        )
        .await;

        let record = controller
            .create(
                &request.branch,
                &request.base,
                &request.title,
                request.body.as_deref(),
            )
            .await?;
        let created = LandStage::PrCreated {
            number: record.number(),
            url: record.html_url().to_string(),
        };
        self.advance(stages, created).await;

        let waiter = StatusWaiter::new(Arc::clone(&self.platform), self.wait)
            .with_progress(Arc::clone(&self.progress));

        let head = controller.fetch().await?.head_sha;
        self.progress
            .on_message(&format!("HEAD sha is {head}"))
            .await;
        waiter.wait(&head, &request.pr_check).await?;
        self.advance(stages, LandStage::PrStatusResolved { sha: head })
            .await;

        let merge_sha = controller.merge().await?;
        self.advance(
            stages,
            LandStage::Merged {
                sha: merge_sha.clone(),
            },
        )
        .await;

        waiter.wait(&merge_sha, &request.merge_check).await?;
        self.advance(stages, LandStage::MergeStatusResolved { sha: merge_sha })
            .await;

        Ok(())
    }

    async fn advance(&self, stages: &mut Vec<LandStage>, stage: LandStage) {
        info!(%stage, "landing progress");
        self.progress.on_stage(&stage).await;
        stages.push(stage);
    }
}

/// Run blocking git or filesystem work on the workspace off the async workers
///
/// A panic inside `work` poisons the lock; later calls (teardown) still get
/// the workspace.
async fn on_blocking_pool<T, W>(workspace: &Arc<Mutex<Workspace>>, work: W) -> Result<T>
where
    W: FnOnce(&mut Workspace) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let workspace = Arc::clone(workspace);
    tokio::task::spawn_blocking(move || {
        let mut guard = workspace.lock().unwrap_or_else(PoisonError::into_inner);
        work(&mut *guard)
    })
    .await
    .map_err(|e| Error::Internal(format!("workspace task failed: {e}")))?
}
