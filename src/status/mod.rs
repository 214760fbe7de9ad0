//! Waiting on a named commit status check
//!
//! [`StatusWaiter::wait`] spawns one polling task per call and races its
//! result against the deadline. The task checks a cancellation token before
//! every re-poll and while a request is in flight, and the waiter cancels and
//! joins it on every exit path, so a timed-out wait leaves nothing running.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::progress::{NoopProgress, ProgressCallback};
use crate::types::{CommitStatus, StatusState};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Default delay between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default overall deadline for one wait
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Default number of statuses requested per poll
pub const DEFAULT_PER_PAGE: u8 = 20;

/// Polling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay before each poll
    pub poll_interval: Duration,
    /// Give up after this long without a terminal state
    pub timeout: Duration,
    /// Statuses requested per poll
    pub per_page: u8,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Outcome of observing one status check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusVerdict {
    /// No terminal state yet (including no matching entry)
    Pending,
    /// Check passed
    Success,
    /// Check failed
    Failure,
    /// Check errored
    Error,
}

impl StatusVerdict {
    /// Whether polling should stop
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for StatusVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Classify a page of statuses for `context`
///
/// The first entry whose context matches decides. GitHub lists statuses
/// newest first, so for re-run checks this is the most recent entry.
pub fn evaluate(statuses: &[CommitStatus], context: &str) -> StatusVerdict {
    statuses
        .iter()
        .find(|s| s.context == context)
        .map_or(StatusVerdict::Pending, |s| match s.state {
            StatusState::Success => StatusVerdict::Success,
            StatusState::Failure => StatusVerdict::Failure,
            StatusState::Error => StatusVerdict::Error,
            StatusState::Pending | StatusState::Other(_) => StatusVerdict::Pending,
        })
}

/// Polls one status check on one commit until it resolves
pub struct StatusWaiter {
    platform: Arc<dyn PlatformService>,
    config: WaitConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl StatusWaiter {
    /// Create a waiter with the given polling parameters
    pub fn new(platform: Arc<dyn PlatformService>, config: WaitConfig) -> Self {
        Self {
            platform,
            config,
            progress: Arc::new(NoopProgress),
        }
    }

    /// Report waiting progress to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Wait until `context` on `sha` succeeds
    ///
    /// Fails with [`Error::StatusFailed`] on a failure/error state,
    /// [`Error::StatusTransport`] if listing statuses fails, and
    /// [`Error::StatusTimeout`] once the deadline passes.
    pub async fn wait(&self, sha: &str, context: &str) -> Result<()> {
        self.progress.on_waiting(sha, context).await;
        debug!(sha, context, timeout = ?self.config.timeout, "waiting for status");

        let cancel = CancellationToken::new();
        // Cancels the poller if this future is dropped mid-wait
        let _guard = cancel.clone().drop_guard();
        let (tx, rx) = oneshot::channel();

        let poller = tokio::spawn(poll_until_resolved(
            Arc::clone(&self.platform),
            sha.to_string(),
            context.to_string(),
            self.config,
            cancel.clone(),
            tx,
        ));

        let outcome = tokio::select! {
            reported = rx => reported.unwrap_or_else(|_| {
                Err(Error::Internal("status poller exited without a result".to_string()))
            }),
            () = tokio::time::sleep(self.config.timeout) => Err(Error::StatusTimeout {
                sha: sha.to_string(),
                context: context.to_string(),
                timeout: self.config.timeout,
            }),
        };

        cancel.cancel();
        if let Err(e) = poller.await {
            warn!(error = %e, "status poller did not shut down cleanly");
        }

        match &outcome {
            Ok(()) => debug!(sha, context, "status check passed"),
            Err(e) => debug!(sha, context, error = %e, "status wait ended"),
        }
        outcome
    }
}

/// Poll until a terminal state, a transport error, or cancellation
///
/// Sends exactly one result unless cancelled first.
async fn poll_until_resolved(
    platform: Arc<dyn PlatformService>,
    sha: String,
    context: String,
    config: WaitConfig,
    cancel: CancellationToken,
    tx: oneshot::Sender<Result<()>>,
) {
    let mut polls: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(config.poll_interval) => {}
        }

        let listed = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            listed = platform.list_statuses(&sha, config.per_page) => listed,
        };
        polls += 1;

        let outcome = match listed {
            Err(e) => Err(Error::StatusTransport {
                sha: sha.clone(),
                source: Box::new(e),
            }),
            Ok(statuses) => match evaluate(&statuses, &context) {
                StatusVerdict::Success => Ok(()),
                verdict @ (StatusVerdict::Failure | StatusVerdict::Error) => {
                    Err(Error::StatusFailed {
                        sha: sha.clone(),
                        context: context.clone(),
                        state: verdict.to_string(),
                    })
                }
                StatusVerdict::Pending => {
                    trace!(sha, context, polls, "status not resolved yet");
                    continue;
                }
            },
        };

        // A closed receiver means the deadline already won
        let _ = tx.send(outcome);
        return;
    }

    debug!(sha, context, polls, "status poller cancelled");
}
