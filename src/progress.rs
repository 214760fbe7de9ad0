//! Progress reporting for a landing run
//!
//! Library code never prints; it reports through a [`ProgressCallback`]
//! supplied by the caller.

use crate::land::LandStage;
use async_trait::async_trait;
use tracing::info;

/// Receives progress events from [`Lander`](crate::land::Lander) and
/// [`StatusWaiter`](crate::status::StatusWaiter)
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A stage of the run completed
    async fn on_stage(&self, stage: &LandStage);

    /// Started waiting on `context` for commit `sha`
    async fn on_waiting(&self, sha: &str, context: &str) {
        self.on_message(&format!("Waiting for '{context}' on {sha}"))
            .await;
    }

    /// Free-form progress message
    async fn on_message(&self, message: &str);
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_stage(&self, _stage: &LandStage) {}

    async fn on_message(&self, _message: &str) {}
}

/// Forwards progress to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

#[async_trait]
impl ProgressCallback for TracingProgress {
    async fn on_stage(&self, stage: &LandStage) {
        info!(%stage, "stage complete");
    }

    async fn on_waiting(&self, sha: &str, context: &str) {
        info!(sha, context, "waiting for status check");
    }

    async fn on_message(&self, message: &str) {
        info!("{message}");
    }
}
