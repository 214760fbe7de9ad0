//! Shared test utilities

#![allow(dead_code)]

mod local_repo;
mod mock_platform;

pub use local_repo::{LocalRemote, LocalTransport};
pub use mock_platform::{CreatePrCall, MockPlatformService};

use async_trait::async_trait;
use prland::land::LandStage;
use prland::progress::ProgressCallback;
use prland::status::WaitConfig;
use prland::types::Credentials;
use std::sync::Mutex;
use std::time::Duration;

/// Credentials that are never sent anywhere
pub fn test_credentials() -> Credentials {
    Credentials::new("x-access-token", "test-token")
}

/// Fast polling for tests
pub fn fast_wait(timeout: Duration) -> WaitConfig {
    WaitConfig {
        poll_interval: Duration::from_millis(10),
        timeout,
        per_page: 20,
    }
}

/// Progress callback that records everything it is told
#[derive(Default)]
pub struct RecordingProgress {
    stages: Mutex<Vec<LandStage>>,
    waits: Mutex<Vec<(String, String)>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn stages(&self) -> Vec<LandStage> {
        self.stages.lock().unwrap().clone()
    }

    pub fn waits(&self) -> Vec<(String, String)> {
        self.waits.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_stage(&self, stage: &LandStage) {
        self.stages.lock().unwrap().push(stage.clone());
    }

    async fn on_waiting(&self, sha: &str, context: &str) {
        self.waits
            .lock()
            .unwrap()
            .push((sha.to_string(), context.to_string()));
    }

    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
