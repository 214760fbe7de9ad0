//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use prland::error::{Error, Result};
use prland::platform::PlatformService;
use prland::types::{CommitStatus, MergeResult, PullRequest, PullRequestState, StatusState};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Scripted status pages per commit (the last page repeats)
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    next_pr_number: AtomicU64,
    head_sha: Mutex<Option<String>>,
    mergeable: Mutex<Option<bool>>,
    status_feeds: Mutex<HashMap<String, VecDeque<Vec<CommitStatus>>>>,
    default_statuses: Mutex<Vec<CommitStatus>>,
    merge_response: Mutex<Option<MergeResult>>,
    // Call tracking
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    get_pr_calls: Mutex<Vec<u64>>,
    list_statuses_calls: Mutex<Vec<String>>,
    merge_pr_calls: Mutex<Vec<u64>>,
    // Error injection
    error_on_create_pr: Mutex<Option<String>>,
    error_on_get_pr: Mutex<Option<String>>,
    error_on_list_statuses: Mutex<Option<String>>,
    error_on_merge_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a mock where everything succeeds and no statuses exist
    pub fn new() -> Self {
        Self {
            next_pr_number: AtomicU64::new(1),
            head_sha: Mutex::new(None),
            mergeable: Mutex::new(Some(true)),
            status_feeds: Mutex::new(HashMap::new()),
            default_statuses: Mutex::new(Vec::new()),
            merge_response: Mutex::new(None),
            create_pr_calls: Mutex::new(Vec::new()),
            get_pr_calls: Mutex::new(Vec::new()),
            list_statuses_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            error_on_create_pr: Mutex::new(None),
            error_on_get_pr: Mutex::new(None),
            error_on_list_statuses: Mutex::new(None),
            error_on_merge_pr: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_pr` return an error
    pub fn fail_get_pr(&self, msg: &str) {
        *self.error_on_get_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_statuses` return an error
    pub fn fail_list_statuses(&self, msg: &str) {
        *self.error_on_list_statuses.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` return an error
    pub fn fail_merge_pr(&self, msg: &str) {
        *self.error_on_merge_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Response configuration ===

    /// Head SHA reported by `get_pr` (default `head_sha_<n>`)
    pub fn set_head_sha(&self, sha: &str) {
        *self.head_sha.lock().unwrap() = Some(sha.to_string());
    }

    /// Mergeable flag reported by `get_pr` (default `Some(true)`)
    pub fn set_mergeable(&self, mergeable: Option<bool>) {
        *self.mergeable.lock().unwrap() = mergeable;
    }

    /// Response for `merge_pr` (default merged with `merge_sha_<n>`)
    pub fn set_merge_response(&self, result: MergeResult) {
        *self.merge_response.lock().unwrap() = Some(result);
    }

    /// Queue a page of statuses for `sha`; the last queued page repeats
    pub fn push_status_page(&self, sha: &str, page: Vec<CommitStatus>) {
        self.status_feeds
            .lock()
            .unwrap()
            .entry(sha.to_string())
            .or_default()
            .push_back(page);
    }

    /// Statuses returned for commits without a scripted feed
    pub fn set_default_statuses(&self, statuses: Vec<CommitStatus>) {
        *self.default_statuses.lock().unwrap() = statuses;
    }

    /// Report `context` as successful on every commit
    pub fn pass_everything(&self, context: &str) {
        self.set_default_statuses(vec![CommitStatus::new(context, StatusState::Success)]);
    }

    // === Call verification methods ===

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `get_pr` calls
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Get the SHA of every `list_statuses` call
    pub fn get_list_statuses_calls(&self) -> Vec<String> {
        self.list_statuses_calls.lock().unwrap().clone()
    }

    /// Number of `list_statuses` calls so far
    pub fn list_statuses_count(&self) -> usize {
        self.list_statuses_calls.lock().unwrap().len()
    }

    /// PR numbers passed to `merge_pr`
    pub fn get_merge_pr_calls(&self) -> Vec<u64> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Get count of `merge_pr` calls
    pub fn merge_call_count(&self) -> usize {
        self.merge_pr_calls.lock().unwrap().len()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that `merge_pr` was NOT called
    pub fn assert_merge_not_called(&self) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.is_empty(),
            "Expected merge_pr NOT to be called but it was: {calls:?}"
        );
    }
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
        });

        // Check for injected error
        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            head_sha: String::new(),
        })
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequestState> {
        self.get_pr_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.error_on_get_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let head_sha = self
            .head_sha
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("head_sha_{pr_number}"));
        Ok(PullRequestState {
            number: pr_number,
            head_sha,
            mergeable: *self.mergeable.lock().unwrap(),
        })
    }

    async fn list_statuses(&self, sha: &str, _per_page: u8) -> Result<Vec<CommitStatus>> {
        self.list_statuses_calls
            .lock()
            .unwrap()
            .push(sha.to_string());

        if let Some(msg) = self.error_on_list_statuses.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let mut feeds = self.status_feeds.lock().unwrap();
        match feeds.get_mut(sha) {
            Some(feed) if feed.len() > 1 => Ok(feed.pop_front().unwrap_or_default()),
            Some(feed) => Ok(feed.front().cloned().unwrap_or_default()),
            None => Ok(self.default_statuses.lock().unwrap().clone()),
        }
    }

    async fn merge_pr(&self, pr_number: u64) -> Result<MergeResult> {
        self.merge_pr_calls.lock().unwrap().push(pr_number);

        // Check for injected error
        if let Some(msg) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self
            .merge_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| MergeResult {
                merged: true,
                sha: Some(format!("merge_sha_{pr_number}")),
                message: None,
            }))
    }
}
