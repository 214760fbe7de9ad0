//! prland - land file changes on GitHub unattended
//!
//! Clones a repository, commits caller-supplied changes to a fresh branch,
//! opens a pull request, waits for a status check, merges, and waits for the
//! post-merge status check.

pub mod auth;
pub mod config;
pub mod error;
pub mod land;
pub mod platform;
pub mod pr;
pub mod progress;
pub mod repo_name;
pub mod status;
pub mod types;
pub mod workspace;

pub use error::{Error, Result};
pub use repo_name::RepoName;
