//! Authentication for GitHub
//!
//! Supports environment variables and the `gh` CLI.

mod github;

pub use github::{DEFAULT_USERNAME, GitHubAuthConfig, get_github_auth, resolve_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
}
