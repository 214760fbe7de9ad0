//! GitHub credential lookup

use super::AuthSource;
use crate::error::{Error, Result};
use crate::types::Credentials;
use tokio::process::Command;
use tracing::debug;

/// Username sent with a token when none is configured
///
/// GitHub ignores the username for token auth over HTTPS.
pub const DEFAULT_USERNAME: &str = "x-access-token";

/// Token variables, in priority order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Username variables, in priority order
const USER_VARS: [&str; 2] = ["GITHUB_USER", "GITHUB_ACTOR"];

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Username and token
    pub credentials: Credentials,
    /// Where the token came from
    pub source: AuthSource,
}

/// Resolve credentials from `lookup` (an environment accessor)
///
/// Returns `None` if no token variable is set to a non-empty value.
pub fn resolve_github_auth<F>(lookup: F) -> Option<GitHubAuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let token = first_set(&lookup, &TOKEN_VARS)?;
    let username =
        first_set(&lookup, &USER_VARS).unwrap_or_else(|| DEFAULT_USERNAME.to_string());

    Some(GitHubAuthConfig {
        credentials: Credentials::new(username, token),
        source: AuthSource::EnvVar,
    })
}

/// First variable in `names` with a non-empty value
fn first_set<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Get GitHub credentials from the environment, falling back to `gh auth token`
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    if let Some(config) = resolve_github_auth(|name| std::env::var(name).ok()) {
        debug!("using GitHub token from environment");
        return Ok(config);
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .map_err(|e| {
            Error::Auth(format!(
                "no GITHUB_TOKEN/GH_TOKEN set and failed to run 'gh auth token': {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(Error::Auth(
            "no GITHUB_TOKEN/GH_TOKEN set and 'gh auth token' failed; run 'gh auth login'"
                .to_string(),
        ));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(Error::Auth("'gh auth token' returned an empty token".to_string()));
    }

    let username = first_set(&|name: &str| std::env::var(name).ok(), &USER_VARS)
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

    debug!("using GitHub token from gh CLI");
    Ok(GitHubAuthConfig {
        credentials: Credentials::new(username, token),
        source: AuthSource::Cli,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_no_token_resolves_nothing() {
        assert!(resolve_github_auth(env(&[("GITHUB_USER", "bot")])).is_none());
        assert!(resolve_github_auth(env(&[("GITHUB_TOKEN", "  ")])).is_none());
    }

    #[test]
    fn test_github_token_preferred_over_gh_token() {
        let config =
            resolve_github_auth(env(&[("GITHUB_TOKEN", "primary"), ("GH_TOKEN", "fallback")]))
                .unwrap();
        assert_eq!(config.credentials.token(), "primary");
        assert_eq!(config.source, AuthSource::EnvVar);
    }

    #[test]
    fn test_username_defaults() {
        let config = resolve_github_auth(env(&[("GH_TOKEN", "t")])).unwrap();
        assert_eq!(config.credentials.username(), DEFAULT_USERNAME);

        let config =
            resolve_github_auth(env(&[("GH_TOKEN", "t"), ("GITHUB_ACTOR", "ci-bot")])).unwrap();
        assert_eq!(config.credentials.username(), "ci-bot");
    }
}
