//! Shared command context for CLI commands
//!
//! Loads configuration, resolves credentials, and builds the platform and
//! git transport for one repository.

use prland::RepoName;
use prland::auth::get_github_auth;
use prland::config::{Config, load_config};
use prland::error::Result;
use prland::platform::{PlatformService, create_platform_service};
use prland::types::{Credentials, PlatformConfig};
use prland::workspace::{GitTransport, HttpsTransport};
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs to talk to GitHub about one repository
pub struct CommandContext {
    /// Loaded configuration, with CLI overrides applied
    pub config: Config,
    /// Credentials for git and the API
    pub credentials: Credentials,
    /// Platform service
    pub platform: Arc<dyn PlatformService>,
    /// Git transport
    pub transport: Arc<dyn GitTransport>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// - Load config (explicit path or default location)
    /// - Apply the host override
    /// - Resolve credentials
    /// - Create the platform service and transport
    pub async fn new(
        repo: &RepoName,
        config_path: Option<&Path>,
        host: Option<String>,
    ) -> Result<Self> {
        let mut config = load_config(config_path)?;
        if host.is_some() {
            config.github.host = host;
        }

        let auth = get_github_auth().await?;
        let credentials = auth.credentials;

        let platform_config = PlatformConfig {
            owner: repo.owner().to_string(),
            repo: repo.repo().to_string(),
            host: config.github.host.clone(),
        };
        let platform = create_platform_service(&platform_config, &credentials)?;
        let transport: Arc<dyn GitTransport> =
            Arc::new(HttpsTransport::new(config.github.host.clone()));

        Ok(Self {
            config,
            credentials,
            platform,
            transport,
        })
    }
}
