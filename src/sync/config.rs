//! Remote store configuration

use std::collections::HashMap;

use serde::Deserialize;

use super::error::SyncError;

/// Environment variable prefix: `BILLBOOK_URL`, `BILLBOOK_API_KEY`,
/// `BILLBOOK_WORKSPACE`.
pub const ENV_PREFIX: &str = "BILLBOOK";

/// Workspace used when none is configured.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Connection settings for the remote row store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Project base URL, without the `/rest/v1` suffix.
    #[serde(default)]
    pub url: String,
    /// Anonymous API key, sent as `apikey` and as bearer token.
    #[serde(default)]
    pub api_key: String,
    /// Every row is scoped to this `workspace_id`.
    #[serde(default = "default_workspace")]
    pub workspace: String,
}

fn default_workspace() -> String {
    DEFAULT_WORKSPACE.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            workspace: default_workspace(),
        }
    }
}

impl SyncConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            workspace: workspace.into(),
        }
        .normalized()
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from an explicit variable map, keyed like the
    /// environment (`BILLBOOK_URL`, ...).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SyncError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(source: config::Environment) -> Result<Self, SyncError> {
        let config: Self = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.url = self.url.trim().trim_end_matches('/').to_string();
        self.api_key = self.api_key.trim().to_string();
        let workspace = self.workspace.trim();
        self.workspace = if workspace.is_empty() {
            default_workspace()
        } else {
            workspace.to_string()
        };
        self
    }

    /// Both URL and key are present.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.api_key.is_empty()
    }

    /// Base of the REST endpoints, e.g. `https://x.example/rest/v1`.
    pub fn rest_base(&self) -> Result<String, SyncError> {
        if self.is_configured() {
            Ok(format!("{}/rest/v1", self.url))
        } else {
            Err(SyncError::NotConfigured)
        }
    }
}
