//! CLI configuration file support
//!
//! Loads configuration from ~/.config/slackflow/config.toml

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use slackflow_models::{ConnectionSettings, SlackCredentials, TriggerSettings};
use std::path::{Path, PathBuf};

pub const BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
pub const APP_TOKEN_ENV: &str = "SLACK_APP_TOKEN";
pub const SIGNING_SECRET_ENV: &str = "SLACK_SIGNING_SECRET";

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Slack app credentials
    #[serde(default)]
    pub credentials: SlackCredentials,
    /// Categories and filters
    #[serde(default)]
    pub trigger: TriggerSettings,
    /// Proxy and reconnect settings
    #[serde(default)]
    pub connection: ConnectionSettings,
}

impl CliConfig {
    /// Load from an explicit path, or from the default path when none is given.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::load_from_path(Some(path.to_path_buf()))
            }
            None => Self::load_from_path(Self::default_path()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("slackflow").join("config.toml"))
    }

    /// Credentials with environment overrides applied.
    pub fn credentials(&self) -> SlackCredentials {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    fn credentials_with(&self, lookup: impl Fn(&str) -> Option<String>) -> SlackCredentials {
        self.credentials.clone().with_overrides(
            lookup(BOT_TOKEN_ENV),
            lookup(APP_TOKEN_ENV),
            lookup(SIGNING_SECRET_ENV),
        )
    }
}
