//! Slack Web API client.
//!
//! Covers the two calls the trigger needs: opening a Socket Mode connection
//! and listing channels for scope selection.

use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slackflow_models::ConnectionSettings;
use tracing::debug;

use crate::error::{Result, TriggerError};

pub const SLACK_API_BASE: &str = "https://slack.com/api";

const CHANNEL_PAGE_LIMIT: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub is_private: bool,
}

impl ChannelSummary {
    pub fn display_name(&self) -> String {
        format!("#{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SlackWebClient {
    client: Client,
    api_base: String,
}

impl SlackWebClient {
    /// Build a client. An explicit `proxy_url` wins; otherwise the usual
    /// proxy environment variables apply.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(proxy_url) = settings.proxy_url.as_deref().filter(|url| !url.is_empty()) {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            api_base: SLACK_API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Request a Socket Mode WebSocket URL with the app-level token.
    pub async fn open_connection(&self, app_token: &str) -> Result<String> {
        let body = self.call("apps.connections.open", app_token, &[]).await?;

        body["url"]
            .as_str()
            .map(|url| url.to_string())
            .ok_or_else(|| TriggerError::SlackApi("missing 'url' in apps.connections.open response".to_string()))
    }

    /// All non-archived public and private channels visible to the bot.
    pub async fn list_channels(&self, bot_token: &str) -> Result<Vec<ChannelSummary>> {
        let mut channels = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut params = vec![
                ("types", "public_channel,private_channel".to_string()),
                ("exclude_archived", "true".to_string()),
                ("limit", CHANNEL_PAGE_LIMIT.to_string()),
            ];
            if !cursor.is_empty() {
                params.push(("cursor", cursor.clone()));
            }

            let body = self.call("conversations.list", bot_token, &params).await?;
            if let Some(page) = body["channels"].as_array() {
                channels.extend(page.iter().filter_map(parse_channel));
            }

            cursor = body
                .pointer("/response_metadata/next_cursor")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            if cursor.is_empty() {
                break;
            }
        }

        debug!(count = channels.len(), "Listed Slack channels");
        Ok(channels)
    }

    async fn call(&self, method: &str, token: &str, params: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .bearer_auth(token)
            .form(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TriggerError::SlackApi(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let body: Value = resp.json().await?;
        if body["ok"].as_bool() != Some(true) {
            let err = body["error"].as_str().unwrap_or("unknown");
            return Err(TriggerError::SlackApi(format!("{} failed: {}", method, err)));
        }

        Ok(body)
    }
}

fn parse_channel(channel: &Value) -> Option<ChannelSummary> {
    let id = channel["id"].as_str().filter(|id| !id.is_empty())?;
    let name = channel["name"].as_str().filter(|name| !name.is_empty())?;

    Some(ChannelSummary {
        id: id.to_string(),
        name: name.to_string(),
        purpose: channel
            .pointer("/purpose/value")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        is_private: channel["is_private"].as_bool().unwrap_or(false),
    })
}
