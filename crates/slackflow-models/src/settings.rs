//! Trigger activation settings.
//!
//! Created once per activation and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::category::Category;

/// Flags applied when the operator leaves the flags field untouched.
pub const DEFAULT_REGEX_FLAGS: &str = "g";

/// Delay before the transport reconnects after the server drops the socket.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2_000;

/// How a channel reference was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRefMode {
    /// Picked from the channel directory.
    #[default]
    List,
    /// Typed in as a raw conversation id.
    Id,
}

/// A channel picked by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    #[serde(default)]
    pub mode: ChannelRefMode,
    #[serde(default)]
    pub value: String,
}

impl ChannelRef {
    pub fn list(value: impl Into<String>) -> Self {
        Self {
            mode: ChannelRefMode::List,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self {
            mode: ChannelRefMode::Id,
            value: value.into(),
        }
    }

    /// The referenced conversation id, if one was set.
    pub fn channel_id(&self) -> Option<&str> {
        let value = self.value.trim();
        (!value.is_empty()).then_some(value)
    }
}

/// Shape of the record forwarded to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    /// Every data field of the envelope.
    #[default]
    Full,
    /// Only `body`, `payload`, `context` and `event`.
    Compact,
}

/// How the host drives an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Persistent activation, runs until stopped.
    #[default]
    Trigger,
    /// Test run, stopped by the host after the first forwarded record.
    Manual,
}

/// Operator configuration consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSettings {
    /// Selected categories
    #[serde(default)]
    pub trigger_on: Vec<Category>,
    /// Content pattern; empty disables content filtering
    #[serde(default)]
    pub regex_pattern: String,
    #[serde(default = "default_regex_flags")]
    pub regex_flags: String,
    #[serde(default)]
    pub channels_to_watch: Vec<ChannelRef>,
    /// Deprecated single-channel field, merged with `channels_to_watch`
    #[serde(default)]
    pub channel_to_watch: Option<ChannelRef>,
    #[serde(default)]
    pub record_shape: RecordShape,
}

fn default_regex_flags() -> String {
    DEFAULT_REGEX_FLAGS.to_string()
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            trigger_on: Vec::new(),
            regex_pattern: String::new(),
            regex_flags: default_regex_flags(),
            channels_to_watch: Vec::new(),
            channel_to_watch: None,
            record_shape: RecordShape::default(),
        }
    }
}

impl TriggerSettings {
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            trigger_on: categories.into_iter().map(Category::parse).collect(),
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        self.regex_pattern = pattern.into();
        self.regex_flags = flags.into();
        self
    }

    pub fn with_channel(mut self, channel: ChannelRef) -> Self {
        self.channels_to_watch.push(channel);
        self
    }

    pub fn with_legacy_channel(mut self, channel: ChannelRef) -> Self {
        self.channel_to_watch = Some(channel);
        self
    }

    pub fn with_record_shape(mut self, shape: RecordShape) -> Self {
        self.record_shape = shape;
        self
    }

    /// Selected categories with duplicates removed, in selection order.
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = HashSet::new();
        self.trigger_on
            .iter()
            .filter(|category| !category.id().is_empty())
            .filter(|category| seen.insert(category.id().to_string()))
            .cloned()
            .collect()
    }

    /// Union of the multi-select list and the legacy field, first-seen order.
    pub fn scope_channel_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.channels_to_watch
            .iter()
            .chain(self.channel_to_watch.iter())
            .filter_map(ChannelRef::channel_id)
            .filter(|id| seen.insert(id.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Channel references typed in by id, for format checks.
    pub fn typed_channel_ids(&self) -> Vec<&str> {
        self.channels_to_watch
            .iter()
            .chain(self.channel_to_watch.iter())
            .filter(|channel| channel.mode == ChannelRefMode::Id)
            .filter_map(ChannelRef::channel_id)
            .collect()
    }
}

/// Transport connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Proxy for Web API calls; falls back to `HTTPS_PROXY` / `HTTP_PROXY`
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            proxy_url: None,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}
