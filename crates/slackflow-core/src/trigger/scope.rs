//! Scope filter: restricts events to a set of conversations.

use regex::Regex;
use serde_json::Value;
use slackflow_models::TriggerSettings;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::warn;

type LocationProbe = fn(&Value) -> Option<&str>;

/// Probes tried in order to find where an event happened.
const LOCATION_PROBES: &[LocationProbe] = &[
    direct_channel,
    item_channel,
    item_channel_id,
    first_file_channel,
];

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn direct_channel(event: &Value) -> Option<&str> {
    let channel = event.get("channel")?;
    // channel lifecycle events carry the channel as an object
    non_empty(Some(channel)).or_else(|| non_empty(channel.get("id")))
}

fn item_channel(event: &Value) -> Option<&str> {
    non_empty(event.pointer("/item/channel"))
}

fn item_channel_id(event: &Value) -> Option<&str> {
    non_empty(event.pointer("/item/channel_id"))
}

fn first_file_channel(event: &Value) -> Option<&str> {
    non_empty(event.pointer("/file/channels/0"))
}

/// Resolve the conversation id an event belongs to, if it has one.
pub fn resolve_location(event: &Value) -> Option<&str> {
    LOCATION_PROBES.iter().find_map(|probe| probe(event))
}

/// Whether an id has the shape of a Slack conversation id.
pub fn looks_like_conversation_id(id: &str) -> bool {
    static CONVERSATION_ID: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[CGD][A-Z0-9]{8,}$").expect("invalid conversation id regex")
    });
    CONVERSATION_ID.is_match(id)
}

#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    channel_ids: Vec<String>,
    index: HashSet<String>,
}

impl ScopeFilter {
    pub fn new(channel_ids: impl IntoIterator<Item = String>) -> Self {
        let mut index = HashSet::new();
        let channel_ids = channel_ids
            .into_iter()
            .filter(|id| !id.is_empty() && index.insert(id.clone()))
            .collect();

        Self { channel_ids, index }
    }

    pub fn from_settings(settings: &TriggerSettings) -> Self {
        for id in settings.typed_channel_ids() {
            if !looks_like_conversation_id(id) {
                warn!(channel_id = %id, "Channel id does not look like a Slack conversation id");
            }
        }

        Self::new(settings.scope_channel_ids())
    }

    pub fn is_empty(&self) -> bool {
        self.channel_ids.is_empty()
    }

    pub fn channel_ids(&self) -> &[String] {
        &self.channel_ids
    }

    /// Rejects only events with a known location outside a non-empty scope.
    pub fn accepts(&self, event: &Value) -> bool {
        if self.is_empty() {
            return true;
        }

        match resolve_location(event) {
            Some(location) => self.index.contains(location),
            None => true,
        }
    }
}
