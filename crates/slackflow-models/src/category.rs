//! Category registry.
//!
//! Maps an operator-selected category identifier to the transport listener it
//! subscribes to and the filtering it supports. Parsing never fails: an
//! identifier that is not a known special case is subscribed as a literal
//! Events API event name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{CategoryInfo, find_category};

const MESSAGE_EVENT: &str = "message";
const MESSAGE_SCOPE_PREFIX: &str = "message.";

/// Transport listener a category is wired to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum WireListener {
    /// Events API envelope whose `event.type` equals the name.
    Event(String),
    /// Interactive component actions.
    Action,
    /// Modal submissions and closures.
    View,
}

impl fmt::Display for WireListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(name) => write!(f, "event:{}", name),
            Self::Action => write!(f, "action"),
            Self::View => write!(f, "view"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Added,
    Removed,
}

impl ReactionKind {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Added => "reaction_added",
            Self::Removed => "reaction_removed",
        }
    }
}

/// Handler family a category is dispatched through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Message,
    /// `message.<scope>`: a message event restricted to one `channel_type`.
    MessageScope {
        channel_type: String,
    },
    BlockActions,
    ViewSubmission,
    ViewClosed,
    Reaction(ReactionKind),
    Generic(String),
}

/// An operator-selected trigger category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category {
    id: String,
    kind: CategoryKind,
}

impl Category {
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        let kind = match id {
            MESSAGE_EVENT => CategoryKind::Message,
            "block_actions" => CategoryKind::BlockActions,
            "view_submission" => CategoryKind::ViewSubmission,
            "view_closed" => CategoryKind::ViewClosed,
            "reaction_added" => CategoryKind::Reaction(ReactionKind::Added),
            "reaction_removed" => CategoryKind::Reaction(ReactionKind::Removed),
            other => match other.strip_prefix(MESSAGE_SCOPE_PREFIX) {
                Some(scope) => CategoryKind::MessageScope {
                    channel_type: channel_type_for_scope(scope).to_string(),
                },
                None => CategoryKind::Generic(other.to_string()),
            },
        };

        Self {
            id: id.to_string(),
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &CategoryKind {
        &self.kind
    }

    pub fn wire_listener(&self) -> WireListener {
        match &self.kind {
            CategoryKind::Message | CategoryKind::MessageScope { .. } => {
                WireListener::Event(MESSAGE_EVENT.to_string())
            }
            CategoryKind::BlockActions => WireListener::Action,
            CategoryKind::ViewSubmission | CategoryKind::ViewClosed => WireListener::View,
            CategoryKind::Reaction(reaction) => {
                WireListener::Event(reaction.event_name().to_string())
            }
            CategoryKind::Generic(name) => WireListener::Event(name.clone()),
        }
    }

    /// Whether the category is a request awaiting acknowledgment.
    pub fn needs_ack(&self) -> bool {
        matches!(
            self.kind,
            CategoryKind::BlockActions | CategoryKind::ViewSubmission | CategoryKind::ViewClosed
        )
    }

    /// Whether a configured content pattern is applied to this category.
    pub fn supports_content_filter(&self) -> bool {
        matches!(
            self.kind,
            CategoryKind::Message | CategoryKind::MessageScope { .. } | CategoryKind::Reaction(_)
        )
    }

    /// `channel_type` value delivered events must report, for scope composites.
    pub fn scope_discriminator(&self) -> Option<&str> {
        match &self.kind {
            CategoryKind::MessageScope { channel_type } => Some(channel_type),
            _ => None,
        }
    }

    /// Catalog entry, when the category is a listed one.
    pub fn info(&self) -> Option<&'static CategoryInfo> {
        find_category(&self.id)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.id
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Map a `message.<scope>` suffix to the `channel_type` Slack reports.
pub fn channel_type_for_scope(scope: &str) -> &str {
    match scope {
        "channels" => "channel",
        "groups" => "group",
        "im" => "im",
        "mpim" => "mpim",
        "app_home" => "app_home",
        other => other,
    }
}
