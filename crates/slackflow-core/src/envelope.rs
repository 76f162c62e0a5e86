//! Raw event envelopes delivered by the transport.
//!
//! An envelope is owned by the handler invocation that receives it and is
//! dropped once dispatch completes. Its shape depends on the kind of
//! occurrence: Events API callbacks carry an `event`, interactive actions an
//! `action`, modal payloads a `view`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Acknowledgment capability for request/response style envelopes.
#[async_trait]
pub trait Acknowledge: Send + Sync {
    async fn ack(&self) -> Result<()>;
}

/// Kind-specific sub-object of an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopePayload {
    Event { event: Value },
    Action { action: Value },
    View { view: Value },
}

/// Transport metadata forwarded to the consumer as `context`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvelopeContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope_id: Option<String>,
    pub retry_attempt: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_id: Option<String>,
    pub is_enterprise_install: bool,
}

impl EnvelopeContext {
    /// Pull workspace identifiers out of a callback body.
    pub fn from_body(body: &Value) -> Self {
        let team_id = str_at(body, &["/team_id", "/team/id", "/user/team_id"]);
        let enterprise_id = str_at(body, &["/enterprise_id", "/enterprise/id"]);

        Self {
            team_id,
            enterprise_id,
            is_enterprise_install: body
                .get("is_enterprise_install")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            ..Self::default()
        }
    }

    pub fn with_envelope_id(mut self, envelope_id: impl Into<String>) -> Self {
        self.envelope_id = Some(envelope_id.into());
        self
    }

    pub fn with_retry(mut self, attempt: u32, reason: Option<String>) -> Self {
        self.retry_attempt = attempt;
        self.retry_reason = reason;
        self
    }
}

fn str_at(body: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// One delivered occurrence.
#[derive(Clone)]
pub struct RawEnvelope {
    pub body: Value,
    pub payload: EnvelopePayload,
    pub context: EnvelopeContext,
    ack: Option<Arc<dyn Acknowledge>>,
}

impl RawEnvelope {
    /// Envelope for an Events API callback body (`{ "event": {...}, ... }`).
    pub fn event_callback(body: Value) -> Self {
        let event = body.get("event").cloned().unwrap_or(Value::Null);
        Self::new(body, EnvelopePayload::Event { event })
    }

    /// Envelope for an interactive payload. Returns `None` for interaction
    /// types no category listens to (shortcuts, suggestions, ...).
    pub fn interactive(body: Value) -> Option<Self> {
        let payload = match body.get("type").and_then(Value::as_str)? {
            "block_actions" | "interactive_message" => EnvelopePayload::Action {
                action: body.pointer("/actions/0").cloned().unwrap_or(Value::Null),
            },
            "view_submission" | "view_closed" => EnvelopePayload::View {
                view: body.get("view").cloned().unwrap_or(Value::Null),
            },
            _ => return None,
        };

        Some(Self::new(body, payload))
    }

    pub fn new(body: Value, payload: EnvelopePayload) -> Self {
        let context = EnvelopeContext::from_body(&body);
        Self {
            body,
            payload,
            context,
            ack: None,
        }
    }

    pub fn with_ack(mut self, ack: Arc<dyn Acknowledge>) -> Self {
        self.ack = Some(ack);
        self
    }

    pub fn with_context(mut self, context: EnvelopeContext) -> Self {
        self.context = context;
        self
    }

    pub fn ack_capability(&self) -> Option<&Arc<dyn Acknowledge>> {
        self.ack.as_ref()
    }

    pub fn event(&self) -> Option<&Value> {
        match &self.payload {
            EnvelopePayload::Event { event } if !event.is_null() => Some(event),
            _ => None,
        }
    }

    pub fn action(&self) -> Option<&Value> {
        match &self.payload {
            EnvelopePayload::Action { action } => Some(action),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<&Value> {
        match &self.payload {
            EnvelopePayload::View { view } => Some(view),
            _ => None,
        }
    }

    /// The kind-specific sub-object, forwarded as `payload`.
    pub fn payload_value(&self) -> &Value {
        match &self.payload {
            EnvelopePayload::Event { event } => event,
            EnvelopePayload::Action { action } => action,
            EnvelopePayload::View { view } => view,
        }
    }

    /// `event.type` for Events API envelopes.
    pub fn event_type(&self) -> Option<&str> {
        self.event()
            .and_then(|event| event.get("type"))
            .and_then(Value::as_str)
    }

    /// `type` of the body (`block_actions`, `view_submission`, ...).
    pub fn body_type(&self) -> Option<&str> {
        self.body.get("type").and_then(Value::as_str)
    }
}

impl fmt::Debug for RawEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawEnvelope")
            .field("body", &self.body)
            .field("payload", &self.payload)
            .field("context", &self.context)
            .field("ack", &self.ack.is_some())
            .finish()
    }
}
