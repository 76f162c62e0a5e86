//! Normalized output records.

use serde::Serialize;
use serde_json::Value;
use slackflow_models::RecordShape;

use crate::envelope::{EnvelopeContext, RawEnvelope};
use crate::error::Result;

/// The data projection of an envelope handed to the consumer.
///
/// Capabilities such as the acknowledgment handle are not part of the
/// record; only plain data survives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub body: Value,
    pub payload: Value,
    pub context: EnvelopeContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<Value>,
}

impl OutputRecord {
    pub fn from_envelope(envelope: &RawEnvelope, shape: RecordShape) -> Self {
        let event = envelope.event().cloned();
        let mut record = Self {
            body: envelope.body.clone(),
            payload: envelope.payload_value().clone(),
            context: envelope.context.clone(),
            event,
            message: None,
            action: None,
            view: None,
        };

        if shape == RecordShape::Full {
            if envelope.event_type() == Some("message") {
                record.message = record.event.clone();
            }
            record.action = envelope.action().cloned();
            record.view = envelope.view().cloned();
        }

        record
    }

    pub fn into_value(self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::RecordingAck;
    use serde_json::json;
    use std::sync::Arc;

    fn message_envelope() -> RawEnvelope {
        RawEnvelope::event_callback(json!({
            "type": "event_callback",
            "team_id": "T1",
            "event": {"type": "message", "channel": "C100", "text": "hello"}
        }))
        .with_ack(Arc::new(RecordingAck::new()))
    }

    #[test]
    fn test_full_record_for_message() {
        let value = OutputRecord::from_envelope(&message_envelope(), RecordShape::Full)
            .into_value()
            .unwrap();

        assert_eq!(value["event"]["text"], "hello");
        assert_eq!(value["message"]["text"], "hello");
        assert_eq!(value["payload"]["channel"], "C100");
        assert_eq!(value["context"]["team_id"], "T1");
        assert!(value.get("ack").is_none());
        assert!(value.get("action").is_none());
    }

    #[test]
    fn test_compact_record() {
        let value = OutputRecord::from_envelope(&message_envelope(), RecordShape::Compact)
            .into_value()
            .unwrap();

        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in &keys {
            assert!(["body", "payload", "context", "event"].contains(key), "unexpected {}", key);
        }
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_full_record_for_action() {
        let envelope = RawEnvelope::interactive(json!({
            "type": "block_actions",
            "actions": [{"action_id": "approve"}]
        }))
        .unwrap();
        let record = OutputRecord::from_envelope(&envelope, RecordShape::Full);

        assert_eq!(record.action.as_ref().unwrap()["action_id"], "approve");
        assert_eq!(record.payload["action_id"], "approve");
        assert!(record.event.is_none());
        assert!(record.message.is_none());
    }

    #[test]
    fn test_non_message_event_has_no_message_field() {
        let envelope = RawEnvelope::event_callback(json!({
            "event": {"type": "reaction_added", "reaction": "tada"}
        }));
        let record = OutputRecord::from_envelope(&envelope, RecordShape::Full);
        assert!(record.message.is_none());
        assert_eq!(record.event.unwrap()["reaction"], "tada");
    }

    #[test]
    fn test_nested_structure_preserved() {
        let envelope = RawEnvelope::event_callback(json!({
            "event": {"type": "message", "blocks": [{"elements": [{"text": "deep"}]}]}
        }));
        let value = OutputRecord::from_envelope(&envelope, RecordShape::Full)
            .into_value()
            .unwrap();
        assert_eq!(value["event"]["blocks"][0]["elements"][0]["text"], "deep");
    }
}
