use async_trait::async_trait;
use serde_json::{Value, json};
use slackflow_models::{ChannelRef, RecordShape, TriggerSettings, WireListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{Dispatcher, DispatcherState};
use crate::envelope::RawEnvelope;
use crate::error::{Result, TriggerError};
use crate::sink::{ChannelSink, RecordSink};
use crate::transport::mock::{MockTransport, RecordingAck};

struct Harness {
    dispatcher: Dispatcher,
    transport: Arc<MockTransport>,
    records: mpsc::Receiver<Value>,
}

impl Harness {
    async fn started(settings: TriggerSettings) -> Self {
        let harness = Self::idle(settings, MockTransport::new());
        harness.dispatcher.start().await.unwrap();
        harness
    }

    fn idle(settings: TriggerSettings, transport: MockTransport) -> Self {
        let transport = Arc::new(transport);
        let (sink, records) = ChannelSink::channel(64);
        let dispatcher = Dispatcher::new(&settings, transport.clone(), Arc::new(sink)).unwrap();
        Self {
            dispatcher,
            transport,
            records,
        }
    }

    async fn deliver(&self, envelope: RawEnvelope) -> usize {
        self.transport.deliver(envelope).await
    }

    fn drain(&mut self) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(record) = self.records.try_recv() {
            out.push(record);
        }
        out
    }
}

fn message_in(channel: &str, text: &str) -> RawEnvelope {
    RawEnvelope::event_callback(json!({
        "type": "event_callback",
        "event": {
            "type": "message",
            "channel": channel,
            "channel_type": "channel",
            "text": text,
            "ts": "1700000000.000100"
        }
    }))
}

fn reaction(name: &str, channel: &str) -> RawEnvelope {
    RawEnvelope::event_callback(json!({
        "event": {
            "type": "reaction_added",
            "reaction": name,
            "item": {"type": "message", "channel": channel, "ts": "1700000000.1"}
        }
    }))
}

fn block_action(action_ts: &str) -> RawEnvelope {
    RawEnvelope::interactive(json!({
        "type": "block_actions",
        "channel": {"id": "C100"},
        "message": {"ts": "1700000000.000100"},
        "actions": [{"action_id": "approve", "action_ts": action_ts}]
    }))
    .unwrap()
}

fn view(kind: &str) -> RawEnvelope {
    RawEnvelope::interactive(json!({
        "type": kind,
        "view": {"id": "V1", "callback_id": "feedback"}
    }))
    .unwrap()
}

#[tokio::test]
async fn test_message_pattern_and_scope_scenario() {
    let settings = TriggerSettings::new(["message"])
        .with_pattern("urgent", "i")
        .with_channel(ChannelRef::list("C100"));
    let mut harness = Harness::started(settings).await;

    harness.deliver(message_in("C100", "This is Urgent")).await;
    assert_eq!(harness.drain().len(), 1);

    harness.deliver(message_in("C200", "This is Urgent")).await;
    assert!(harness.drain().is_empty());

    harness.deliver(message_in("C100", "routine")).await;
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn test_global_flag_accepts_consecutive_matches() {
    let settings = TriggerSettings::new(["message"]).with_pattern("foo", "g");
    let mut harness = Harness::started(settings).await;

    harness.deliver(message_in("C1", "foo first")).await;
    harness.deliver(message_in("C2", "second foo")).await;
    harness.deliver(message_in("C3", "third foo")).await;
    assert_eq!(harness.drain().len(), 3);
}

#[tokio::test]
async fn test_empty_scope_accepts_every_location() {
    let mut harness = Harness::started(TriggerSettings::new(["message"])).await;

    for channel in ["C1", "G2", "D3"] {
        harness.deliver(message_in(channel, "hello")).await;
    }
    assert_eq!(harness.drain().len(), 3);
}

#[tokio::test]
async fn test_legacy_channel_is_merged_into_scope() {
    let settings = TriggerSettings::new(["message"])
        .with_channel(ChannelRef::list("C100"))
        .with_legacy_channel(ChannelRef::id("C200"));
    let mut harness = Harness::started(settings).await;

    harness.deliver(message_in("C100", "a")).await;
    harness.deliver(message_in("C200", "b")).await;
    harness.deliver(message_in("C300", "c")).await;
    assert_eq!(harness.drain().len(), 2);
}

#[tokio::test]
async fn test_message_scope_composite_checks_channel_type() {
    let mut harness = Harness::started(TriggerSettings::new(["message.im"])).await;
    assert_eq!(
        harness.transport.registered(),
        vec![WireListener::Event("message".to_string())]
    );

    harness.deliver(message_in("C100", "in a channel")).await;
    assert!(harness.drain().is_empty());

    let direct = RawEnvelope::event_callback(json!({
        "event": {"type": "message", "channel": "D100", "channel_type": "im", "text": "hi"}
    }));
    harness.deliver(direct).await;
    assert_eq!(harness.drain().len(), 1);
}

#[tokio::test]
async fn test_reaction_without_pattern_forwards_everything() {
    let mut harness = Harness::started(TriggerSettings::new(["reaction_added"])).await;

    harness.deliver(reaction("thumbsdown", "C1")).await;
    harness.deliver(reaction("tada", "C2")).await;
    assert_eq!(harness.drain().len(), 2);
}

#[tokio::test]
async fn test_reaction_pattern_matches_name_only() {
    let settings = TriggerSettings::new(["reaction_added"]).with_pattern("^thumbsup$", "");
    let mut harness = Harness::started(settings).await;

    harness.deliver(reaction("thumbsdown", "C1")).await;
    assert!(harness.drain().is_empty());

    harness.deliver(reaction("thumbsup", "C1")).await;
    let records = harness.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["event"]["reaction"], "thumbsup");
}

#[tokio::test]
async fn test_reaction_respects_item_scope() {
    let settings =
        TriggerSettings::new(["reaction_added"]).with_channel(ChannelRef::list("C100"));
    let mut harness = Harness::started(settings).await;

    harness.deliver(reaction("tada", "C200")).await;
    harness.deliver(reaction("tada", "C100")).await;
    assert_eq!(harness.drain().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_action_suppressed_within_window() {
    let mut harness = Harness::started(TriggerSettings::new(["block_actions"])).await;
    let ack = Arc::new(RecordingAck::new());

    harness
        .deliver(block_action("1700000001.0").with_ack(ack.clone()))
        .await;
    harness
        .deliver(block_action("1700000001.0").with_ack(ack.clone()))
        .await;
    assert_eq!(harness.drain().len(), 1);
    assert_eq!(ack.calls(), 2);
    assert_eq!(harness.dispatcher.status().dropped_duplicates, 1);

    harness.deliver(block_action("1700000002.0")).await;
    assert_eq!(harness.drain().len(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    harness.deliver(block_action("1700000001.0")).await;
    assert_eq!(harness.drain().len(), 1);

    harness.dispatcher.stop().await;
}

#[tokio::test]
async fn test_action_without_ack_capability_is_forwarded() {
    let mut harness = Harness::started(TriggerSettings::new(["block_actions"])).await;

    harness.deliver(block_action("1700000001.0")).await;
    let records = harness.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["action"]["action_id"], "approve");
}

#[tokio::test]
async fn test_view_submission_with_failing_ack_is_forwarded_once() {
    let mut harness = Harness::started(TriggerSettings::new(["view_submission"])).await;
    let ack = Arc::new(RecordingAck::failing());

    harness.deliver(view("view_submission").with_ack(ack.clone())).await;

    let records = harness.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["view"]["id"], "V1");
    assert_eq!(ack.calls(), 1);
    assert_eq!(harness.dispatcher.status().ack_failures, 1);
}

#[tokio::test]
async fn test_view_handlers_route_by_body_type() {
    let settings = TriggerSettings::new(["view_submission", "view_closed"]);
    let mut harness = Harness::started(settings).await;

    assert_eq!(harness.deliver(view("view_submission")).await, 2);
    assert_eq!(harness.drain().len(), 1);

    let ack = Arc::new(RecordingAck::new());
    harness.deliver(view("view_closed").with_ack(ack.clone())).await;
    assert_eq!(harness.drain().len(), 1);
    // both view handlers answer; the socket ack only sends once
    assert_eq!(ack.calls(), 2);
}

#[tokio::test]
async fn test_unselected_view_type_is_still_acknowledged() {
    let mut harness = Harness::started(TriggerSettings::new(["view_closed"])).await;
    let ack = Arc::new(RecordingAck::new());

    assert_eq!(harness.deliver(view("view_submission").with_ack(ack.clone())).await, 1);
    assert!(harness.drain().is_empty());
    assert_eq!(ack.calls(), 1);

    let mut harness = Harness::started(TriggerSettings::new(["view_submission"])).await;
    let ack = Arc::new(RecordingAck::new());

    assert_eq!(harness.deliver(view("view_closed").with_ack(ack.clone())).await, 1);
    assert!(harness.drain().is_empty());
    assert_eq!(ack.calls(), 1);
}

#[tokio::test]
async fn test_unselected_view_ack_failure_is_not_counted() {
    let harness = Harness::started(TriggerSettings::new(["view_closed"])).await;
    let ack = Arc::new(RecordingAck::failing());

    harness.deliver(view("view_submission").with_ack(ack.clone())).await;

    assert_eq!(ack.calls(), 1);
    assert_eq!(harness.dispatcher.status().ack_failures, 0);
}

#[tokio::test]
async fn test_generic_category_passthrough() {
    let settings = TriggerSettings::new(["pin_added", "user_change"])
        .with_channel(ChannelRef::list("C100"));
    let mut harness = Harness::started(settings).await;

    let outside = RawEnvelope::event_callback(json!({
        "event": {"type": "pin_added", "item": {"channel_id": "C999"}}
    }));
    harness.deliver(outside).await;
    assert!(harness.drain().is_empty());

    let location_less = RawEnvelope::event_callback(json!({
        "event": {"type": "user_change", "user": {"id": "U1"}}
    }));
    harness.deliver(location_less).await;
    assert_eq!(harness.drain().len(), 1);
}

#[tokio::test]
async fn test_overlapping_categories_each_forward() {
    let settings = TriggerSettings::new(["message", "message.channels"]);
    let mut harness = Harness::started(settings).await;

    harness.deliver(message_in("C100", "hello")).await;
    assert_eq!(harness.drain().len(), 2);
}

#[tokio::test]
async fn test_repeated_category_subscribes_once() {
    let settings = TriggerSettings::new(["message", "message", " message "]);
    let mut harness = Harness::started(settings).await;

    assert_eq!(harness.transport.registered().len(), 1);
    harness.deliver(message_in("C100", "hello")).await;
    assert_eq!(harness.drain().len(), 1);
}

#[tokio::test]
async fn test_compact_record_shape() {
    let settings = TriggerSettings::new(["message"]).with_record_shape(RecordShape::Compact);
    let mut harness = Harness::started(settings).await;

    harness.deliver(message_in("C100", "hello")).await;
    let record = harness.drain().remove(0);
    assert_eq!(record["event"]["text"], "hello");
    assert!(record.get("message").is_none());
}

#[tokio::test]
async fn test_invalid_pattern_rejected_at_construction() {
    let settings = TriggerSettings::new(["message"]).with_pattern("(unclosed", "g");
    let (sink, _rx) = ChannelSink::channel(1);
    let result = Dispatcher::new(&settings, Arc::new(MockTransport::new()), Arc::new(sink));

    let err = result.err().unwrap();
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn test_lifecycle_transitions() {
    let harness = Harness::idle(TriggerSettings::new(["message"]), MockTransport::new());
    assert_eq!(harness.dispatcher.state(), DispatcherState::Idle);

    harness.dispatcher.start().await.unwrap();
    assert_eq!(harness.dispatcher.state(), DispatcherState::Active);
    assert!(harness.dispatcher.status().activated_at.is_some());

    let err = harness.dispatcher.start().await.unwrap_err();
    assert!(matches!(err, TriggerError::InvalidState { operation: "start", state: "active" }));

    harness.dispatcher.stop().await;
    harness.dispatcher.stop().await;
    assert_eq!(harness.dispatcher.state(), DispatcherState::Stopped);
    assert_eq!(harness.transport.stop_calls(), 1);

    assert_eq!(harness.deliver(message_in("C100", "late")).await, 0);
    assert!(harness.dispatcher.start().await.is_err());
}

#[tokio::test]
async fn test_stop_before_start_is_harmless() {
    let harness = Harness::idle(TriggerSettings::new(["message"]), MockTransport::new());

    harness.dispatcher.stop().await;
    assert_eq!(harness.dispatcher.state(), DispatcherState::Stopped);
    assert_eq!(harness.transport.stop_calls(), 0);
}

#[tokio::test]
async fn test_session_start_failure_is_fatal() {
    let harness = Harness::idle(
        TriggerSettings::new(["message"]),
        MockTransport::new().failing_start(),
    );

    let err = harness.dispatcher.start().await.unwrap_err();
    assert!(matches!(err, TriggerError::Session(_)));
    assert_eq!(harness.dispatcher.state(), DispatcherState::Stopped);
}

#[tokio::test]
async fn test_subscription_failure_does_not_abort_others() {
    let transport = MockTransport::new().rejecting(WireListener::Action);
    let settings = TriggerSettings::new(["block_actions", "message"]);
    let mut harness = Harness::idle(settings, transport);
    harness.dispatcher.start().await.unwrap();

    let status = harness.dispatcher.status();
    assert_eq!(status.categories, vec!["message".to_string()]);

    harness.deliver(message_in("C100", "still works")).await;
    assert_eq!(harness.drain().len(), 1);
}

struct FlakySink {
    calls: AtomicUsize,
    inner: ChannelSink,
}

#[async_trait]
impl RecordSink for FlakySink {
    async fn emit(&self, record: Value) -> Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(TriggerError::Emission("consumer busy".to_string()));
        }
        self.inner.emit(record).await
    }
}

#[tokio::test]
async fn test_emission_failure_is_isolated() {
    let transport = Arc::new(MockTransport::new());
    let (inner, mut rx) = ChannelSink::channel(8);
    let sink = Arc::new(FlakySink {
        calls: AtomicUsize::new(0),
        inner,
    });
    let dispatcher =
        Dispatcher::new(&TriggerSettings::new(["message"]), transport.clone(), sink).unwrap();
    dispatcher.start().await.unwrap();

    transport.deliver(message_in("C100", "first")).await;
    transport.deliver(message_in("C100", "second")).await;

    let record = rx.try_recv().unwrap();
    assert_eq!(record["event"]["text"], "second");
    assert!(rx.try_recv().is_err());

    let status = dispatcher.status();
    assert_eq!(status.emission_failures, 1);
    assert_eq!(status.trigger_count, 1);
    assert!(status.last_triggered_at.is_some());
}
