//! Trigger dispatcher.
//!
//! Subscribes one handler per selected category to the transport. Each
//! handler decides, for every delivered envelope, whether a record is
//! forwarded to the sink. Rejections are silent: no record, no error.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use slackflow_models::{Category, CategoryKind, RecordShape, TriggerSettings};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::ack::{AckOutcome, AckPolicy, acknowledge};
use super::dedup::{DedupTracker, action_dedup_key};
use super::matcher::{ContentMatcher, EventPredicate};
use super::record::OutputRecord;
use super::scope::ScopeFilter;
use crate::envelope::RawEnvelope;
use crate::error::{Result, TriggerError};
use crate::sink::RecordSink;
use crate::transport::{EnvelopeHandler, EventTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherState {
    Idle,
    Active,
    Stopped,
}

impl DispatcherState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an activation.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerStatus {
    pub id: String,
    pub state: DispatcherState,
    pub categories: Vec<String>,
    /// Unix timestamp (seconds) when the trigger was activated
    pub activated_at: Option<i64>,
    /// Unix timestamp (seconds) of the last forwarded record
    pub last_triggered_at: Option<i64>,
    pub trigger_count: u64,
    pub dropped_duplicates: u64,
    pub ack_failures: u64,
    pub emission_failures: u64,
    pub dedup_entries: usize,
}

#[derive(Debug, Default)]
struct TriggerCounters {
    trigger_count: AtomicU64,
    dropped_duplicates: AtomicU64,
    ack_failures: AtomicU64,
    emission_failures: AtomicU64,
    last_triggered_at: Mutex<Option<i64>>,
}

impl TriggerCounters {
    fn record_trigger(&self) {
        *self.last_triggered_at.lock() = Some(Utc::now().timestamp());
        self.trigger_count.fetch_add(1, Ordering::Relaxed);
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Everything a category handler needs, shared by all of them.
struct DispatchContext {
    predicate: Arc<dyn EventPredicate>,
    scope: ScopeFilter,
    dedup: Arc<DedupTracker>,
    sink: Arc<dyn RecordSink>,
    shape: RecordShape,
    counters: Arc<TriggerCounters>,
}

enum Verdict {
    Forward,
    Drop(&'static str),
}

struct CategoryHandler {
    category: Category,
    context: Arc<DispatchContext>,
}

impl CategoryHandler {
    fn filter_message(&self, envelope: &RawEnvelope, channel_type: Option<&str>) -> Verdict {
        let Some(event) = envelope.event() else {
            return Verdict::Drop("no event");
        };
        if !self.context.scope.accepts(event) {
            return Verdict::Drop("outside scope");
        }
        if let Some(expected) = channel_type
            && event.get("channel_type").and_then(Value::as_str) != Some(expected)
        {
            return Verdict::Drop("channel type mismatch");
        }
        if self.context.predicate.is_active() && !self.context.predicate.matches_event(event) {
            return Verdict::Drop("content mismatch");
        }
        Verdict::Forward
    }

    fn filter_reaction(&self, envelope: &RawEnvelope) -> Verdict {
        let Some(event) = envelope.event() else {
            return Verdict::Drop("no event");
        };
        if !self.context.scope.accepts(event) {
            return Verdict::Drop("outside scope");
        }
        if self.context.predicate.is_active() {
            let reaction = event.get("reaction").and_then(Value::as_str).unwrap_or("");
            if !self.context.predicate.matches_text(reaction) {
                return Verdict::Drop("reaction mismatch");
            }
        }
        Verdict::Forward
    }

    async fn handle_action(&self, envelope: &RawEnvelope) -> Verdict {
        self.acknowledge(envelope, AckPolicy::Required).await;

        if let Some(key) = action_dedup_key(&envelope.body)
            && !self.context.dedup.first_sighting(&key)
        {
            TriggerCounters::bump(&self.context.counters.dropped_duplicates);
            return Verdict::Drop("duplicate action");
        }
        Verdict::Forward
    }

    async fn handle_view(
        &self,
        envelope: &RawEnvelope,
        view_type: &str,
        policy: AckPolicy,
    ) -> Verdict {
        if envelope.body_type() != Some(view_type) {
            // matched modal envelopes are never acked by the transport
            acknowledge(envelope, &self.category, AckPolicy::BestEffort).await;
            return Verdict::Drop("other view type");
        }
        self.acknowledge(envelope, policy).await;
        Verdict::Forward
    }

    fn filter_generic(&self, envelope: &RawEnvelope) -> Verdict {
        match envelope.event() {
            Some(event) if !self.context.scope.accepts(event) => Verdict::Drop("outside scope"),
            _ => Verdict::Forward,
        }
    }

    async fn acknowledge(&self, envelope: &RawEnvelope, policy: AckPolicy) {
        if let AckOutcome::Failed(_) = acknowledge(envelope, &self.category, policy).await {
            TriggerCounters::bump(&self.context.counters.ack_failures);
        }
    }

    async fn forward(&self, envelope: &RawEnvelope) {
        let record = match OutputRecord::from_envelope(envelope, self.context.shape).into_value() {
            Ok(record) => record,
            Err(e) => {
                TriggerCounters::bump(&self.context.counters.emission_failures);
                error!(category = %self.category, error = %e, "Failed to build record");
                return;
            }
        };

        match self.context.sink.emit(record).await {
            Ok(()) => {
                self.context.counters.record_trigger();
                debug!(category = %self.category, "Record forwarded");
            }
            Err(e) => {
                TriggerCounters::bump(&self.context.counters.emission_failures);
                error!(category = %self.category, error = %e, "Failed to forward record");
            }
        }
    }
}

#[async_trait]
impl EnvelopeHandler for CategoryHandler {
    async fn handle(&self, envelope: RawEnvelope) {
        let verdict = match self.category.kind() {
            CategoryKind::Message => self.filter_message(&envelope, None),
            CategoryKind::MessageScope { channel_type } => {
                self.filter_message(&envelope, Some(channel_type))
            }
            CategoryKind::Reaction(_) => self.filter_reaction(&envelope),
            CategoryKind::BlockActions => self.handle_action(&envelope).await,
            CategoryKind::ViewSubmission => {
                self.handle_view(&envelope, "view_submission", AckPolicy::Required)
                    .await
            }
            CategoryKind::ViewClosed => {
                self.handle_view(&envelope, "view_closed", AckPolicy::BestEffort)
                    .await
            }
            CategoryKind::Generic(_) => self.filter_generic(&envelope),
        };

        match verdict {
            Verdict::Forward => self.forward(&envelope).await,
            Verdict::Drop(reason) => {
                debug!(category = %self.category, reason, "Envelope dropped")
            }
        }
    }
}

/// One trigger activation.
///
/// Configuration is fixed at construction. The lifecycle is
/// `Idle -> Active -> Stopped`; a stopped dispatcher is not restarted.
pub struct Dispatcher {
    id: String,
    categories: Vec<Category>,
    predicate: Arc<dyn EventPredicate>,
    scope: ScopeFilter,
    shape: RecordShape,
    transport: Arc<dyn EventTransport>,
    sink: Arc<dyn RecordSink>,
    dedup: Arc<DedupTracker>,
    counters: Arc<TriggerCounters>,
    state: Mutex<DispatcherState>,
    subscribed: Mutex<Vec<Category>>,
    activated_at: Mutex<Option<i64>>,
    lifecycle: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Validate the filter configuration and build an idle dispatcher.
    pub fn new(
        settings: &TriggerSettings,
        transport: Arc<dyn EventTransport>,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self> {
        let matcher = ContentMatcher::compile(&settings.regex_pattern, &settings.regex_flags)?;
        let categories = settings.categories();
        if categories.is_empty() {
            warn!("No trigger categories selected");
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            categories,
            predicate: Arc::new(matcher),
            scope: ScopeFilter::from_settings(settings),
            shape: settings.record_shape,
            transport,
            sink,
            dedup: Arc::new(DedupTracker::default()),
            counters: Arc::new(TriggerCounters::default()),
            state: Mutex::new(DispatcherState::Idle),
            subscribed: Mutex::new(Vec::new()),
            activated_at: Mutex::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
            cancel: CancellationToken::new(),
            sweeper: Mutex::new(None),
        })
    }

    /// Replace the content predicate applied to message and reaction events.
    pub fn with_predicate(mut self, predicate: Arc<dyn EventPredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Replace the dedup tracker (window length).
    pub fn with_dedup(mut self, dedup: DedupTracker) -> Self {
        self.dedup = Arc::new(dedup);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> DispatcherState {
        *self.state.lock()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub async fn start(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;
        let current = self.state();
        if current != DispatcherState::Idle {
            return Err(TriggerError::InvalidState {
                operation: "start",
                state: current.as_str(),
            });
        }

        let context = Arc::new(DispatchContext {
            predicate: Arc::clone(&self.predicate),
            scope: self.scope.clone(),
            dedup: Arc::clone(&self.dedup),
            sink: Arc::clone(&self.sink),
            shape: self.shape,
            counters: Arc::clone(&self.counters),
        });

        let mut subscribed = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            let listener = category.wire_listener();
            let handler = Arc::new(CategoryHandler {
                category: category.clone(),
                context: Arc::clone(&context),
            });

            match self.transport.register(listener.clone(), handler) {
                Ok(()) => {
                    debug!(category = %category, listener = %listener, "Category subscribed");
                    subscribed.push(category.clone());
                }
                Err(e) => {
                    error!(category = %category, error = %e, "Failed to subscribe category");
                }
            }
        }
        *self.subscribed.lock() = subscribed;

        if let Err(e) = self.transport.start().await {
            *self.state.lock() = DispatcherState::Stopped;
            self.cancel.cancel();
            error!(trigger_id = %self.id, error = %e, "Failed to start transport session");
            return Err(match e {
                TriggerError::Session(_) => e,
                other => TriggerError::Session(other.to_string()),
            });
        }

        *self.sweeper.lock() = Some(self.dedup.spawn_sweeper(self.cancel.child_token()));
        *self.activated_at.lock() = Some(Utc::now().timestamp());
        *self.state.lock() = DispatcherState::Active;

        info!(
            trigger_id = %self.id,
            categories = self.subscribed.lock().len(),
            scope = self.scope.channel_ids().len(),
            "Slack trigger activated"
        );
        Ok(())
    }

    /// Tear down the session. Safe to call in any state, any number of times.
    pub async fn stop(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        let previous = std::mem::replace(&mut *self.state.lock(), DispatcherState::Stopped);

        self.cancel.cancel();
        if let Some(sweeper) = self.sweeper.lock().take() {
            sweeper.abort();
        }

        if previous != DispatcherState::Active {
            return;
        }

        if let Err(e) = self.transport.stop().await {
            warn!(trigger_id = %self.id, error = %e, "Failed to stop transport session");
        }

        info!(
            trigger_id = %self.id,
            trigger_count = self.counters.trigger_count.load(Ordering::Relaxed),
            "Slack trigger stopped"
        );
    }

    pub fn status(&self) -> TriggerStatus {
        let categories = match self.state() {
            DispatcherState::Idle => self.categories.clone(),
            _ => self.subscribed.lock().clone(),
        };

        TriggerStatus {
            id: self.id.clone(),
            state: self.state(),
            categories: categories.iter().map(|c| c.id().to_string()).collect(),
            activated_at: *self.activated_at.lock(),
            last_triggered_at: *self.counters.last_triggered_at.lock(),
            trigger_count: self.counters.trigger_count.load(Ordering::Relaxed),
            dropped_duplicates: self.counters.dropped_duplicates.load(Ordering::Relaxed),
            ack_failures: self.counters.ack_failures.load(Ordering::Relaxed),
            emission_failures: self.counters.emission_failures.load(Ordering::Relaxed),
            dedup_entries: self.dedup.len(),
        }
    }
}
