//! In-memory transport for tests.

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use slackflow_models::WireListener;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{EnvelopeHandler, EventTransport, ListenerTable};
use crate::envelope::{Acknowledge, RawEnvelope};
use crate::error::{Result, TriggerError};

/// Transport whose envelopes are pushed by the test.
#[derive(Default)]
pub struct MockTransport {
    listeners: ListenerTable,
    running: AtomicBool,
    fail_start: AtomicBool,
    rejected: Mutex<HashSet<WireListener>>,
    stop_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `start` fail with a session error.
    pub fn failing_start(self) -> Self {
        self.fail_start.store(true, Ordering::SeqCst);
        self
    }

    /// Make `register` fail for one listener.
    pub fn rejecting(self, listener: WireListener) -> Self {
        self.rejected.lock().insert(listener);
        self
    }

    pub fn registered(&self) -> Vec<WireListener> {
        self.listeners.listeners()
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Deliver an envelope to every matching handler and wait for all of
    /// them to finish. Returns how many handlers ran; nothing runs while the
    /// transport is stopped.
    pub async fn deliver(&self, envelope: RawEnvelope) -> usize {
        if !self.is_running() {
            return 0;
        }

        let handlers = self.listeners.handlers_for(&envelope);
        let count = handlers.len();
        join_all(
            handlers
                .into_iter()
                .map(|handler| {
                    let envelope = envelope.clone();
                    async move { handler.handle(envelope).await }
                }),
        )
        .await;
        count
    }
}

#[async_trait]
impl EventTransport for MockTransport {
    fn register(&self, listener: WireListener, handler: Arc<dyn EnvelopeHandler>) -> Result<()> {
        if self.rejected.lock().contains(&listener) {
            return Err(TriggerError::Subscription {
                category: listener.to_string(),
                reason: "rejected by mock transport".to_string(),
            });
        }
        self.listeners.insert(listener, handler);
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(TriggerError::Session("connection refused".to_string()));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Acknowledgment capability that counts its invocations.
#[derive(Debug, Default)]
pub struct RecordingAck {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingAck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capability whose every invocation fails.
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Acknowledge for RecordingAck {
    async fn ack(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TriggerError::Acknowledgment("socket closed".to_string()));
        }
        Ok(())
    }
}
