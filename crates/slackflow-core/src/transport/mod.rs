//! Transport Trait Definitions
//!
//! The transport owns the real-time session with Slack and delivers raw
//! envelopes to registered handlers. The dispatcher only ever talks to it
//! through [`EventTransport`].

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod socket_mode;

pub use socket_mode::SocketModeTransport;

use async_trait::async_trait;
use parking_lot::RwLock;
use slackflow_models::WireListener;
use std::sync::Arc;

use crate::envelope::{EnvelopePayload, RawEnvelope};
use crate::error::Result;

/// Callback invoked by the transport for each matching envelope.
///
/// Each invocation owns its envelope and runs as its own task; several
/// invocations of the same handler may be in flight at once.
#[async_trait]
pub trait EnvelopeHandler: Send + Sync {
    async fn handle(&self, envelope: RawEnvelope);
}

/// Real-time session delivering envelopes.
///
/// # Example
///
/// ```ignore
/// let transport: Arc<dyn EventTransport> = Arc::new(SocketModeTransport::new(&creds, &conn)?);
/// transport.register(WireListener::Event("message".into()), handler)?;
/// transport.start().await?;
/// ```
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Subscribe a handler to a listener. Must be called before `start`.
    fn register(&self, listener: WireListener, handler: Arc<dyn EnvelopeHandler>) -> Result<()>;

    /// Open the session. Envelopes are delivered once this returns `Ok`.
    async fn start(&self) -> Result<()>;

    /// Close the session. No envelope is delivered after this returns;
    /// handler invocations already running are left to finish.
    async fn stop(&self) -> Result<()>;

    fn is_running(&self) -> bool;
}

/// Whether an envelope is addressed to a listener.
pub fn listener_matches(listener: &WireListener, envelope: &RawEnvelope) -> bool {
    match (listener, &envelope.payload) {
        (WireListener::Event(name), EnvelopePayload::Event { .. }) => {
            envelope.event_type() == Some(name.as_str())
        }
        (WireListener::Action, EnvelopePayload::Action { .. }) => true,
        (WireListener::View, EnvelopePayload::View { .. }) => true,
        _ => false,
    }
}

/// Registered listeners, shared between a transport and its read loop.
#[derive(Default, Clone)]
pub struct ListenerTable {
    entries: Arc<RwLock<Vec<(WireListener, Arc<dyn EnvelopeHandler>)>>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listener: WireListener, handler: Arc<dyn EnvelopeHandler>) {
        self.entries.write().push((listener, handler));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn listeners(&self) -> Vec<WireListener> {
        self.entries
            .read()
            .iter()
            .map(|(listener, _)| listener.clone())
            .collect()
    }

    /// Handlers whose listener matches the envelope, in registration order.
    pub fn handlers_for(&self, envelope: &RawEnvelope) -> Vec<Arc<dyn EnvelopeHandler>> {
        self.entries
            .read()
            .iter()
            .filter(|(listener, _)| listener_matches(listener, envelope))
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }
}
