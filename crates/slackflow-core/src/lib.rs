//! SlackFlow Core
//!
//! Slack Socket Mode trigger engine: category subscriptions, content and
//! scope filtering, action deduplication, acknowledgment and record
//! dispatch.

pub mod envelope;
pub mod error;
pub mod sink;
pub mod slack;
pub mod transport;
pub mod trigger;

pub use envelope::{Acknowledge, EnvelopeContext, EnvelopePayload, RawEnvelope};
pub use error::{Result, TriggerError};
pub use sink::{ChannelSink, RecordSink};
pub use slack::{ChannelSummary, SlackWebClient};
pub use transport::{EnvelopeHandler, EventTransport, SocketModeTransport};
pub use trigger::{
    ContentMatcher, DEDUP_WINDOW, Dispatcher, DispatcherState, EventPredicate, OutputRecord,
    TriggerStatus,
};

// Re-export the data model
pub use slackflow_models as models;
