//! Event filtering, deduplication, acknowledgment and dispatch.

pub mod ack;
pub mod dedup;
pub mod dispatcher;
pub mod matcher;
pub mod record;
pub mod scope;

#[cfg(test)]
mod tests;

pub use ack::{AckOutcome, AckPolicy, acknowledge};
pub use dedup::{DEDUP_WINDOW, DedupTracker, action_dedup_key};
pub use dispatcher::{Dispatcher, DispatcherState, TriggerStatus};
pub use matcher::{ContentMatcher, EventPredicate, PatternFlags};
pub use record::OutputRecord;
pub use scope::{ScopeFilter, resolve_location};
