//! Acknowledgment of request/response style envelopes.
//!
//! Acknowledgment is attempted once and never retried. A failure is logged
//! and reported to the caller; it never stops the record from being
//! forwarded.

use slackflow_models::Category;
use tracing::{debug, error, warn};

use crate::envelope::RawEnvelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckPolicy {
    /// The platform expects an ack; a missing capability is worth a warning.
    Required,
    /// Ack if the capability is present, failures are expected.
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Acked,
    Unavailable,
    Failed(String),
}

impl AckOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub async fn acknowledge(
    envelope: &RawEnvelope,
    category: &Category,
    policy: AckPolicy,
) -> AckOutcome {
    let Some(ack) = envelope.ack_capability() else {
        if policy == AckPolicy::Required {
            warn!(category = %category, "Envelope has no acknowledgment capability");
        }
        return AckOutcome::Unavailable;
    };

    match ack.ack().await {
        Ok(()) => {
            debug!(
                category = %category,
                envelope_id = ?envelope.context.envelope_id,
                "Envelope acknowledged"
            );
            AckOutcome::Acked
        }
        Err(e) => {
            match policy {
                AckPolicy::Required => {
                    error!(error = %e, category = %category, "Failed to acknowledge envelope")
                }
                AckPolicy::BestEffort => warn!(
                    error = %e,
                    category = %category,
                    "Acknowledgment failed (safe to ignore)"
                ),
            }
            AckOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::RecordingAck;
    use serde_json::json;
    use std::sync::Arc;

    fn view_envelope() -> RawEnvelope {
        RawEnvelope::interactive(json!({"type": "view_closed", "view": {"id": "V1"}})).unwrap()
    }

    #[tokio::test]
    async fn test_ack_success() {
        let ack = Arc::new(RecordingAck::new());
        let envelope = view_envelope().with_ack(ack.clone());

        let outcome = acknowledge(&envelope, &Category::parse("view_closed"), AckPolicy::BestEffort).await;
        assert_eq!(outcome, AckOutcome::Acked);
        assert_eq!(ack.calls(), 1);
    }

    #[tokio::test]
    async fn test_ack_unavailable() {
        let outcome = acknowledge(
            &view_envelope(),
            &Category::parse("view_submission"),
            AckPolicy::Required,
        )
        .await;
        assert_eq!(outcome, AckOutcome::Unavailable);
        assert!(!outcome.is_failure());
    }

    #[tokio::test]
    async fn test_ack_failure_is_reported() {
        let ack = Arc::new(RecordingAck::failing());
        let envelope = view_envelope().with_ack(ack.clone());

        let outcome = acknowledge(&envelope, &Category::parse("view_submission"), AckPolicy::Required).await;
        assert!(outcome.is_failure());
        assert_eq!(ack.calls(), 1);
    }
}
