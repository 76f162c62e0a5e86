//! Time-windowed deduplication of interactive actions.
//!
//! The transport may redeliver the same action under retry; each key is
//! remembered for a fixed window. Entries are removed by a background sweep,
//! and lookups ignore entries older than the window, so expiry does not
//! depend on sweep timing.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long a seen action key suppresses repeats.
pub const DEDUP_WINDOW: Duration = Duration::from_secs(30);

/// Derive the dedup key of an interactive action body.
///
/// Built from transport-provided values only: the container channel, the
/// message timestamp and the action timestamp. Returns `None` when the body
/// carries neither timestamp.
pub fn action_dedup_key(body: &Value) -> Option<String> {
    let message_ts = first_str(body, &["/message/ts", "/container/message_ts"]);
    let action_ts = first_str(body, &["/actions/0/action_ts", "/action_ts"]);
    if message_ts.is_none() && action_ts.is_none() {
        return None;
    }

    let channel = first_str(body, &["/channel/id", "/container/channel_id"]).unwrap_or("");
    Some(format!(
        "{}:{}:{}",
        channel,
        message_ts.unwrap_or(""),
        action_ts.unwrap_or("")
    ))
}

fn first_str<'a>(body: &'a Value, pointers: &[&str]) -> Option<&'a str> {
    pointers
        .iter()
        .filter_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

#[derive(Debug)]
pub struct DedupTracker {
    window: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl Default for DedupTracker {
    fn default() -> Self {
        Self::new(DEDUP_WINDOW)
    }
}

impl DedupTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record `key` and return `true` on first sight within the window;
    /// return `false` for a repeat.
    pub fn first_sighting(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut seen = self.seen.lock();

        if let Some(first_seen) = seen.get(key) {
            if now.duration_since(*first_seen) < self.window {
                return false;
            }
        }

        seen.insert(key.to_string(), now);
        true
    }

    /// Drop entries older than the window. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut seen = self.seen.lock();
        let before = seen.len();
        seen.retain(|_, first_seen| now.duration_since(*first_seen) < self.window);
        before - seen.len()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    /// Spawn the background sweep; it runs until `cancel` fires.
    pub fn spawn_sweeper(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let tracker = Arc::clone(self);
        let period = (tracker.window / 6).max(Duration::from_millis(100));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = tracker.purge_expired();
                        if removed > 0 {
                            debug!(removed, remaining = tracker.len(), "Expired dedup entries");
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_from_message_and_action() {
        let body = json!({
            "channel": {"id": "C100"},
            "message": {"ts": "1700000000.000100"},
            "actions": [{"action_id": "approve", "action_ts": "1700000001.000200"}]
        });
        assert_eq!(
            action_dedup_key(&body).as_deref(),
            Some("C100:1700000000.000100:1700000001.000200")
        );
    }

    #[test]
    fn test_key_falls_back_to_container() {
        let body = json!({
            "container": {"channel_id": "C200", "message_ts": "1700000000.5"},
            "actions": [{"action_id": "x"}]
        });
        assert_eq!(
            action_dedup_key(&body).as_deref(),
            Some("C200:1700000000.5:")
        );
    }

    #[test]
    fn test_key_absent_without_timestamps() {
        assert_eq!(action_dedup_key(&json!({"actions": [{"action_id": "x"}]})), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_within_window_is_suppressed() {
        let tracker = DedupTracker::default();
        assert!(tracker.first_sighting("k"));
        assert!(!tracker.first_sighting("k"));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(!tracker.first_sighting("k"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(tracker.first_sighting("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_do_not_collide() {
        let tracker = DedupTracker::default();
        assert!(tracker.first_sighting("a"));
        assert!(tracker.first_sighting("b"));
        assert_eq!(tracker.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let tracker = DedupTracker::new(Duration::from_secs(10));
        tracker.first_sighting("old");
        tokio::time::advance(Duration::from_secs(6)).await;
        tracker.first_sighting("new");
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(tracker.purge_expired(), 1);
        assert_eq!(tracker.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_entries_without_lookup() {
        let tracker = Arc::new(DedupTracker::default());
        let cancel = CancellationToken::new();
        let sweeper = tracker.spawn_sweeper(cancel.clone());

        tracker.first_sighting("k");
        assert_eq!(tracker.len(), 1);

        tokio::time::sleep(DEDUP_WINDOW + Duration::from_secs(6)).await;
        assert!(tracker.is_empty());

        cancel.cancel();
        sweeper.await.unwrap();
    }
}
