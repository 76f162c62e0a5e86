//! Consumer side of the trigger: where accepted records go.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Result, TriggerError};

/// Receives one record per forwarding decision.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn emit(&self, record: Value) -> Result<()>;
}

/// Sink backed by a tokio mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Value>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Value>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Value>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn emit(&self, record: Value) -> Result<()> {
        self.tx
            .send(record)
            .await
            .map_err(|_| TriggerError::Emission("record receiver dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelSink::channel(4);
        sink.emit(json!({"n": 1})).await.unwrap();
        assert_eq!(rx.recv().await.unwrap()["n"], 1);
    }

    #[tokio::test]
    async fn test_channel_sink_closed_receiver() {
        let (sink, rx) = ChannelSink::channel(1);
        drop(rx);
        let err = sink.emit(json!({})).await.unwrap_err();
        assert!(matches!(err, TriggerError::Emission(_)));
    }
}
