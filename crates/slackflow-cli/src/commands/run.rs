use anyhow::Result;
use chrono::{TimeZone, Utc};
use slackflow_core::{ChannelSink, Dispatcher, SocketModeTransport, TriggerStatus};
use slackflow_models::TriggerMode;
use std::sync::Arc;
use tracing::info;

use crate::cli::RunArgs;
use crate::config::CliConfig;
use crate::output::json::print_json_line;

const RECORD_BUFFER: usize = 256;

pub async fn run(config: &CliConfig, args: RunArgs) -> Result<()> {
    let mode = if args.manual {
        TriggerMode::Manual
    } else {
        TriggerMode::Trigger
    };

    let credentials = config.credentials();
    let transport = Arc::new(SocketModeTransport::new(&credentials, &config.connection)?);
    let (sink, mut records) = ChannelSink::channel(RECORD_BUFFER);
    let dispatcher = Dispatcher::new(&config.trigger, transport, Arc::new(sink))?;

    dispatcher.start().await?;
    info!(
        trigger_id = %dispatcher.id(),
        mode = ?mode,
        "Listening for Slack events (Ctrl-C to stop)"
    );

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping trigger");
                break Ok(());
            }
            record = records.recv() => {
                let Some(record) = record else {
                    break Ok(());
                };
                if let Err(e) = print_json_line(&record) {
                    break Err(e);
                }
                if mode == TriggerMode::Manual {
                    break Ok(());
                }
            }
        }
    };

    dispatcher.stop().await;
    log_summary(&dispatcher.status());
    result
}

fn log_summary(status: &TriggerStatus) {
    let format_ts = |ts: Option<i64>| {
        ts.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "-".to_string())
    };

    info!(
        trigger_id = %status.id,
        activated_at = %format_ts(status.activated_at),
        last_triggered_at = %format_ts(status.last_triggered_at),
        trigger_count = status.trigger_count,
        dropped_duplicates = status.dropped_duplicates,
        ack_failures = status.ack_failures,
        emission_failures = status.emission_failures,
        "Trigger summary"
    );
}
