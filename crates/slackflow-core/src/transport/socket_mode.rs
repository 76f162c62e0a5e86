//! Slack Socket Mode transport.
//!
//! Opens a WebSocket URL through `apps.connections.open`, reads envelopes
//! and hands each one to the matching handlers on their own tasks.
//! Events API and slash command envelopes are acknowledged on receipt;
//! interactive envelopes carry a one-shot acknowledgment capability so the
//! handler decides when to answer.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use slackflow_models::{ConnectionSettings, SlackCredentials, WireListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{EnvelopeHandler, EventTransport, ListenerTable};
use crate::envelope::{Acknowledge, EnvelopeContext, RawEnvelope};
use crate::error::{Result, TriggerError};
use crate::slack::SlackWebClient;

type SlackSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Disconnect reason after which Slack will not accept the app again.
const LINK_DISABLED: &str = "link_disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnvelopeKind {
    EventsApi,
    Interactive,
    SlashCommand,
}

impl EnvelopeKind {
    /// Whether the transport answers the envelope itself.
    fn auto_ack(&self) -> bool {
        !matches!(self, Self::Interactive)
    }
}

#[derive(Debug)]
pub(crate) struct InboundEnvelope {
    envelope_id: String,
    kind: EnvelopeKind,
    /// `None` when no category can listen to the envelope.
    envelope: Option<RawEnvelope>,
}

#[derive(Debug)]
pub(crate) enum Frame {
    Hello,
    Disconnect { reason: String },
    Envelope(InboundEnvelope),
    Ignored(String),
}

/// Decode one Socket Mode text frame.
pub(crate) fn parse_frame(text: &str) -> Result<Frame> {
    let frame: Value = serde_json::from_str(text)?;
    let frame_type = frame["type"].as_str().unwrap_or("");

    let kind = match frame_type {
        "hello" => return Ok(Frame::Hello),
        "disconnect" => {
            return Ok(Frame::Disconnect {
                reason: frame["reason"].as_str().unwrap_or("unknown").to_string(),
            });
        }
        "events_api" => EnvelopeKind::EventsApi,
        "interactive" => EnvelopeKind::Interactive,
        "slash_commands" => EnvelopeKind::SlashCommand,
        other => return Ok(Frame::Ignored(other.to_string())),
    };

    let Some(envelope_id) = frame["envelope_id"].as_str() else {
        return Ok(Frame::Ignored(format!("{} without envelope_id", frame_type)));
    };

    let payload = frame.get("payload").cloned().unwrap_or(Value::Null);
    let context = EnvelopeContext::from_body(&payload)
        .with_envelope_id(envelope_id)
        .with_retry(
            frame["retry_attempt"]
                .as_u64()
                .map_or(0, |attempt| u32::try_from(attempt).unwrap_or(u32::MAX)),
            frame["retry_reason"]
                .as_str()
                .filter(|reason| !reason.is_empty())
                .map(str::to_string),
        );

    let envelope = match kind {
        EnvelopeKind::EventsApi => Some(RawEnvelope::event_callback(payload)),
        EnvelopeKind::Interactive => RawEnvelope::interactive(payload),
        EnvelopeKind::SlashCommand => None,
    };

    Ok(Frame::Envelope(InboundEnvelope {
        envelope_id: envelope_id.to_string(),
        kind,
        envelope: envelope.map(|envelope| envelope.with_context(context)),
    }))
}

fn ack_frame(envelope_id: &str) -> WsMessage {
    WsMessage::Text(json!({"envelope_id": envelope_id}).to_string().into())
}

struct AckRequest {
    envelope_id: String,
    reply: oneshot::Sender<Result<()>>,
}

/// Acknowledgment routed back through the session's writer. Only the first
/// call sends; later calls succeed without sending.
struct SocketAck {
    envelope_id: String,
    sent: AtomicBool,
    tx: mpsc::UnboundedSender<AckRequest>,
}

#[async_trait]
impl Acknowledge for SocketAck {
    async fn ack(&self) -> Result<()> {
        if self.sent.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let (reply, response) = oneshot::channel();
        self.tx
            .send(AckRequest {
                envelope_id: self.envelope_id.clone(),
                reply,
            })
            .map_err(|_| TriggerError::Acknowledgment("socket session closed".to_string()))?;

        response
            .await
            .map_err(|_| TriggerError::Acknowledgment("socket session closed".to_string()))?
    }
}

enum SocketEnd {
    Cancelled,
    Reconnect,
    Terminated,
}

/// What a running session needs; cloned into the read loop.
#[derive(Clone)]
struct SessionContext {
    app_token: String,
    web: SlackWebClient,
    listeners: ListenerTable,
    reconnect_delay: Duration,
}

impl SessionContext {
    async fn connect(&self) -> Result<SlackSocket> {
        let url = self.web.open_connection(&self.app_token).await?;
        info!("Connecting to Slack Socket Mode");
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        Ok(socket)
    }

    fn dispatch(&self, envelope: RawEnvelope) {
        for handler in self.listeners.handlers_for(&envelope) {
            let envelope = envelope.clone();
            tokio::spawn(async move {
                handler.handle(envelope).await;
            });
        }
    }

    async fn run(self, mut socket: SlackSocket, cancel: CancellationToken) {
        loop {
            match self.read_socket(socket, &cancel).await {
                SocketEnd::Cancelled | SocketEnd::Terminated => return,
                SocketEnd::Reconnect => {}
            }

            socket = loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(self.reconnect_delay) => {}
                }
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    result = self.connect() => match result {
                        Ok(socket) => break socket,
                        Err(e) => warn!(error = %e, "Slack Socket Mode reconnect failed"),
                    }
                }
            };
        }
    }

    async fn read_socket(&self, socket: SlackSocket, cancel: &CancellationToken) -> SocketEnd {
        let (mut ws_write, mut ws_read) = socket.split();
        let (ack_tx, mut ack_rx) = mpsc::unbounded_channel::<AckRequest>();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    if let Err(e) = ws_write.send(WsMessage::Close(None)).await {
                        debug!(error = %e, "Failed to close Slack WebSocket");
                    }
                    return SocketEnd::Cancelled;
                }
                Some(request) = ack_rx.recv() => {
                    let result = ws_write
                        .send(ack_frame(&request.envelope_id))
                        .await
                        .map_err(|e| TriggerError::Acknowledgment(e.to_string()));
                    // the handler may have stopped waiting
                    let _ = request.reply.send(result);
                }
                msg = ws_read.next() => {
                    let text = match msg {
                        Some(Ok(WsMessage::Text(text))) => text,
                        Some(Ok(WsMessage::Ping(data))) => {
                            if let Err(e) = ws_write.send(WsMessage::Pong(data)).await {
                                warn!(error = %e, "Failed to answer Slack ping");
                            }
                            continue;
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            info!("Slack Socket Mode connection closed, will reconnect");
                            return SocketEnd::Reconnect;
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            warn!(error = %e, "Slack WebSocket error");
                            return SocketEnd::Reconnect;
                        }
                    };

                    let frame = match parse_frame(text.as_str()) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "Skipping malformed Socket Mode frame");
                            continue;
                        }
                    };

                    match frame {
                        Frame::Hello => info!("Slack Socket Mode connection established"),
                        Frame::Disconnect { reason } if reason == LINK_DISABLED => {
                            error!(reason = %reason, "Slack disabled the Socket Mode link");
                            return SocketEnd::Terminated;
                        }
                        Frame::Disconnect { reason } => {
                            info!(reason = %reason, "Slack requested disconnect, will reconnect");
                            return SocketEnd::Reconnect;
                        }
                        Frame::Ignored(frame_type) => {
                            debug!(frame_type = %frame_type, "Ignoring Socket Mode frame");
                        }
                        Frame::Envelope(inbound) => {
                            let matched = inbound
                                .envelope
                                .as_ref()
                                .is_some_and(|envelope| !self.listeners.handlers_for(envelope).is_empty());

                            if inbound.kind.auto_ack() || !matched {
                                if let Err(e) = ws_write.send(ack_frame(&inbound.envelope_id)).await {
                                    warn!(
                                        envelope_id = %inbound.envelope_id,
                                        error = %e,
                                        "Failed to ACK Slack envelope"
                                    );
                                }
                            }

                            let Some(envelope) = inbound.envelope.filter(|_| matched) else {
                                continue;
                            };

                            let envelope = if inbound.kind.auto_ack() {
                                envelope
                            } else {
                                envelope.with_ack(Arc::new(SocketAck {
                                    envelope_id: inbound.envelope_id.clone(),
                                    sent: AtomicBool::new(false),
                                    tx: ack_tx.clone(),
                                }))
                            };
                            self.dispatch(envelope);
                        }
                    }
                }
            }
        }
    }
}

struct Session {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Socket Mode session with automatic reconnection.
pub struct SocketModeTransport {
    context: SessionContext,
    running: Arc<AtomicBool>,
    session: Mutex<Option<Session>>,
}

impl SocketModeTransport {
    pub fn new(credentials: &SlackCredentials, settings: &ConnectionSettings) -> Result<Self> {
        if let Some(field) = credentials.missing_field() {
            return Err(TriggerError::MissingCredential(field));
        }

        Ok(Self {
            context: SessionContext {
                app_token: credentials.app_token.clone(),
                web: SlackWebClient::new(settings)?,
                listeners: ListenerTable::new(),
                reconnect_delay: Duration::from_millis(settings.reconnect_delay_ms),
            },
            running: Arc::new(AtomicBool::new(false)),
            session: Mutex::new(None),
        })
    }

    /// Point Web API calls somewhere else.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.context.web = self.context.web.with_api_base(api_base);
        self
    }
}

#[async_trait]
impl EventTransport for SocketModeTransport {
    fn register(&self, listener: WireListener, handler: Arc<dyn EnvelopeHandler>) -> Result<()> {
        if self.is_running() {
            return Err(TriggerError::Subscription {
                category: listener.to_string(),
                reason: "transport already started".to_string(),
            });
        }
        self.context.listeners.insert(listener, handler);
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(TriggerError::Session(
                "Slack Socket Mode already running".to_string(),
            ));
        }

        let socket = match self.context.connect().await {
            Ok(socket) => socket,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(TriggerError::Session(format!(
                    "failed to open Slack Socket Mode connection: {}",
                    e
                )));
            }
        };

        let cancel = CancellationToken::new();
        let running = Arc::clone(&self.running);
        let context = self.context.clone();
        let session_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let _guard = scopeguard::guard(running, |running| {
                running.store(false, Ordering::SeqCst);
            });
            context.run(socket, session_cancel).await;
            info!("Slack Socket Mode session ended");
        });

        *self.session.lock() = Some(Session { cancel, task });
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let session = self.session.lock().take();
        let Some(session) = session else {
            return Ok(());
        };

        session.cancel.cancel();
        session
            .task
            .await
            .map_err(|e| TriggerError::Session(format!("session task failed: {}", e)))?;
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
