//! Realtime sync client.
//!
//! Connects to the wall channel, decodes messages into [`ServerMessage`]s
//! for the session, and reconnects with an additively growing delay when the
//! connection drops. Status transitions are published through a watch
//! channel so the runner can surface them.

use crate::config::NetworkConfig;
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientMessage, ProtocolError, ServerMessage};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// User-visible channel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Connecting,
    Open,
    Retrying { attempt: u32, delay_ms: u64 },
    Failed,
}

impl ChannelStatus {
    /// Short status line for the operator surface.
    pub fn message(&self) -> String {
        match self {
            ChannelStatus::Connecting => "Please wait...".to_string(),
            ChannelStatus::Open => "Connected".to_string(),
            ChannelStatus::Retrying { attempt, delay_ms } => {
                format!("Connection lost, retry {attempt} in {delay_ms}ms")
            }
            ChannelStatus::Failed => "Connection failed".to_string(),
        }
    }
}

/// Additive-backoff reconnect schedule.
///
/// The delay starts at the configured value and grows by a fixed step after
/// every failed attempt; a successful connect resets it.
#[derive(Debug)]
pub struct ReconnectPolicy {
    attempts: u32,
    delay_ms: u64,
    initial_delay_ms: u64,
    step_ms: u64,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            attempts: 0,
            delay_ms: config.reconnect_delay_ms,
            initial_delay_ms: config.reconnect_delay_ms,
            step_ms: config.reconnect_step_ms,
            max_attempts: config.max_reconnect_attempts,
        }
    }

    /// Reset after a successful connect.
    pub fn on_open(&mut self) {
        self.attempts = 0;
        self.delay_ms = self.initial_delay_ms;
    }

    /// Delay before the next attempt, or None when attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        let delay = self.delay_ms;
        self.delay_ms += self.step_ms;
        Some(Duration::from_millis(delay))
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Drive the channel until the event receiver is dropped or attempts run out.
pub async fn run(
    config: NetworkConfig,
    events: mpsc::UnboundedSender<ServerMessage>,
    status: watch::Sender<ChannelStatus>,
) {
    let mut policy = ReconnectPolicy::new(&config);

    loop {
        let _ = status.send(ChannelStatus::Connecting);

        match connect_async(config.endpoint.as_str()).await {
            Ok((ws, _)) => {
                info!("Channel connected: {}", config.endpoint);
                policy.on_open();
                let _ = status.send(ChannelStatus::Open);

                let (mut sink, mut stream) = ws.split();
                if let Err(e) = sink
                    .send(Message::Text(ClientMessage::GetBotInfo.to_json().into()))
                    .await
                {
                    warn!("Failed to request bot info: {e}");
                }

                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(Message::Text(text)) => match ServerMessage::parse(text.as_str()) {
                            Ok(message) => {
                                if events.send(message).is_err() {
                                    // Session is gone; stop quietly.
                                    return;
                                }
                            }
                            Err(ProtocolError::UnknownType(t)) => {
                                warn!("Unknown sticker action: {t}")
                            }
                            Err(e) => warn!("Dropping malformed message: {e}"),
                        },
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Channel error: {e}");
                            break;
                        }
                    }
                }
                info!("Channel closed");
            }
            Err(e) => warn!("Connect failed: {e}"),
        }

        match policy.next_delay() {
            Some(delay) => {
                let _ = status.send(ChannelStatus::Retrying {
                    attempt: policy.attempts(),
                    delay_ms: delay.as_millis() as u64,
                });
                tokio::time::sleep(delay).await;
            }
            None => {
                warn!("Reconnect attempts exhausted");
                let _ = status.send(ChannelStatus::Failed);
                return;
            }
        }
    }
}
