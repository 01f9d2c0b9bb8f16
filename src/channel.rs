//! Message contract between the host and the isolated render surface.
//!
//! Outbound: `{"type":"update", ...RenderConfig}` and `{"type":"flash"}`.
//! Inbound: `{"type":"save","data":"<base64 png>"}`; any other `type` is a
//! protocol violation that gets reported but does not end the session.
//!
//! The surface is untrusted. Only the `type` discriminator is relied upon;
//! a missing or non-string `data` is tolerated.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::render_config::RenderConfig;

/// Host -> surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// New snapshot to paint.
    Update(RenderConfig),
    /// Shutter animation.
    Flash,
}

impl OutboundMessage {
    /// One line of the JSON-lines transport, newline included.
    pub fn encode_line(&self) -> Result<Vec<u8>, ChannelError> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Surface -> host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Save { data: Option<String> },
    Unknown { kind: String },
}

impl InboundMessage {
    /// Interpret a decoded JSON message.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ChannelError> {
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| ChannelError::Malformed("message has no string \"type\"".to_string()))?;

        Ok(match kind {
            "save" => InboundMessage::Save {
                data: value.get("data").and_then(|d| d.as_str()).map(str::to_string),
            },
            other => InboundMessage::Unknown {
                kind: other.to_string(),
            },
        })
    }

    /// Parse one JSON-encoded message.
    pub fn parse(text: &str) -> Result<Self, ChannelError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ChannelError::Malformed(e.to_string()))?;
        Self::from_value(&value)
    }

    /// The message's `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            InboundMessage::Save { .. } => "save",
            InboundMessage::Unknown { kind } => kind,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("render surface is closed")]
    Closed,
    #[error("malformed message from render surface: {0}")]
    Malformed(String),
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Somewhere outbound messages can be posted.
///
/// Delivery is ordered and at most once; a failed post is not retried.
pub trait RenderSurface: Clone + Send + Sync + 'static {
    fn post(&self, message: OutboundMessage) -> Result<(), ChannelError>;
}

/// A surface backed by an in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelSurface {
    /// Create a surface and the receiver its messages arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl RenderSurface for ChannelSurface {
    fn post(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        self.tx.send(message).map_err(|_| ChannelError::Closed)
    }
}
