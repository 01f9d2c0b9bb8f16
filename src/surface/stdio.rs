//! JSON-lines transport to an out-of-process render surface.
//!
//! One message per line in each direction: outbound messages are written to
//! the surface's input, inbound messages are read from its output. End of
//! input means the surface was disposed.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::channel::{ChannelError, ChannelSurface, InboundMessage};
use crate::coordinator::SessionEvent;

/// Serialize everything posted to the returned surface onto `writer`.
pub fn spawn_writer<W>(writer: W) -> (ChannelSurface, JoinHandle<io::Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (surface, mut rx) = ChannelSurface::new();
    let handle = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(message) = rx.recv().await {
            let line = message.encode_line().map_err(io::Error::other)?;
            writer.write_all(&line).await?;
            writer.flush().await?;
        }
        Ok(())
    });
    (surface, handle)
}

/// Forward every line of `reader` to `events`, then report disposal.
pub fn spawn_reader<R>(reader: R, events: mpsc::UnboundedSender<SessionEvent>) -> JoinHandle<io::Result<()>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if events.send(parse_event(line)).is_err() {
                return Ok(());
            }
        }
        log::debug!("Render surface closed its output");
        let _ = events.send(SessionEvent::Disposed);
        Ok(())
    })
}

fn parse_event(line: &str) -> SessionEvent {
    match InboundMessage::parse(line) {
        Ok(message) => SessionEvent::Message(message),
        Err(ChannelError::Malformed(detail)) => SessionEvent::ProtocolError(detail),
        Err(e) => SessionEvent::ProtocolError(e.to_string()),
    }
}
