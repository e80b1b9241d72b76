//! Outbound intent dispatch over the host channel.
//!
//! Sending is fire-and-forget: there is no acknowledgement and no retry. A
//! failed send is reported back to the caller so the reducer can undo the
//! optimistic effect.

use conclave_events::Intent;
use std::io::Write;
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to encode intent: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to write to host channel: {0}")]
    Io(#[from] std::io::Error),
    #[error("Host channel closed")]
    Closed,
}

/// One-way channel to the host.
pub trait HostChannel {
    fn post(&mut self, intent: &Intent) -> Result<(), ChannelError>;
}

/// Writes one `{"type", "payload"}` JSON object per line.
#[derive(Debug)]
pub struct JsonLinesChannel<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HostChannel for JsonLinesChannel<W> {
    fn post(&mut self, intent: &Intent) -> Result<(), ChannelError> {
        let line = serde_json::to_string(intent)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Hands intents to an in-process consumer.
#[derive(Debug, Clone)]
pub struct MpscChannel {
    sender: mpsc::UnboundedSender<Intent>,
}

impl MpscChannel {
    pub fn new(sender: mpsc::UnboundedSender<Intent>) -> Self {
        Self { sender }
    }

    pub fn pair() -> (Self, mpsc::UnboundedReceiver<Intent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl HostChannel for MpscChannel {
    fn post(&mut self, intent: &Intent) -> Result<(), ChannelError> {
        self.sender
            .send(intent.clone())
            .map_err(|_| ChannelError::Closed)
    }
}

pub struct Dispatcher<C: HostChannel> {
    channel: C,
}

impl<C: HostChannel> Dispatcher<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Send every intent in order. Returns the ones that could not be sent.
    pub fn dispatch(&mut self, intents: Vec<Intent>) -> Vec<Intent> {
        let mut failed = Vec::new();
        for intent in intents {
            match self.channel.post(&intent) {
                Ok(()) => tracing::debug!(intent = intent.wire_type(), "Intent dispatched"),
                Err(e) => {
                    tracing::warn!(intent = intent.wire_type(), error = %e, "Intent dispatch failed");
                    failed.push(intent);
                }
            }
        }
        failed
    }
}
