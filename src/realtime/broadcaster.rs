use crate::{domain::EventEnvelope, error::Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, warn};

/// One outbound realtime message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// `/topic/board/{slug}/{category}`
    pub topic: String,
    /// `{"type": <EVENT_TAG>, "payload": {...}}`
    pub body: serde_json::Value,
}

impl BroadcastMessage {
    pub fn from_envelope(envelope: &EventEnvelope) -> Result<Self> {
        Ok(Self {
            topic: envelope.topic(),
            body: serde_json::to_value(&envelope.event)?,
        })
    }
}

/// Transport side of the broadcaster (websocket hub or a test recorder)
pub trait MessageSink: Send + Sync {
    fn deliver(&self, message: BroadcastMessage);
}

/// Turns each published event into exactly one topic message
pub struct Broadcaster<S: MessageSink> {
    receiver: broadcast::Receiver<EventEnvelope>,
    sink: Arc<S>,
}

impl<S: MessageSink + 'static> Broadcaster<S> {
    pub fn new(receiver: broadcast::Receiver<EventEnvelope>, sink: Arc<S>) -> Self {
        Self { receiver, sink }
    }

    pub fn handle(&self, envelope: &EventEnvelope) {
        match BroadcastMessage::from_envelope(envelope) {
            Ok(message) => {
                debug!(topic = %message.topic, event = envelope.event.tag(), "broadcasting");
                self.sink.deliver(message);
            }
            Err(err) => error!(
                board = %envelope.board_slug,
                event = envelope.event.tag(),
                error = %err,
                "failed to encode realtime message"
            ),
        }
    }

    /// Runs until every publisher is gone
    pub async fn run(mut self) {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => self.handle(&envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "broadcaster lagged, clients must refetch board state");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("event channel closed, broadcaster stopping");
                    break;
                }
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
