use crate::{config::RetroConfig, domain::EventEnvelope};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Receives committed events; never blocks and never fails the caller
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: EventEnvelope);

    /// Publishes in order, one call per event
    fn publish_all(&self, events: Vec<EventEnvelope>) {
        for event in events {
            self.publish(event);
        }
    }
}

/// Fans events out over a tokio broadcast channel
pub struct ChannelPublisher {
    sender: broadcast::Sender<EventEnvelope>,
}

impl ChannelPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Channel sized by `broadcast_capacity`
    pub fn from_config(config: &RetroConfig) -> Self {
        Self::new(config.broadcast_capacity)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: EventEnvelope) {
        let board = event.board_slug.clone();
        let tag = event.event.tag();
        match self.sender.send(event) {
            Ok(receivers) => debug!(board = %board, event = tag, receivers, "event published"),
            Err(_) => warn!(board = %board, event = tag, "no subscribers, event dropped"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Keeps every published event for assertions
    #[derive(Default)]
    pub struct RecordingPublisher {
        events: Mutex<Vec<EventEnvelope>>,
    }

    impl RecordingPublisher {
        pub fn take(&self) -> Vec<EventEnvelope> {
            std::mem::take(&mut *self.events.lock())
        }

        pub fn tags(&self) -> Vec<&'static str> {
            self.events.lock().iter().map(|e| e.event.tag()).collect()
        }
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, event: EventEnvelope) {
            self.events.lock().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainEvent, Events, ParticipantId, Slug};

    fn envelopes(n: usize) -> Vec<EventEnvelope> {
        let mut events = Events::new(Slug::parse("pub00001").unwrap());
        for _ in 0..n {
            events.record(DomainEvent::ParticipantOnline {
                participant_id: ParticipantId::new(),
            });
        }
        events.drain()
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let publisher = ChannelPublisher::new(16);
        let mut receiver = publisher.subscribe();
        let sent = envelopes(3);

        publisher.publish_all(sent.clone());
        for expected in sent {
            assert_eq!(receiver.recv().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_capacity_from_config() {
        let config = RetroConfig {
            broadcast_capacity: 2,
            ..RetroConfig::default()
        };
        let publisher = ChannelPublisher::from_config(&config);
        let mut receiver = publisher.subscribe();
        let sent = envelopes(3);

        publisher.publish_all(sent.clone());
        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(receiver.recv().await.unwrap(), sent[1]);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = ChannelPublisher::new(4);
        publisher.publish_all(envelopes(2));
    }
}
