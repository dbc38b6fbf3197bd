use crate::realtime::broadcaster::{BroadcastMessage, MessageSink};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// A live subscription to one topic
pub struct Subscription {
    pub token: Uuid,
    pub receiver: mpsc::UnboundedReceiver<BroadcastMessage>,
}

/// Connected clients per topic, e.g. `/topic/board/abcd1234/cards`
#[derive(Default)]
pub struct TopicRegistry {
    topics: DashMap<String, DashMap<Uuid, mpsc::UnboundedSender<BroadcastMessage>>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, topic: impl Into<String>) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let token = Uuid::new_v4();
        let entry = self.topics.entry(topic.into()).or_default();
        entry.insert(token, sender);
        Subscription { token, receiver }
    }

    pub fn unregister(&self, topic: &str, token: Uuid) {
        if let Some(entry) = self.topics.get(topic) {
            entry.remove(&token);
        }
        self.topics.remove_if(topic, |_, subscribers| subscribers.is_empty());
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map(|entry| entry.len()).unwrap_or(0)
    }
}

impl MessageSink for TopicRegistry {
    fn deliver(&self, message: BroadcastMessage) {
        let stale: Vec<Uuid> = match self.topics.get(&message.topic) {
            Some(entry) => entry
                .iter()
                .filter(|subscriber| subscriber.value().send(message.clone()).is_err())
                .map(|subscriber| *subscriber.key())
                .collect(),
            None => return,
        };
        for token in stale {
            debug!(topic = %message.topic, %token, "dropping closed subscriber");
            self.unregister(&message.topic, token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(topic: &str) -> BroadcastMessage {
        BroadcastMessage {
            topic: topic.to_string(),
            body: json!({ "type": "ONLINE", "payload": {} }),
        }
    }

    #[tokio::test]
    async fn test_delivers_only_to_matching_topic() {
        let registry = TopicRegistry::new();
        let mut cards = registry.register("/topic/board/aaaa1111/cards");
        let mut votes = registry.register("/topic/board/aaaa1111/votes");

        registry.deliver(message("/topic/board/aaaa1111/cards"));

        let received = cards.receiver.recv().await.unwrap();
        assert_eq!(received.topic, "/topic/board/aaaa1111/cards");
        assert!(votes.receiver.try_recv().is_err());
    }

    #[test]
    fn test_unregister_and_stale_cleanup() {
        let registry = TopicRegistry::new();
        let topic = "/topic/board/aaaa1111/phase";
        let kept = registry.register(topic);
        let dropped = registry.register(topic);
        assert_eq!(registry.subscriber_count(topic), 2);

        drop(dropped.receiver);
        registry.deliver(message(topic));
        assert_eq!(registry.subscriber_count(topic), 1);

        registry.unregister(topic, kept.token);
        assert_eq!(registry.subscriber_count(topic), 0);
    }
}
