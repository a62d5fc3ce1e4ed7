use serde::Serialize;
use tokio::sync::broadcast;

use super::events::ChangeEvent;

/// What subscribers receive from the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "event", rename_all = "snake_case")]
pub enum FeedMessage {
    Change(ChangeEvent),
    /// Events may have been missed; consumers should reload a fresh snapshot
    Resync,
}

/// In-process fan-out of decoded change events
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<FeedMessage>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedMessage> {
        self.sender.subscribe()
    }

    /// Publish a change; returns how many subscribers will see it
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.send(FeedMessage::Change(event))
    }

    /// Tell every subscriber that the upstream subscription was re-established
    pub fn request_resync(&self) -> usize {
        self.send(FeedMessage::Resync)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn send(&self, message: FeedMessage) -> usize {
        // No subscribers is not an error, the message is simply dropped
        self.sender.send(message).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::realtime::{Change, EntityKey};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber_in_order() {
        let feed = ChangeFeed::new(8);
        let mut first = feed.subscribe();
        let mut second = feed.subscribe();

        let a = ChangeEvent::App(Change::Delete(EntityKey { id: Uuid::new_v4() }));
        let b = ChangeEvent::Category(Change::Delete(EntityKey { id: Uuid::new_v4() }));
        assert_eq!(feed.publish(a.clone()), 2);
        assert_eq!(feed.publish(b.clone()), 2);

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.recv().await.unwrap(), FeedMessage::Change(a.clone()));
            assert_eq!(rx.recv().await.unwrap(), FeedMessage::Change(b.clone()));
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let feed = ChangeFeed::new(4);
        assert_eq!(feed.subscriber_count(), 0);
        assert_eq!(feed.request_resync(), 0);
    }

    #[test]
    fn test_feed_message_wire_format() {
        let id = Uuid::nil();
        let message = FeedMessage::Change(ChangeEvent::App(Change::Delete(EntityKey { id })));
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["type"], "change");
        assert_eq!(json["event"]["table"], "app");
        assert_eq!(json["event"]["change"]["kind"], "delete");
        assert_eq!(json["event"]["change"]["record"]["id"], id.to_string());

        let resync = serde_json::to_value(FeedMessage::Resync).unwrap();
        assert_eq!(resync["type"], "resync");
    }
}
