//! In-process broadcast bus standing in for the page's message channel.
//!
//! Every subscriber sees every message, including the ones it posted itself,
//! so receivers must filter on the envelope tag.
//!
//! There is no cross-window origin here: only handles cloned from one
//! `MessageBus` can post, so the envelope tag (`FROM_LUNIE_EXTENSION` vs
//! `FROM_LUNIE_IO`) is the only sender discriminator. Embedders bridging a
//! real page channel must check the event source before posting onto the bus.

use serde_json::Value;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct MessageBus {
    sender: broadcast::Sender<Value>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fire and forget; a bus nobody listens on silently drops the message.
    pub fn post(&self, message: Value) {
        let _ = self.sender.send(message);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.sender.subscribe()
    }

    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn broadcasts_to_every_subscriber() {
        let bus = MessageBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.listeners(), 2);

        bus.post(json!({"type": "ping"}));
        assert_eq!(a.recv().await.unwrap(), json!({"type": "ping"}));
        assert_eq!(b.recv().await.unwrap(), json!({"type": "ping"}));
    }

    #[test]
    fn posting_without_listeners_is_fine() {
        MessageBus::new().post(json!(null));
    }
}
