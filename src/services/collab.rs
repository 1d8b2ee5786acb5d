use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;

const ROOM_BUFFER: usize = 64;

/// Per-document fan-out channels for the live collaboration relay. A room
/// lives while at least one socket holds a receiver; the last leave drops it.
#[derive(Clone, Default)]
pub struct CollabHub {
    rooms: Arc<DashMap<String, broadcast::Sender<String>>>,
}

impl CollabHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins a document room, creating it on first entry. The returned sender
    /// fans out to every member of the room, the receiver included.
    pub fn join(
        &self,
        document_id: &str,
    ) -> (broadcast::Sender<String>, broadcast::Receiver<String>) {
        let sender = self
            .rooms
            .entry(document_id.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_BUFFER).0)
            .clone();
        let receiver = sender.subscribe();
        (sender, receiver)
    }

    /// Call after dropping a receiver; removes the room once empty.
    pub fn leave(&self, document_id: &str) {
        self.rooms
            .remove_if(document_id, |_, sender| sender.receiver_count() == 0);
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
