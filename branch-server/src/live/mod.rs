//! LiveHub — real-time event fan-out
//!
//! Single-process broadcast of [`LiveEvent`] frames to every connected
//! WebSocket session.
//!
//! ```text
//! API handler (post-commit)
//!       │ broadcast / broadcast_to_room
//!       ▼
//! LiveHub
//!   ├── tx: broadcast::Sender<Envelope> (fan-out to all sessions)
//!   └── sessions: registry for connection accounting
//!             │
//!             ▼
//! WS session task (recv → room filter → push frame)
//! ```
//!
//! Room filtering happens on the receiving side: each session keeps its own
//! joined-room set and drops envelopes that do not match. An envelope with
//! `room: None` is global and reaches every session.

pub mod session;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use shared::live::LiveEvent;
use tokio::sync::broadcast;

/// Broadcast channel capacity — enough to absorb bursts from bulk imports
const BROADCAST_CAPACITY: usize = 256;

/// One broadcast frame: the event plus its optional room scope
#[derive(Debug, Clone)]
pub struct Envelope {
    /// `None` means global (delivered to every session)
    pub room: Option<String>,
    pub event: LiveEvent,
}

impl Envelope {
    /// Whether a session with the given joined-room set should receive this.
    ///
    /// A session that never joined a room listens globally and receives
    /// everything. Once it joins rooms it only sees global envelopes plus
    /// envelopes scoped to one of its rooms.
    pub fn matches(&self, joined: &HashSet<String>) -> bool {
        match &self.room {
            None => true,
            Some(room) => joined.is_empty() || joined.contains(room),
        }
    }
}

/// Global fan-out hub, cheap to clone
#[derive(Clone)]
pub struct LiveHub {
    tx: broadcast::Sender<Envelope>,
    /// session_id → client label (remote address)
    sessions: Arc<DashMap<u64, String>>,
    next_session: Arc<AtomicU64>,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            sessions: Arc::new(DashMap::new()),
            next_session: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Broadcast an event to every connected session
    pub fn broadcast(&self, event: LiveEvent) {
        tracing::debug!(event = event.name(), "broadcast");
        // send returns Err when no subscriber is connected, safe to ignore
        let _ = self.tx.send(Envelope { room: None, event });
    }

    /// Broadcast an event scoped to a named room
    pub fn broadcast_to_room(&self, room: impl Into<String>, event: LiveEvent) {
        let room = room.into();
        tracing::debug!(event = event.name(), room = %room, "broadcast to room");
        let _ = self.tx.send(Envelope {
            room: Some(room),
            event,
        });
    }

    /// Subscribe to the broadcast channel
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    /// Register a new WS session, returns its id
    pub fn register_session(&self, label: impl Into<String>) -> u64 {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(id, label.into());
        id
    }

    /// Remove a WS session from the registry
    pub fn unregister_session(&self, id: u64) {
        self.sessions.remove(&id);
    }

    /// Number of currently connected WS sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::live::product_room;

    #[test]
    fn global_envelope_matches_everyone() {
        let env = Envelope {
            room: None,
            event: LiveEvent::TestDataLoaded { count: 1 },
        };
        assert!(env.matches(&HashSet::new()));
        assert!(env.matches(&HashSet::from(["product:1".to_string()])));
    }

    #[test]
    fn room_envelope_respects_joined_set() {
        let env = Envelope {
            room: Some(product_room(7)),
            event: LiveEvent::ProductDeleted { product_id: 7 },
        };
        // no joined rooms → global listener, receives everything
        assert!(env.matches(&HashSet::new()));
        assert!(env.matches(&HashSet::from([product_room(7)])));
        assert!(!env.matches(&HashSet::from([product_room(8)])));
    }

    #[tokio::test]
    async fn subscribers_receive_broadcasts() {
        let hub = LiveHub::new();
        let mut rx = hub.subscribe();

        hub.broadcast(LiveEvent::TestDataLoaded { count: 30 });
        let env = rx.recv().await.unwrap();
        assert!(env.room.is_none());
        assert_eq!(env.event.name(), "test-data-loaded");

        hub.broadcast_to_room(product_room(3), LiveEvent::ProductDeleted { product_id: 3 });
        let env = rx.recv().await.unwrap();
        assert_eq!(env.room.as_deref(), Some("product:3"));
    }

    #[test]
    fn broadcast_without_subscribers_is_silent() {
        let hub = LiveHub::new();
        hub.broadcast(LiveEvent::TestDataLoaded { count: 0 });
    }

    #[test]
    fn session_registry_counts() {
        let hub = LiveHub::new();
        assert_eq!(hub.session_count(), 0);
        let a = hub.register_session("127.0.0.1:1000");
        let b = hub.register_session("127.0.0.1:1001");
        assert_eq!(hub.session_count(), 2);
        hub.unregister_session(a);
        assert_eq!(hub.session_count(), 1);
        hub.unregister_session(b);
        assert_eq!(hub.session_count(), 0);
    }
}
