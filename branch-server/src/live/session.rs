//! WebSocket session loop
//!
//! Protocol:
//! - Server → client: [`LiveEvent`] frames (`{"event": ..., "payload": ...}`)
//! - Client → server: [`ClientCommand`] control frames (join-room, leave-room,
//!   subscribe)
//!
//! A session starts in global mode (no joined rooms, receives every event).
//! Joining a room narrows it to global events plus events scoped to one of
//! its rooms.

use std::collections::HashSet;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use shared::live::{ClientCommand, LiveEvent};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub async fn run(socket: WebSocket, state: AppState, client: String) {
    let (mut sink, mut stream) = socket.split();

    let session_id = state.hub.register_session(client.clone());
    tracing::info!(client = %client, session_id, "Live WS connected");

    let mut hub_rx = state.hub.subscribe();
    let mut joined: HashSet<String> = HashSet::new();

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            envelope = hub_rx.recv() => {
                match envelope {
                    Ok(env) => {
                        if env.matches(&joined)
                            && send_event(&mut sink, &env.event).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Resubscribe from the current position; the client is
                        // expected to re-fetch state over the REST API.
                        tracing::warn!(client = %client, lagged = n, "Live subscriber lagged, resubscribing");
                        hub_rx = state.hub.subscribe();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(cmd) = serde_json::from_str::<ClientCommand>(&text) {
                            apply_command(cmd, &mut joined, &client);
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.hub.unregister_session(session_id);
    tracing::info!(client = %client, session_id, "Live WS disconnected");
}

fn apply_command(cmd: ClientCommand, joined: &mut HashSet<String>, client: &str) {
    match cmd {
        ClientCommand::JoinRoom { room } => {
            tracing::debug!(client = %client, room = %room, "join room");
            joined.insert(room);
        }
        ClientCommand::LeaveRoom { room } => {
            joined.remove(&room);
        }
        ClientCommand::Subscribe { rooms } => {
            *joined = rooms.into_iter().collect();
        }
    }
}

async fn send_event<S>(sink: &mut S, event: &LiveEvent) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_and_leave_update_room_set() {
        let mut joined = HashSet::new();
        apply_command(ClientCommand::JoinRoom { room: "product:1".into() }, &mut joined, "t");
        apply_command(ClientCommand::JoinRoom { room: "product:2".into() }, &mut joined, "t");
        assert_eq!(joined.len(), 2);

        apply_command(ClientCommand::LeaveRoom { room: "product:1".into() }, &mut joined, "t");
        assert!(!joined.contains("product:1"));
        assert!(joined.contains("product:2"));
    }

    #[test]
    fn subscribe_replaces_room_set() {
        let mut joined = HashSet::from(["product:1".to_string()]);
        apply_command(
            ClientCommand::Subscribe { rooms: vec!["product:9".into()] },
            &mut joined,
            "t",
        );
        assert_eq!(joined, HashSet::from(["product:9".to_string()]));

        // empty subscribe returns the session to global mode
        apply_command(ClientCommand::Subscribe { rooms: vec![] }, &mut joined, "t");
        assert!(joined.is_empty());
    }
}
