//! Room membership and fan-out.

use dashmap::DashMap;
use strata_core::ServerMessage;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::error;

const CHANNEL_CAPACITY: usize = 256;

/// Serialized messages on a room channel, tagged with the sender's peer id
/// so nobody gets their own messages back.
pub type RoomMessage = (String, String);

/// Why a join was refused. The display text is sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("duplicate name")]
    DuplicateName,
    #[error("empty name")]
    EmptyName,
    #[error("empty room")]
    EmptyRoom,
}

/// Room state
struct Room {
    tx: broadcast::Sender<RoomMessage>,
    /// (peer id, nickname) in join order.
    peers: Vec<(String, String)>,
}

impl Room {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx, peers: Vec::new() }
    }

    fn names(&self) -> Vec<String> {
        self.peers.iter().map(|(_, name)| name.clone()).collect()
    }
}

/// Shared application state
#[derive(Default)]
pub struct AppState {
    rooms: DashMap<String, Room>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer to a room, creating the room on first join.
    ///
    /// Returns the room receiver and the nicknames now present.
    pub fn join_room(
        &self,
        room_id: &str,
        peer_id: &str,
        name: &str,
    ) -> Result<(broadcast::Receiver<RoomMessage>, Vec<String>), JoinError> {
        if room_id.trim().is_empty() {
            return Err(JoinError::EmptyRoom);
        }
        if name.trim().is_empty() {
            return Err(JoinError::EmptyName);
        }
        let mut room = self.rooms.entry(room_id.to_string()).or_insert_with(Room::new);
        if room.peers.iter().any(|(_, existing)| existing == name) {
            return Err(JoinError::DuplicateName);
        }
        room.peers.push((peer_id.to_string(), name.to_string()));
        Ok((room.tx.subscribe(), room.names()))
    }

    /// Remove a peer. Returns its nickname; empty rooms are dropped.
    pub fn leave_room(&self, room_id: &str, peer_id: &str) -> Option<String> {
        let name = self.remove_peer(room_id, peer_id)?;
        self.drop_if_empty(room_id);
        Some(name)
    }

    fn remove_peer(&self, room_id: &str, peer_id: &str) -> Option<String> {
        let mut room = self.rooms.get_mut(room_id)?;
        let index = room.peers.iter().position(|(id, _)| id == peer_id)?;
        let (_, name) = room.peers.remove(index);
        Some(name)
    }

    /// Emptiness is checked under the same lock as the removal, so a peer
    /// joining in between keeps the room alive.
    fn drop_if_empty(&self, room_id: &str) -> bool {
        self.rooms.remove_if(room_id, |_, room| room.peers.is_empty()).is_some()
    }

    /// Send a message to every subscriber of a room.
    pub fn broadcast(&self, room_id: &str, from: &str, msg: &ServerMessage) {
        match msg.to_json() {
            Ok(json) => self.relay(room_id, from, json),
            Err(e) => error!("Failed to serialize {:?}: {}", msg, e),
        }
    }

    /// Forward already-serialized text to a room unchanged.
    pub fn relay(&self, room_id: &str, from: &str, text: String) {
        if let Some(room) = self.rooms.get(room_id) {
            let _ = room.tx.send((from.to_string(), text));
        }
    }

    pub fn players(&self, room_id: &str) -> Vec<String> {
        self.rooms.get(room_id).map(|room| room.names()).unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_lists_players() {
        let state = AppState::new();
        let (_rx, players) = state.join_room("lobby", "p1", "ada").unwrap();
        assert_eq!(players, vec!["ada"]);
        let (_rx, players) = state.join_room("lobby", "p2", "bob").unwrap();
        assert_eq!(players, vec!["ada", "bob"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let state = AppState::new();
        let _first = state.join_room("lobby", "p1", "ada").unwrap();
        let err = state.join_room("lobby", "p2", "ada").unwrap_err();
        assert_eq!(err, JoinError::DuplicateName);
        assert_eq!(err.to_string(), "duplicate name");
        assert_eq!(state.players("lobby"), vec!["ada"]);
        // Same name in another room is fine.
        assert!(state.join_room("other", "p2", "ada").is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let state = AppState::new();
        assert_eq!(state.join_room("lobby", "p1", " ").unwrap_err(), JoinError::EmptyName);
        assert_eq!(state.join_room("", "p1", "ada").unwrap_err(), JoinError::EmptyRoom);
        assert_eq!(state.room_count(), 0);
    }

    #[test]
    fn test_leave_drops_empty_room() {
        let state = AppState::new();
        let _a = state.join_room("lobby", "p1", "ada").unwrap();
        let _b = state.join_room("lobby", "p2", "bob").unwrap();
        assert_eq!(state.leave_room("lobby", "p1").as_deref(), Some("ada"));
        assert_eq!(state.players("lobby"), vec!["bob"]);
        assert_eq!(state.leave_room("lobby", "p2").as_deref(), Some("bob"));
        assert_eq!(state.room_count(), 0);
        assert!(state.leave_room("lobby", "p2").is_none());
    }

    #[test]
    fn test_join_between_leave_and_cleanup_keeps_room() {
        let state = AppState::new();
        let _a = state.join_room("lobby", "p1", "ada").unwrap();
        assert_eq!(state.remove_peer("lobby", "p1").as_deref(), Some("ada"));
        // Another peer gets in before the empty room is cleaned up.
        let (mut rx, _) = state.join_room("lobby", "p2", "bob").unwrap();
        assert!(!state.drop_if_empty("lobby"));

        assert_eq!(state.players("lobby"), vec!["bob"]);
        assert_eq!(state.join_room("lobby", "p3", "bob").unwrap_err(), JoinError::DuplicateName);
        state.relay("lobby", "p4", "hello".to_string());
        assert_eq!(rx.try_recv().unwrap().1, "hello");
    }

    #[test]
    fn test_relay_is_verbatim() {
        let state = AppState::new();
        let (mut rx, _) = state.join_room("lobby", "p1", "ada").unwrap();
        let text = r##"{"type":"draw","prev":{"x":1,"y":2},"curr":{"x":3,"y":4},"color":"#000","size":2}"##;
        state.relay("lobby", "p2", text.to_string());
        let (from, received) = rx.try_recv().unwrap();
        assert_eq!(from, "p2");
        assert_eq!(received, text);
    }

    #[test]
    fn test_broadcast_serializes() {
        let state = AppState::new();
        let (mut rx, _) = state.join_room("lobby", "p1", "ada").unwrap();
        state.broadcast(
            "lobby",
            "p2",
            &ServerMessage::Leave {
                name: "bob".to_string(),
            },
        );
        let (_, received) = rx.try_recv().unwrap();
        assert_eq!(received, r#"{"type":"leave","name":"bob"}"#);
    }
}
