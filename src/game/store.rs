//! Record storage for players, sessions and rooms
//!
//! The game manager only talks to `GameStore`, so a persistent backend can
//! replace the in-memory one without touching the reward logic.

use crate::game::types::{DrawingSession, Player, Room};
use dashmap::DashMap;
use std::sync::RwLock;

/// Storage interface for game records. Records are returned by value;
/// callers write changes back with the matching `put_*`.
pub trait GameStore: Send + Sync {
    fn get_player(&self, player_id: &str) -> Option<Player>;

    /// Insert or replace a player
    fn put_player(&self, player: Player);

    /// All players in the order they were first stored
    fn list_players(&self) -> Vec<Player>;

    fn player_count(&self) -> usize;

    fn get_session(&self, session_id: &str) -> Option<DrawingSession>;

    fn put_session(&self, session: DrawingSession);

    fn session_count(&self) -> usize;

    fn get_room(&self, room_id: &str) -> Option<Room>;

    fn put_room(&self, room: Room);

    fn room_count(&self) -> usize;
}

/// Process-lifetime store; nothing is ever deleted
#[derive(Default)]
pub struct InMemoryStore {
    players: DashMap<String, Player>,
    /// Player ids in first-insert order
    player_order: RwLock<Vec<String>>,
    sessions: DashMap<String, DrawingSession>,
    rooms: DashMap<String, Room>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryStore {
    fn get_player(&self, player_id: &str) -> Option<Player> {
        self.players.get(player_id).map(|p| p.value().clone())
    }

    fn put_player(&self, player: Player) {
        let id = player.id.clone();
        if self.players.insert(id.clone(), player).is_none() {
            // Only the first insert for an id reaches here
            let mut order = self.player_order.write().unwrap_or_else(|e| e.into_inner());
            order.push(id);
        }
    }

    fn list_players(&self) -> Vec<Player> {
        let order = self.player_order.read().unwrap_or_else(|e| e.into_inner());
        order.iter().filter_map(|id| self.get_player(id)).collect()
    }

    fn player_count(&self) -> usize {
        self.players.len()
    }

    fn get_session(&self, session_id: &str) -> Option<DrawingSession> {
        self.sessions.get(session_id).map(|s| s.value().clone())
    }

    fn put_session(&self, session: DrawingSession) {
        self.sessions.insert(session.session_id.clone(), session);
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn get_room(&self, room_id: &str) -> Option<Room> {
        self.rooms.get(room_id).map(|r| r.value().clone())
    }

    fn put_room(&self, room: Room) {
        self.rooms.insert(room.room_id.clone(), room);
    }

    fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
