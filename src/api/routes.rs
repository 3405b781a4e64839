//! Route Definitions

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Players
        .route("/api/player", post(create_player_handler))
        .route("/api/player/:id", get(player_handler))
        // Drawing sessions
        .route("/api/session/start", post(start_session_handler))
        .route("/api/session/complete", post(complete_session_handler))
        .route("/api/leaderboard", get(leaderboard_handler))
        // Rooms
        .route("/api/room", post(create_room_handler))
        .route("/api/room/join", post(join_room_handler))
        .route("/api/room/:id", get(room_handler))
        .with_state(state)
}
