//! HTTP API
//!
//! JSON endpoints for players, drawing sessions, the leaderboard and rooms.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::{build_app, ApiServer};
