//! Request Handlers
//!
//! Thin JSON adapters over `GameManager`. The only work done here besides
//! translation is the classifier call, which runs outside the manager's lock.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::classifier::{strip_data_url_prefix, ClassificationResult, ClassifierError, DrawingClassifier};
use crate::errors::InklyError;
use crate::game::{Difficulty, GameManager};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Shared application state
pub struct AppState {
    pub manager: Arc<GameManager>,
    pub classifier: Arc<dyn DrawingClassifier>,
    /// Upper bound for one classification call
    pub classifier_timeout: Duration,
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// POST /api/player
pub async fn create_player_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePlayerRequest>,
) -> Result<Json<CreatePlayerResponse>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request(request_id.0, "Player name must not be empty".to_string()));
    }

    let player = state.manager.create_player(name);
    Ok(Json(CreatePlayerResponse {
        player_id: player.id,
        name: player.name,
        level: player.level,
        xp: player.xp,
    }))
}

/// GET /api/player/:id
pub async fn player_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerProfile>, ApiError> {
    let player = state
        .manager
        .get_player(&player_id)
        .ok_or_else(|| ApiError::from_game(request_id.0, InklyError::PlayerNotFound(player_id)))?;

    Ok(Json(PlayerProfile::from(&player)))
}

/// POST /api/session/start
pub async fn start_session_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let hint = Difficulty::parse_or_medium(&body.difficulty);
    let session = state
        .manager
        .start_session(&body.player_id, hint, body.surprise_mode)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;

    Ok(Json(StartSessionResponse {
        session_id: session.session_id,
        prompt: session.prompt,
    }))
}

/// POST /api/session/complete
pub async fn complete_session_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompleteSessionRequest>,
) -> Result<Json<CompleteSessionResponse>, ApiError> {
    if !body.time_spent.is_finite() || body.time_spent < 0.0 {
        return Err(ApiError::bad_request(
            request_id.0,
            format!("time_spent must be a non-negative number, got {}", body.time_spent),
        ));
    }

    // Check before paying for a classification; the manager re-checks under its lock
    let session = state
        .manager
        .get_session(&body.session_id)
        .ok_or_else(|| ApiError::from_game(request_id.0.clone(), InklyError::SessionNotFound(body.session_id.clone())))?;
    if session.is_completed() {
        return Err(ApiError::from_game(
            request_id.0,
            InklyError::SessionAlreadyCompleted(body.session_id),
        ));
    }

    let classification = classify_with_timeout(&state, &body.drawing_data, &session.prompt.text).await;
    debug!(
        session_id = %body.session_id,
        correct = classification.correct,
        confidence = classification.confidence,
        reaction = %classification.reaction,
        "Drawing classified"
    );

    let result = state
        .manager
        .complete_session(&body.session_id, &body.drawing_data, &classification, body.time_spent)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;

    Ok(Json(CompleteSessionResponse {
        correct: classification.correct,
        guesses: classification.guesses,
        confidence: classification.confidence,
        feedback: classification.feedback,
        reaction: classification.reaction,
        score: result.score,
        xp_gained: result.xp_gained,
        breakdown: result.breakdown,
        achievements: result.achievements,
        level_up: result.level_up,
        new_level: result.new_level,
        player_stats: PlayerProfile::from(&result.player),
    }))
}

async fn classify_with_timeout(state: &AppState, drawing_data: &str, target: &str) -> ClassificationResult {
    let image = strip_data_url_prefix(drawing_data);

    match tokio::time::timeout(state.classifier_timeout, state.classifier.classify(image, target)).await {
        Ok(result) => result,
        Err(_) => {
            let millis = state.classifier_timeout.as_millis();
            warn!(timeout_ms = %millis, "Classifier timed out, using fallback result");
            ClassificationResult::unavailable(ClassifierError::Timeout(millis))
        }
    }
}

/// GET /api/leaderboard?limit={n}
pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Json<LeaderboardResponse> {
    let config = state.manager.config();
    let limit = params
        .limit
        .unwrap_or(config.default_leaderboard_limit)
        .min(config.max_leaderboard_limit);

    Json(LeaderboardResponse {
        leaderboard: state.manager.leaderboard(limit),
    })
}

/// POST /api/room
pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateRoomRequest>,
) -> Json<CreateRoomResponse> {
    Json(CreateRoomResponse {
        room_id: state.manager.create_room(&body.player_id),
    })
}

/// POST /api/room/join
pub async fn join_room_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JoinRoomRequest>,
) -> Json<JoinRoomResponse> {
    Json(JoinRoomResponse {
        joined: state.manager.join_room(&body.room_id, &body.player_id),
    })
}

/// GET /api/room/:id
pub async fn room_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room = state
        .manager
        .get_room(&room_id)
        .ok_or_else(|| ApiError::from_game(request_id.0, InklyError::RoomNotFound(room_id.clone())))?;

    let players = state
        .manager
        .room_players(&room_id)
        .into_iter()
        .map(|p| RoomMember {
            player_id: p.id,
            name: p.name,
            level: p.level,
        })
        .collect();

    Ok(Json(RoomResponse {
        room_id: room.room_id,
        owner_id: room.owner_id,
        players,
    }))
}
