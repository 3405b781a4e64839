//! API Request and Response Models

use crate::classifier::Reaction;
use crate::game::{
    AchievementId, BrushType, LeaderboardEntry, Player, Prompt, ScoreBreakdown, UnlockedAchievement,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerResponse {
    pub player_id: String,
    pub name: String,
    pub level: u32,
    pub xp: u32,
}

/// Full player profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: String,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub streak: u32,
    pub total_drawings: u32,
    pub correct_guesses: u32,
    pub accuracy: f64,
    pub brushes_unlocked: Vec<BrushType>,
    pub achievements: Vec<AchievementId>,
    pub created_at: DateTime<Utc>,
    pub last_played: Option<DateTime<Utc>>,
}

impl From<&Player> for PlayerProfile {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id.clone(),
            name: player.name.clone(),
            level: player.level,
            xp: player.xp,
            xp_to_next_level: player.xp_to_next_level(),
            streak: player.streak,
            total_drawings: player.total_drawings,
            correct_guesses: player.correct_guesses,
            accuracy: player.accuracy(),
            brushes_unlocked: player.brushes_unlocked.clone(),
            achievements: player.achievements.clone(),
            created_at: player.created_at,
            last_played: player.last_played,
        }
    }
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_surprise() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub player_id: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_surprise")]
    pub surprise_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub prompt: Prompt,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteSessionRequest {
    pub session_id: String,
    pub drawing_data: String,
    pub time_spent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteSessionResponse {
    pub correct: bool,
    pub guesses: Vec<String>,
    pub confidence: u8,
    pub feedback: String,
    pub reaction: Reaction,
    pub score: u32,
    pub xp_gained: u32,
    pub breakdown: ScoreBreakdown,
    pub achievements: Vec<UnlockedAchievement>,
    pub level_up: bool,
    pub new_level: Option<u32>,
    pub player_stats: PlayerProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub joined: bool,
}

/// Room member as shown to other players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMember {
    pub player_id: String,
    pub name: String,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub room_id: String,
    pub owner_id: String,
    pub players: Vec<RoomMember>,
}
