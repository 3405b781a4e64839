use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// XP needed to leave a level is `level * XP_PER_LEVEL`
pub const XP_PER_LEVEL: u32 = 100;

/// Prompt difficulty tiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Seconds the player gets for a regular prompt of this tier
    pub fn time_limit(self) -> u32 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => 25,
            Difficulty::Hard => 30,
        }
    }

    /// Lenient parse used by the HTTP layer; unknown values fall back to medium
    pub fn parse_or_medium(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Cosmetic brushes; everything but `Normal` is unlocked by level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BrushType {
    Normal,
    Neon,
    Spray,
    Marker,
    Sparkle,
}

/// Achievement identifiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstDraw,
    SpeedDemon,
    Perfectionist,
    #[serde(rename = "level_10")]
    Level10,
    AbstractMaster,
}

impl AchievementId {
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstDraw => "first_draw",
            AchievementId::SpeedDemon => "speed_demon",
            AchievementId::Perfectionist => "perfectionist",
            AchievementId::Level10 => "level_10",
            AchievementId::AbstractMaster => "abstract_master",
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A drawing challenge. Immutable once generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub difficulty: Difficulty,
    pub time_limit: u32,
}

impl Prompt {
    pub fn new(text: impl Into<String>, difficulty: Difficulty, time_limit: u32) -> Self {
        Self {
            text: text.into(),
            difficulty,
            time_limit,
        }
    }
}

/// Player profile and progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    /// Consecutive correct guesses
    pub streak: u32,
    pub total_drawings: u32,
    pub correct_guesses: u32,
    pub brushes_unlocked: Vec<BrushType>,
    pub achievements: Vec<AchievementId>,
    pub created_at: DateTime<Utc>,
    pub last_played: Option<DateTime<Utc>>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            level: 1,
            xp: 0,
            streak: 0,
            total_drawings: 0,
            correct_guesses: 0,
            brushes_unlocked: vec![BrushType::Normal],
            achievements: Vec::new(),
            created_at: now,
            last_played: Some(now),
        }
    }

    /// XP needed to reach the next level
    pub fn xp_to_next_level(&self) -> u32 {
        self.level * XP_PER_LEVEL
    }

    /// Add XP and level up at most once. Returns true on level up.
    ///
    /// A grant larger than the remaining threshold carries the surplus into
    /// the new level without checking it again.
    pub fn add_xp(&mut self, points: u32) -> bool {
        self.xp = self.xp.saturating_add(points);
        let needed = self.xp_to_next_level();

        if self.xp >= needed {
            self.level += 1;
            self.xp -= needed;
            true
        } else {
            false
        }
    }

    pub fn unlock_brush(&mut self, brush: BrushType) {
        if !self.brushes_unlocked.contains(&brush) {
            self.brushes_unlocked.push(brush);
        }
    }

    pub fn add_achievement(&mut self, achievement: AchievementId) {
        if !self.has_achievement(achievement) {
            self.achievements.push(achievement);
        }
    }

    pub fn has_achievement(&self, achievement: AchievementId) -> bool {
        self.achievements.contains(&achievement)
    }

    /// Times the classifier failed to recognise the drawing
    pub fn misses(&self) -> u32 {
        self.total_drawings.saturating_sub(self.correct_guesses)
    }

    /// Percentage of correct guesses rounded to one decimal, 0 without drawings
    pub fn accuracy(&self) -> f64 {
        if self.total_drawings == 0 {
            return 0.0;
        }
        let pct = self.correct_guesses as f64 / self.total_drawings as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// Outcome recorded when a session is completed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCompletion {
    pub drawing_data: String,
    pub ai_guesses: Vec<String>,
    pub correct: bool,
    pub time_spent: f64,
    pub score: u32,
    pub completed_at: DateTime<Utc>,
}

/// One attempt at drawing one prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingSession {
    pub session_id: String,
    pub player_id: String,
    pub prompt: Prompt,
    pub started_at: DateTime<Utc>,
    /// `None` until the session is completed; set exactly once
    pub completion: Option<SessionCompletion>,
}

impl DrawingSession {
    pub fn new(session_id: impl Into<String>, player_id: impl Into<String>, prompt: Prompt) -> Self {
        Self {
            session_id: session_id.into(),
            player_id: player_id.into(),
            prompt,
            started_at: Utc::now(),
            completion: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_some()
    }

    pub fn score(&self) -> u32 {
        self.completion.as_ref().map_or(0, |c| c.score)
    }

    pub fn correct(&self) -> bool {
        self.completion.as_ref().is_some_and(|c| c.correct)
    }

    pub fn time_spent(&self) -> Option<f64> {
        self.completion.as_ref().map(|c| c.time_spent)
    }

    pub fn ai_guesses(&self) -> &[String] {
        self.completion
            .as_ref()
            .map(|c| c.ai_guesses.as_slice())
            .unwrap_or(&[])
    }
}

/// Multiplayer room: an ordered, duplicate-free list of player ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub owner_id: String,
    pub player_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(room_id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        Self {
            room_id: room_id.into(),
            player_ids: vec![owner_id.clone()],
            owner_id,
            created_at: Utc::now(),
        }
    }

    /// Returns false if the player was already a member
    pub fn add_player(&mut self, player_id: &str) -> bool {
        if self.player_ids.iter().any(|id| id == player_id) {
            return false;
        }
        self.player_ids.push(player_id.to_string());
        true
    }
}

/// Points earned by one completion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub time_bonus: u32,
    pub confidence_bonus: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.base + self.time_bonus + self.confidence_bonus
    }
}

/// Achievement unlocked during a completion, with its catalogue entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnlockedAchievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub xp: u32,
}

/// Everything `complete_session` changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    pub session: DrawingSession,
    /// Player snapshot after all rewards were applied
    pub player: Player,
    pub score: u32,
    /// XP from the score itself; achievement bonuses are listed separately
    pub xp_gained: u32,
    pub breakdown: ScoreBreakdown,
    pub achievements: Vec<UnlockedAchievement>,
    /// Level up caused by the score grant
    pub level_up: bool,
    pub new_level: Option<u32>,
}

/// One row of the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: String,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub total_drawings: u32,
    pub correct_guesses: u32,
    pub accuracy: f64,
    pub streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_defaults() {
        let player = Player::new("p1", "Ana");
        assert_eq!(player.level, 1);
        assert_eq!(player.xp, 0);
        assert_eq!(player.brushes_unlocked, vec![BrushType::Normal]);
        assert!(player.achievements.is_empty());
        assert!(player.last_played.is_some());
    }

    #[test]
    fn test_add_zero_xp_never_levels() {
        let mut player = Player::new("p1", "Ana");
        for _ in 0..20 {
            assert!(!player.add_xp(0));
        }
        assert_eq!(player.level, 1);
        assert_eq!(player.xp, 0);
    }

    #[test]
    fn test_add_exact_threshold_levels_once() {
        for level in 1..15 {
            let mut player = Player::new("p", "P");
            player.level = level;
            assert!(player.add_xp(level * XP_PER_LEVEL));
            assert_eq!(player.level, level + 1);
            assert_eq!(player.xp, 0);
            assert!(player.xp < player.level * XP_PER_LEVEL);
        }
    }

    #[test]
    fn test_large_grant_does_not_cascade() {
        let mut player = Player::new("p", "P");
        assert!(player.add_xp(450));
        // 450 - 100 leaves 350, already past level 2's threshold of 200
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 350);
    }

    #[test]
    fn test_unlocks_are_idempotent() {
        let mut player = Player::new("p", "P");
        player.unlock_brush(BrushType::Neon);
        player.unlock_brush(BrushType::Neon);
        player.unlock_brush(BrushType::Normal);
        assert_eq!(player.brushes_unlocked, vec![BrushType::Normal, BrushType::Neon]);

        player.add_achievement(AchievementId::FirstDraw);
        player.add_achievement(AchievementId::FirstDraw);
        assert_eq!(player.achievements, vec![AchievementId::FirstDraw]);
    }

    #[test]
    fn test_accuracy_bounds() {
        let mut player = Player::new("p", "P");
        assert_eq!(player.accuracy(), 0.0);

        player.total_drawings = 3;
        player.correct_guesses = 2;
        assert_eq!(player.accuracy(), 66.7);

        player.correct_guesses = 3;
        assert_eq!(player.accuracy(), 100.0);
    }

    #[test]
    fn test_session_defaults_until_completed() {
        let session = DrawingSession::new("s", "p", Prompt::new("gato", Difficulty::Easy, 20));
        assert!(!session.is_completed());
        assert_eq!(session.score(), 0);
        assert!(!session.correct());
        assert!(session.time_spent().is_none());
        assert!(session.ai_guesses().is_empty());
    }

    #[test]
    fn test_room_membership_is_ordered_and_unique() {
        let mut room = Room::new("r1", "owner");
        assert!(room.add_player("a"));
        assert!(!room.add_player("owner"));
        assert!(room.add_player("b"));
        assert!(!room.add_player("a"));
        assert_eq!(room.player_ids, vec!["owner", "a", "b"]);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AchievementId::Level10).unwrap(), "\"level_10\"");
        assert_eq!(serde_json::to_string(&AchievementId::SpeedDemon).unwrap(), "\"speed_demon\"");
        assert_eq!(serde_json::to_string(&BrushType::Sparkle).unwrap(), "\"sparkle\"");
        assert_eq!(Difficulty::parse_or_medium("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::parse_or_medium("weird"), Difficulty::Medium);
    }
}
