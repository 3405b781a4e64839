//! Player and session lifecycle, rewards, rooms and the leaderboard
//!
//! All read-modify-write operations run under one mutation lock so two
//! completions can never interleave their score/xp/streak updates. Reads go
//! straight to the store.

use crate::classifier::ClassificationResult;
use crate::config::GameConfig;
use crate::errors::{InklyError, InklyResult};
use crate::game::achievements::AchievementSystem;
use crate::game::prompts::PromptGenerator;
use crate::game::scoring::{score_breakdown, unlock_brushes};
use crate::game::store::{GameStore, InMemoryStore};
use crate::game::types::{
    CompletionResult, Difficulty, DrawingSession, LeaderboardEntry, Player, Room, SessionCompletion,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

const ROOM_ID_LEN: usize = 8;

/// Owns every player, session and room for the lifetime of the process
pub struct GameManager {
    store: Arc<dyn GameStore>,
    config: GameConfig,
    prompts: PromptGenerator,
    rng: Mutex<StdRng>,
    mutation_lock: Mutex<()>,
}

impl GameManager {
    pub fn new(store: Arc<dyn GameStore>, config: GameConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            prompts: PromptGenerator::new(config.surprise_chance),
            config,
            rng: Mutex::new(rng),
            mutation_lock: Mutex::new(()),
        }
    }

    /// Manager over a fresh in-memory store
    pub fn in_memory(config: GameConfig) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), config)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// Create a level 1 player with only the default brush
    pub fn create_player(&self, name: &str) -> Player {
        let player = Player::new(Uuid::new_v4().to_string(), name);
        self.store.put_player(player.clone());
        info!(player_id = %player.id, name = %player.name, "Player created");
        player
    }

    pub fn get_player(&self, player_id: &str) -> Option<Player> {
        self.store.get_player(player_id)
    }

    pub fn get_session(&self, session_id: &str) -> Option<DrawingSession> {
        self.store.get_session(session_id)
    }

    /// Start a drawing session. The player's level decides the difficulty;
    /// `difficulty_hint` is accepted for API compatibility but overridden.
    ///
    /// Unknown players are rejected unless `auto_provision_players` is set,
    /// in which case a placeholder player is created under the given id.
    pub fn start_session(
        &self,
        player_id: &str,
        difficulty_hint: Difficulty,
        surprise: bool,
    ) -> InklyResult<DrawingSession> {
        let _guard = lock(&self.mutation_lock);

        let player = match self.store.get_player(player_id) {
            Some(player) => player,
            None if self.config.auto_provision_players => {
                let player = Player::new(player_id, format!("Player_{}", player_id));
                self.store.put_player(player.clone());
                info!(player_id, "Auto-provisioned placeholder player");
                player
            }
            None => return Err(InklyError::PlayerNotFound(player_id.to_string())),
        };

        let prompt = {
            let mut rng = lock(&self.rng);
            let difficulty = difficulty_for_level(&mut *rng, player.level);
            self.prompts.generate(&mut *rng, difficulty, surprise)
        };

        let session = DrawingSession::new(Uuid::new_v4().to_string(), player.id.clone(), prompt);
        self.store.put_session(session.clone());

        info!(
            session_id = %session.session_id,
            player_id = %player.id,
            level = player.level,
            hint = %difficulty_hint,
            difficulty = %session.prompt.difficulty,
            prompt = %session.prompt.text,
            "Session started"
        );

        Ok(session)
    }

    /// Record the classification outcome for a session and apply all
    /// rewards: score, counters, streak, xp, brushes and achievements.
    pub fn complete_session(
        &self,
        session_id: &str,
        drawing_data: &str,
        classification: &ClassificationResult,
        time_spent: f64,
    ) -> InklyResult<CompletionResult> {
        if !time_spent.is_finite() || time_spent < 0.0 {
            return Err(InklyError::InvalidInput(format!(
                "time_spent must be a non-negative number of seconds, got {}",
                time_spent
            )));
        }

        let _guard = lock(&self.mutation_lock);

        let mut session = self
            .store
            .get_session(session_id)
            .ok_or_else(|| InklyError::SessionNotFound(session_id.to_string()))?;
        if session.is_completed() {
            return Err(InklyError::SessionAlreadyCompleted(session_id.to_string()));
        }
        let mut player = self
            .store
            .get_player(&session.player_id)
            .ok_or_else(|| InklyError::PlayerNotFound(session.player_id.clone()))?;

        let correct = classification.correct;
        let breakdown = score_breakdown(
            correct,
            classification.confidence,
            session.prompt.time_limit,
            time_spent,
        );
        let score = breakdown.total();
        let now = Utc::now();

        session.completion = Some(SessionCompletion {
            drawing_data: drawing_data.to_string(),
            ai_guesses: classification.guesses.clone(),
            correct,
            time_spent,
            score,
            completed_at: now,
        });

        player.total_drawings += 1;
        player.last_played = Some(now);
        if correct {
            player.correct_guesses += 1;
            player.streak += 1;
        } else {
            player.streak = 0;
        }

        let level_up = player.add_xp(score);

        let new_brushes = unlock_brushes(&mut player);
        if !new_brushes.is_empty() {
            debug!(player_id = %player.id, brushes = ?new_brushes, "Brushes unlocked");
        }

        // All rules see the same state; bonuses are granted afterwards
        let fired = AchievementSystem::check_achievements(&mut player, &session);
        let achievements: Vec<_> = fired
            .into_iter()
            .map(|id| {
                let def = AchievementSystem::definition(id);
                let bonus_level_up = player.add_xp(def.xp);
                debug!(player_id = %player.id, achievement = %id, xp = def.xp, bonus_level_up, "Achievement unlocked");
                def.to_unlocked()
            })
            .collect();

        self.store.put_session(session.clone());
        self.store.put_player(player.clone());

        info!(
            session_id,
            player_id = %player.id,
            correct,
            score,
            level = player.level,
            xp = player.xp,
            streak = player.streak,
            achievements = achievements.len(),
            "Session completed"
        );

        Ok(CompletionResult {
            session,
            new_level: level_up.then_some(player.level),
            player,
            score,
            xp_gained: score,
            breakdown,
            achievements,
            level_up,
        })
    }

    /// Create a room with the owner as its first member
    pub fn create_room(&self, owner_id: &str) -> String {
        let _guard = lock(&self.mutation_lock);

        let room_id = loop {
            let candidate: String = Uuid::new_v4().simple().to_string()[..ROOM_ID_LEN].to_string();
            if self.store.get_room(&candidate).is_none() {
                break candidate;
            }
        };

        self.store.put_room(Room::new(room_id.clone(), owner_id));
        info!(room_id = %room_id, owner_id, "Room created");
        room_id
    }

    /// Join a room. False if the room does not exist; joining twice is a no-op.
    pub fn join_room(&self, room_id: &str, player_id: &str) -> bool {
        let _guard = lock(&self.mutation_lock);

        let Some(mut room) = self.store.get_room(room_id) else {
            debug!(room_id, player_id, "Join requested for unknown room");
            return false;
        };

        if room.add_player(player_id) {
            self.store.put_room(room);
            info!(room_id, player_id, "Player joined room");
        }
        true
    }

    pub fn get_room(&self, room_id: &str) -> Option<Room> {
        self.store.get_room(room_id)
    }

    /// Members of a room in join order. Ids that no longer resolve to a
    /// player are skipped; an unknown room yields an empty list.
    pub fn room_players(&self, room_id: &str) -> Vec<Player> {
        self.store
            .get_room(room_id)
            .map(|room| {
                room.player_ids
                    .iter()
                    .filter_map(|id| self.store.get_player(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Top players by level, then correct guesses. Equal players keep their
    /// creation order.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut players = self.store.list_players();
        // Stable sort keeps insertion order for ties
        players.sort_by(|a, b| (b.level, b.correct_guesses).cmp(&(a.level, a.correct_guesses)));

        players
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                accuracy: p.accuracy(),
                player_id: p.id,
                name: p.name,
                level: p.level,
                xp: p.xp,
                total_drawings: p.total_drawings,
                correct_guesses: p.correct_guesses,
                streak: p.streak,
            })
            .collect()
    }
}

/// Beginners (< 3) get easy prompts, intermediates (3..=6) medium, and
/// everyone from level 7 a coin flip between medium and hard.
pub fn difficulty_for_level<R: Rng + ?Sized>(rng: &mut R, level: u32) -> Difficulty {
    match level {
        0..=2 => Difficulty::Easy,
        3..=6 => Difficulty::Medium,
        _ => {
            if rng.gen_bool(0.5) {
                Difficulty::Medium
            } else {
                Difficulty::Hard
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Reaction;
    use crate::game::prompts::{EASY_PROMPTS, SURPRISE_PROMPTS};
    use crate::game::types::{AchievementId, BrushType};

    fn seeded(seed: u64) -> GameManager {
        GameManager::in_memory(GameConfig {
            rng_seed: Some(seed),
            ..Default::default()
        })
    }

    fn classification(correct: bool, confidence: u8) -> ClassificationResult {
        ClassificationResult {
            guesses: vec!["gato".to_string()],
            confidence,
            feedback: String::new(),
            reaction: Reaction::Thinking,
            correct,
        }
    }

    #[test]
    fn test_create_player_defaults() {
        let manager = seeded(1);
        let player = manager.create_player("Ana");
        let stored = manager.get_player(&player.id).unwrap();

        assert_eq!(stored.name, "Ana");
        assert_eq!(stored.level, 1);
        assert_eq!(stored.xp, 0);
        assert_eq!(stored.brushes_unlocked, vec![BrushType::Normal]);
        assert!(stored.achievements.is_empty());
    }

    #[test]
    fn test_start_session_unknown_player() {
        let manager = seeded(1);
        let err = manager.start_session("ghost", Difficulty::Easy, false).unwrap_err();
        assert!(matches!(err, InklyError::PlayerNotFound(_)));
        assert_eq!(manager.store().session_count(), 0);
    }

    #[test]
    fn test_start_session_auto_provision() {
        let manager = GameManager::in_memory(GameConfig {
            auto_provision_players: true,
            rng_seed: Some(3),
            ..Default::default()
        });

        let session = manager.start_session("guest-7", Difficulty::Medium, false).unwrap();
        assert_eq!(session.player_id, "guest-7");

        let player = manager.get_player("guest-7").unwrap();
        assert_eq!(player.name, "Player_guest-7");
        assert_eq!(player.level, 1);
    }

    #[test]
    fn test_unvalidated_nan_surprise_chance() {
        let manager = GameManager::in_memory(GameConfig {
            surprise_chance: f64::NAN,
            rng_seed: Some(8),
            ..Default::default()
        });
        let player = manager.create_player("Ana");

        for _ in 0..10 {
            assert!(manager.start_session(&player.id, Difficulty::Easy, true).is_ok());
        }
    }

    #[test]
    fn test_beginner_never_gets_hard_prompt() {
        let manager = seeded(11);
        let player = manager.create_player("Ana");

        for _ in 0..100 {
            let session = manager.start_session(&player.id, Difficulty::Hard, true).unwrap();
            let text = session.prompt.text.as_str();
            assert_ne!(session.prompt.difficulty, Difficulty::Hard);
            assert!(EASY_PROMPTS.contains(&text) || SURPRISE_PROMPTS.contains(&text));
        }
    }

    #[test]
    fn test_difficulty_for_level() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(difficulty_for_level(&mut rng, 1), Difficulty::Easy);
        assert_eq!(difficulty_for_level(&mut rng, 2), Difficulty::Easy);
        assert_eq!(difficulty_for_level(&mut rng, 3), Difficulty::Medium);
        assert_eq!(difficulty_for_level(&mut rng, 6), Difficulty::Medium);

        let advanced: Vec<_> = (0..64).map(|_| difficulty_for_level(&mut rng, 7)).collect();
        assert!(advanced.contains(&Difficulty::Medium));
        assert!(advanced.contains(&Difficulty::Hard));
        assert!(!advanced.contains(&Difficulty::Easy));
    }

    #[test]
    fn test_same_seed_same_prompts() {
        let a = seeded(42);
        let b = seeded(42);
        let pa = a.create_player("A");
        let pb = b.create_player("B");

        for _ in 0..20 {
            let sa = a.start_session(&pa.id, Difficulty::Medium, true).unwrap();
            let sb = b.start_session(&pb.id, Difficulty::Medium, true).unwrap();
            assert_eq!(sa.prompt, sb.prompt);
        }
    }

    #[test]
    fn test_first_fast_correct_completion() {
        let manager = seeded(1);
        let player = manager.create_player("Ana");
        let mut session = manager.start_session(&player.id, Difficulty::Easy, false).unwrap();

        // Pin the time limit so the arithmetic is exact
        session.prompt.time_limit = 20;
        manager.store().put_session(session.clone());

        let result = manager
            .complete_session(&session.session_id, "data", &classification(true, 80), 3.0)
            .unwrap();

        assert_eq!(result.breakdown.base, 100);
        assert_eq!(result.breakdown.time_bonus, 85);
        assert_eq!(result.breakdown.confidence_bonus, 40);
        assert_eq!(result.score, 225);
        assert_eq!(result.xp_gained, 225);

        let ids: Vec<_> = result.achievements.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![AchievementId::FirstDraw, AchievementId::SpeedDemon]);

        // 225 -> level 2 with 125; +50 -> 175; +100 -> level 3 with 75
        assert!(result.level_up);
        assert_eq!(result.player.level, 3);
        assert_eq!(result.player.xp, 75);
        assert_eq!(result.new_level, Some(3));
        assert_eq!(result.player.streak, 1);
        assert_eq!(result.player.total_drawings, 1);
        assert_eq!(result.player.correct_guesses, 1);

        let stored = manager.get_session(&session.session_id).unwrap();
        assert_eq!(stored.score(), 225);
        assert!(stored.correct());
        assert_eq!(stored.ai_guesses(), ["gato".to_string()]);
    }

    #[test]
    fn test_incorrect_completion_resets_streak() {
        let manager = seeded(2);
        let player = manager.create_player("Ana");

        for _ in 0..3 {
            let session = manager.start_session(&player.id, Difficulty::Easy, false).unwrap();
            manager
                .complete_session(&session.session_id, "d", &classification(true, 10), 30.0)
                .unwrap();
        }
        assert_eq!(manager.get_player(&player.id).unwrap().streak, 3);

        let session = manager.start_session(&player.id, Difficulty::Easy, false).unwrap();
        let result = manager
            .complete_session(&session.session_id, "d", &classification(false, 10), 30.0)
            .unwrap();

        assert_eq!(result.player.streak, 0);
        assert_eq!(result.breakdown.base, 20);
        assert_eq!(result.breakdown.time_bonus, 0);
        assert_eq!(result.player.total_drawings, 4);
        assert_eq!(result.player.correct_guesses, 3);
    }

    #[test]
    fn test_completion_is_one_way() {
        let manager = seeded(1);
        let player = manager.create_player("Ana");
        let session = manager.start_session(&player.id, Difficulty::Easy, false).unwrap();

        manager
            .complete_session(&session.session_id, "d", &classification(true, 50), 10.0)
            .unwrap();
        let err = manager
            .complete_session(&session.session_id, "d", &classification(true, 100), 1.0)
            .unwrap_err();

        assert!(matches!(err, InklyError::SessionAlreadyCompleted(_)));
        assert_eq!(manager.get_player(&player.id).unwrap().total_drawings, 1);
    }

    #[test]
    fn test_complete_unknown_session_and_bad_time() {
        let manager = seeded(1);
        let err = manager
            .complete_session("nope", "d", &classification(true, 50), 1.0)
            .unwrap_err();
        assert!(matches!(err, InklyError::SessionNotFound(_)));

        let player = manager.create_player("Ana");
        let session = manager.start_session(&player.id, Difficulty::Easy, false).unwrap();
        let err = manager
            .complete_session(&session.session_id, "d", &classification(true, 50), -1.0)
            .unwrap_err();
        assert!(matches!(err, InklyError::InvalidInput(_)));
        assert!(!manager.get_session(&session.session_id).unwrap().is_completed());
    }

    #[test]
    fn test_abstract_master_after_five_misses() {
        let manager = seeded(9);
        let player = manager.create_player("Ana");

        let mut unlocked = Vec::new();
        for _ in 0..6 {
            let session = manager.start_session(&player.id, Difficulty::Easy, false).unwrap();
            let result = manager
                .complete_session(&session.session_id, "d", &classification(false, 0), 60.0)
                .unwrap();
            unlocked.extend(result.achievements.into_iter().map(|a| a.id));
        }

        assert_eq!(unlocked, vec![AchievementId::FirstDraw, AchievementId::AbstractMaster]);
        let player = manager.get_player(&player.id).unwrap();
        assert_eq!(player.achievements, unlocked);
    }

    #[test]
    fn test_brushes_follow_level() {
        let manager = seeded(4);
        let player = manager.create_player("Ana");
        let mut stored = manager.get_player(&player.id).unwrap();
        stored.level = 6;
        stored.total_drawings = 10;
        stored.correct_guesses = 10;
        manager.store().put_player(stored);

        let session = manager.start_session(&player.id, Difficulty::Easy, false).unwrap();
        let result = manager
            .complete_session(&session.session_id, "d", &classification(true, 0), 100.0)
            .unwrap();

        assert_eq!(
            result.player.brushes_unlocked,
            vec![BrushType::Normal, BrushType::Neon, BrushType::Spray]
        );
    }

    #[test]
    fn test_rooms() {
        let manager = seeded(1);
        let owner = manager.create_player("Owner");
        let guest = manager.create_player("Guest");

        let room_id = manager.create_room(&owner.id);
        assert_eq!(room_id.len(), ROOM_ID_LEN);

        assert!(manager.join_room(&room_id, &guest.id));
        assert!(manager.join_room(&room_id, &guest.id));
        assert!(manager.join_room(&room_id, "vanished"));
        assert!(!manager.join_room("missing", &guest.id));

        let names: Vec<_> = manager.room_players(&room_id).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Owner", "Guest"]);
        assert_eq!(manager.get_room(&room_id).unwrap().player_ids.len(), 3);
        assert!(manager.room_players("missing").is_empty());
    }

    #[test]
    fn test_leaderboard_order_and_ties() {
        let manager = seeded(1);
        let names = ["first", "second", "third", "fourth"];
        let stats = [(2, 5, 10), (3, 1, 4), (2, 5, 6), (2, 7, 7)];

        for (name, (level, correct, total)) in names.iter().zip(stats) {
            let player = manager.create_player(name);
            let mut stored = manager.get_player(&player.id).unwrap();
            stored.level = level;
            stored.correct_guesses = correct;
            stored.total_drawings = total;
            manager.store().put_player(stored);
        }
        manager.create_player("newbie");

        let board = manager.leaderboard(10);
        let order: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["second", "fourth", "first", "third", "newbie"]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(board[0].accuracy, 25.0);
        assert_eq!(board[2].accuracy, 50.0);
        assert_eq!(board[4].accuracy, 0.0);

        assert_eq!(manager.leaderboard(2).len(), 2);
        assert!(manager.leaderboard(0).is_empty());
    }
}
