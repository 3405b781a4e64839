//! Achievement catalogue and unlock rules
//!
//! Rules are evaluated once per completed session, after the player's
//! counters for that session were updated. An achievement fires at most once
//! per player.

use crate::game::types::{AchievementId, DrawingSession, Player, UnlockedAchievement};

/// Static description of an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub xp: u32,
}

impl AchievementDef {
    pub fn to_unlocked(self) -> UnlockedAchievement {
        UnlockedAchievement {
            id: self.id,
            name: self.name.to_string(),
            description: self.description.to_string(),
            xp: self.xp,
        }
    }
}

/// Evaluation order is catalogue order
pub const ACHIEVEMENTS: [AchievementDef; 5] = [
    AchievementDef {
        id: AchievementId::FirstDraw,
        name: "Primeiro Traço",
        description: "Complete seu primeiro desenho",
        xp: 50,
    },
    AchievementDef {
        id: AchievementId::SpeedDemon,
        name: "Demônio da Velocidade",
        description: "Complete um desenho em menos de 5 segundos",
        xp: 100,
    },
    AchievementDef {
        id: AchievementId::Perfectionist,
        name: "Perfeccionista",
        description: "Acerte 10 desenhos seguidos",
        xp: 200,
    },
    AchievementDef {
        id: AchievementId::Level10,
        name: "Artista Dedicado",
        description: "Alcance o nível 10",
        xp: 500,
    },
    AchievementDef {
        id: AchievementId::AbstractMaster,
        name: "Mestre Abstrato",
        description: "Confunda a IA 5 vezes",
        xp: 150,
    },
];

const SPEED_DEMON_SECONDS: f64 = 5.0;
const PERFECTIONIST_STREAK: u32 = 10;
const LEVEL_10: u32 = 10;
const ABSTRACT_MASTER_MISSES: u32 = 5;

pub struct AchievementSystem;

impl AchievementSystem {
    pub fn definition(id: AchievementId) -> AchievementDef {
        // Every id has exactly one catalogue entry
        ACHIEVEMENTS
            .iter()
            .copied()
            .find(|def| def.id == id)
            .unwrap_or(ACHIEVEMENTS[0])
    }

    /// Whether the rule for `id` holds for this player and session
    pub fn is_satisfied(id: AchievementId, player: &Player, session: &DrawingSession) -> bool {
        match id {
            AchievementId::FirstDraw => player.total_drawings == 1,
            AchievementId::SpeedDemon => {
                session.correct() && session.time_spent().is_some_and(|t| t < SPEED_DEMON_SECONDS)
            }
            AchievementId::Perfectionist => player.streak >= PERFECTIONIST_STREAK,
            AchievementId::Level10 => player.level >= LEVEL_10,
            AchievementId::AbstractMaster => player.misses() >= ABSTRACT_MASTER_MISSES,
        }
    }

    /// Evaluate every rule against the current state, record the ones that
    /// fire on the player and return them. XP bonuses are not applied here.
    pub fn check_achievements(player: &mut Player, session: &DrawingSession) -> Vec<AchievementId> {
        let fired: Vec<AchievementId> = ACHIEVEMENTS
            .iter()
            .map(|def| def.id)
            .filter(|&id| !player.has_achievement(id) && Self::is_satisfied(id, player, session))
            .collect();

        for &id in &fired {
            player.add_achievement(id);
        }

        fired
    }
}
