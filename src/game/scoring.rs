//! Score arithmetic and level-gated brush unlocks

use crate::game::types::{BrushType, Player, ScoreBreakdown};

pub const CORRECT_BASE_SCORE: u32 = 100;
pub const INCORRECT_BASE_SCORE: u32 = 20;
/// Points per second left on the clock
pub const TIME_BONUS_PER_SECOND: f64 = 5.0;

/// Minimum level for each unlockable brush
pub const BRUSH_UNLOCKS: [(u32, BrushType); 4] = [
    (3, BrushType::Neon),
    (5, BrushType::Spray),
    (7, BrushType::Marker),
    (10, BrushType::Sparkle),
];

/// Compute the score for one completion.
///
/// `time_bonus` is `round((time_limit - time_spent) * 5)` floored at zero and
/// `confidence_bonus` is `confidence / 2` rounded down.
pub fn score_breakdown(correct: bool, confidence: u8, time_limit: u32, time_spent: f64) -> ScoreBreakdown {
    let base = if correct { CORRECT_BASE_SCORE } else { INCORRECT_BASE_SCORE };

    let raw_bonus = ((time_limit as f64 - time_spent) * TIME_BONUS_PER_SECOND).round();
    let time_bonus = if raw_bonus > 0.0 { raw_bonus as u32 } else { 0 };

    let confidence_bonus = u32::from(confidence.min(100)) / 2;

    ScoreBreakdown {
        base,
        time_bonus,
        confidence_bonus,
    }
}

/// Unlock every brush whose level threshold the player has reached.
/// Returns the brushes that were newly added.
pub fn unlock_brushes(player: &mut Player) -> Vec<BrushType> {
    let mut unlocked = Vec::new();
    for (level, brush) in BRUSH_UNLOCKS {
        if player.level >= level && !player.brushes_unlocked.contains(&brush) {
            player.unlock_brush(brush);
            unlocked.push(brush);
        }
    }
    unlocked
}
