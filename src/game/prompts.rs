//! Drawing prompt selection
//!
//! Pools are fixed. Selection is uniform within a pool and driven by the
//! caller's RNG so a seeded generator gives reproducible prompts.

use crate::game::types::{Difficulty, Prompt};
use rand::seq::SliceRandom;
use rand::Rng;

/// Simple everyday objects
pub const EASY_PROMPTS: [&str; 13] = [
    "cachorro", "gato", "casa", "árvore", "sol", "lua", "estrela",
    "coração", "flor", "carro", "bicicleta", "pássaro", "peixe",
];

/// Creatures and characters
pub const MEDIUM_PROMPTS: [&str; 12] = [
    "dragão", "robô", "castelo", "foguete", "dinossauro", "sereia",
    "unicórnio", "pirata", "ninja", "bruxa", "vampiro", "zumbi",
];

/// Abstract concepts
pub const HARD_PROMPTS: [&str; 10] = [
    "felicidade", "liberdade", "solidão", "caos", "harmonia",
    "tempo", "memória", "sonho", "impossível", "infinito",
];

/// Odd combinations served in surprise mode
pub const SURPRISE_PROMPTS: [&str; 9] = [
    "um gato astronauta", "pizza voadora", "robô jardineiro",
    "dragão dormindo", "árvore de doces", "nuvem com pernas",
    "peixe-guitarra", "cachorro-unicórnio", "casa flutuante",
];

pub const DEFAULT_SURPRISE_CHANCE: f64 = 0.3;
pub const SURPRISE_TIME_LIMIT: u32 = 30;

/// Picks prompts for a requested difficulty
#[derive(Debug, Clone, Copy)]
pub struct PromptGenerator {
    surprise_chance: f64,
}

impl Default for PromptGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SURPRISE_CHANCE)
    }
}

impl PromptGenerator {
    /// Out-of-range chances are clamped; NaN and infinities use the default
    pub fn new(surprise_chance: f64) -> Self {
        let surprise_chance = if surprise_chance.is_finite() {
            surprise_chance.clamp(0.0, 1.0)
        } else {
            DEFAULT_SURPRISE_CHANCE
        };
        Self { surprise_chance }
    }

    /// Generate a prompt. With `surprise` set, a surprise prompt (always
    /// medium, 30s) replaces the requested difficulty with probability
    /// `surprise_chance`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, difficulty: Difficulty, surprise: bool) -> Prompt {
        if surprise && rng.gen_bool(self.surprise_chance) {
            let text = pick(rng, &SURPRISE_PROMPTS);
            return Prompt::new(text, Difficulty::Medium, SURPRISE_TIME_LIMIT);
        }

        let text = pick(rng, Self::pool(difficulty));
        Prompt::new(text, difficulty, difficulty.time_limit())
    }

    pub fn pool(difficulty: Difficulty) -> &'static [&'static str] {
        match difficulty {
            Difficulty::Easy => &EASY_PROMPTS,
            Difficulty::Medium => &MEDIUM_PROMPTS,
            Difficulty::Hard => &HARD_PROMPTS,
        }
    }

    pub fn is_surprise_prompt(text: &str) -> bool {
        SURPRISE_PROMPTS.contains(&text)
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&str]) -> String {
    // Pools are non-empty constants
    pool.choose(rng).copied().unwrap_or_default().to_string()
}
