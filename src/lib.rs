//! Inkly - drawing guessing game server
//!
//! Players draw a prompt, an AI classifier guesses what it shows, and the
//! game core turns the outcome into score, XP, levels, brushes and
//! achievements. Rooms group players; the leaderboard ranks them.

pub mod api;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod game;

pub use classifier::{ClassificationResult, DrawingClassifier, GeminiClassifier, Reaction, StaticClassifier};
pub use config::{ConfigLoader, InklyConfig};
pub use errors::{ConfigurationError, InklyError, InklyResult};
pub use game::GameManager;
