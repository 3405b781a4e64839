//! Game core: progression rules, prompts, achievements and the session manager

pub mod achievements;
pub mod manager;
pub mod prompts;
pub mod scoring;
pub mod store;
pub mod types;

pub use achievements::{AchievementDef, AchievementSystem, ACHIEVEMENTS};
pub use manager::GameManager;
pub use prompts::PromptGenerator;
pub use store::{GameStore, InMemoryStore};
pub use types::*;
