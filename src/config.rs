//! Configuration management with validation and defaults
//!
//! Values come from an optional TOML file, then environment overrides, then
//! validation. The binary applies command-line flags on top.

use crate::errors::{ConfigurationError, InklyResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level server configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InklyConfig {
    pub server: ServerConfig,
    pub game: GameConfig,
    pub classifier: ClassifierConfig,
}

/// HTTP listener settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec!["*".to_string()],
            // Covers the classifier timeout plus scoring
            request_timeout_secs: 60,
        }
    }
}

/// Game rules that are deployment choices rather than fixed arithmetic
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Create a placeholder player when a session is started for an unknown id
    pub auto_provision_players: bool,
    /// Seed for prompt and difficulty selection; entropy when unset
    pub rng_seed: Option<u64>,
    /// Probability of a surprise prompt when surprise mode is requested
    pub surprise_chance: f64,
    pub default_leaderboard_limit: usize,
    pub max_leaderboard_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            auto_provision_players: false,
            rng_seed: None,
            surprise_chance: 0.3,
            default_leaderboard_limit: 10,
            max_leaderboard_limit: 100,
        }
    }
}

/// Settings for the drawing classification service
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Without a key the classifier answers with a local stub result
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_guesses: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 15,
            max_guesses: 5,
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> InklyResult<InklyConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            InklyConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> InklyResult<InklyConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut InklyConfig) -> InklyResult<()> {
        if let Ok(host) = env::var("INKLY_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("INKLY_PORT") {
            config.server.port = parse_env("INKLY_PORT", port, "Invalid port number")?;
        }
        if let Ok(flag) = env::var("INKLY_AUTO_PROVISION") {
            config.game.auto_provision_players =
                parse_env("INKLY_AUTO_PROVISION", flag, "Invalid boolean value")?;
        }
        if let Ok(seed) = env::var("INKLY_RNG_SEED") {
            config.game.rng_seed = Some(parse_env("INKLY_RNG_SEED", seed, "Invalid seed")?);
        }
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                config.classifier.api_key = Some(key);
            }
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.classifier.model = model;
        }
        if let Ok(timeout) = env::var("INKLY_CLASSIFIER_TIMEOUT") {
            config.classifier.timeout_secs =
                parse_env("INKLY_CLASSIFIER_TIMEOUT", timeout, "Invalid timeout value")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &InklyConfig) -> InklyResult<()> {
        if config.server.port == 0 {
            return Err(invalid("server.port", "0", "Port cannot be zero"));
        }

        if config.server.request_timeout_secs == 0 {
            return Err(invalid("server.request_timeout_secs", "0", "Timeout cannot be zero"));
        }

        if !(0.0..=1.0).contains(&config.game.surprise_chance) {
            return Err(invalid(
                "game.surprise_chance",
                &config.game.surprise_chance.to_string(),
                "Probability must be between 0 and 1",
            ));
        }

        if config.game.max_leaderboard_limit == 0 {
            return Err(invalid("game.max_leaderboard_limit", "0", "Limit cannot be zero"));
        }

        if config.game.default_leaderboard_limit > config.game.max_leaderboard_limit {
            return Err(invalid(
                "game.default_leaderboard_limit",
                &config.game.default_leaderboard_limit.to_string(),
                "Default limit cannot exceed max limit",
            ));
        }

        if config.classifier.model.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("classifier.model".to_string()).into());
        }

        if config.classifier.timeout_secs == 0 {
            return Err(invalid("classifier.timeout_secs", "0", "Timeout cannot be zero"));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &InklyConfig, path: &str) -> InklyResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String, reason: &str) -> InklyResult<T> {
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(invalid(field, &value, reason)),
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> crate::errors::InklyError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
