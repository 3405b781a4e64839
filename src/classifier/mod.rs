//! Drawing classification boundary
//!
//! The game core only needs "what did the AI think this drawing was". A
//! classifier never fails from the caller's point of view: transport and
//! parse problems are turned into a fixed fallback result.

pub mod gemini;
pub mod parse;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use gemini::GeminiClassifier;

/// Short mood tag shown next to the AI's guess
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Reaction {
    #[default]
    Thinking,
    Happy,
    Impressed,
    Confused,
    Surprised,
    NoApiKey,
    Error,
}

impl Reaction {
    /// Map a free-form word from the model onto the tag set
    pub fn from_model_text(text: &str) -> Self {
        let word = text.trim().to_lowercase();
        match word.as_str() {
            "happy" | "excited" | "yay" | "feliz" => Reaction::Happy,
            "impressed" | "wow" | "amazing" | "impressionado" => Reaction::Impressed,
            "confused" | "hmm" | "puzzled" | "confuso" => Reaction::Confused,
            "surprised" | "surpreso" => Reaction::Surprised,
            _ => Reaction::Thinking,
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Reaction::Thinking => "thinking",
            Reaction::Happy => "happy",
            Reaction::Impressed => "impressed",
            Reaction::Confused => "confused",
            Reaction::Surprised => "surprised",
            Reaction::NoApiKey => "no-api-key",
            Reaction::Error => "error",
        };
        f.write_str(tag)
    }
}

/// What the AI made of a drawing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    /// Most likely first
    pub guesses: Vec<String>,
    /// 0..=100
    pub confidence: u8,
    pub feedback: String,
    pub reaction: Reaction,
    pub correct: bool,
}

impl ClassificationResult {
    /// Returned when no API key is configured
    pub fn no_api_key() -> Self {
        Self {
            guesses: Vec::new(),
            confidence: 50,
            feedback: "No API key provided; returning stub result.".to_string(),
            reaction: Reaction::NoApiKey,
            correct: false,
        }
    }

    /// Returned when the service is unreachable or its answer is unusable
    pub fn unavailable(reason: impl fmt::Display) -> Self {
        Self {
            guesses: Vec::new(),
            confidence: 0,
            feedback: format!("Request error: {}", reason),
            reaction: Reaction::Error,
            correct: false,
        }
    }
}

/// Failures inside a classifier; never surfaced to the game core
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unusable response: {0}")]
    Parse(String),

    #[error("timed out after {0}ms")]
    Timeout(u128),
}

/// External oracle that guesses what a drawing shows
#[async_trait]
pub trait DrawingClassifier: Send + Sync {
    /// Classify a base64 PNG against the target prompt. Never fails.
    async fn classify(&self, image_base64: &str, target: &str) -> ClassificationResult;
}

/// Classifier with a canned answer, used in tests and offline mode
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    result: ClassificationResult,
}

impl StaticClassifier {
    pub fn new(result: ClassificationResult) -> Self {
        Self { result }
    }

    /// Always recognises the target with the given confidence
    pub fn always_correct(confidence: u8) -> Self {
        Self::new(ClassificationResult {
            guesses: Vec::new(),
            confidence,
            feedback: "Nice drawing!".to_string(),
            reaction: Reaction::Happy,
            correct: true,
        })
    }

    pub fn always_wrong(confidence: u8) -> Self {
        Self::new(ClassificationResult {
            guesses: vec!["mystery".to_string()],
            confidence,
            feedback: "I have no idea what that is.".to_string(),
            reaction: Reaction::Confused,
            correct: false,
        })
    }
}

#[async_trait]
impl DrawingClassifier for StaticClassifier {
    async fn classify(&self, _image_base64: &str, target: &str) -> ClassificationResult {
        let mut result = self.result.clone();
        if result.correct && result.guesses.is_empty() {
            result.guesses.push(target.to_string());
        }
        result
    }
}

/// Strip a `data:image/...;base64,` prefix if present
pub fn strip_data_url_prefix(drawing_data: &str) -> &str {
    match drawing_data.split_once(',') {
        Some((_, payload)) => payload,
        None => drawing_data,
    }
}
