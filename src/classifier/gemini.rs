//! Gemini REST classifier
//!
//! One `generateContent` call per drawing with the PNG inlined. Every failure
//! is logged and mapped to `ClassificationResult::unavailable`.

use super::{parse::parse_model_text, ClassificationResult, ClassifierError, DrawingClassifier};
use crate::config::ClassifierConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const IMAGE_MIME_TYPE: &str = "image/png";
const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 300;

/// Classifier backed by the Gemini generative language API
#[derive(Clone)]
pub struct GeminiClassifier {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    max_guesses: usize,
}

impl GeminiClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            max_guesses: config.max_guesses.max(1),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn instruction(target: &str) -> String {
        format!(
            "You are the guesser in a drawing game. Look at the attached drawing and reply with JSON only: \
             {{\"guesses\": [up to 5 objects {{\"label\": string, \"confidence\": 0-100}} ordered from most to least likely], \
             \"feedback\": a short friendly comment about the drawing, \
             \"reaction\": one word out of happy, impressed, confused, surprised, thinking}}. \
             The player was asked to draw: {}",
            target
        )
    }

    /// Send the request and return the model's raw text answer
    pub async fn request_text(&self, image_base64: &str, target: &str) -> Result<String, ClassifierError> {
        let api_key = self.api_key.as_deref().ok_or(ClassifierError::MissingApiKey)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: Self::instruction(target),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: IMAGE_MIME_TYPE.to_string(),
                            data: image_base64.to_string(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed
            .first_text()
            .ok_or_else(|| ClassifierError::Parse("response contained no text part".to_string()))
    }
}

#[async_trait]
impl DrawingClassifier for GeminiClassifier {
    async fn classify(&self, image_base64: &str, target: &str) -> ClassificationResult {
        if !self.has_api_key() {
            return ClassificationResult::no_api_key();
        }

        match self.request_text(image_base64, target).await {
            Ok(text) => {
                debug!(model = %self.model, chars = text.len(), "Classifier answered");
                parse_model_text(&text, target, self.max_guesses)
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "Classification failed, using fallback result");
                ClassificationResult::unavailable(e)
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.clone())
    }
}
