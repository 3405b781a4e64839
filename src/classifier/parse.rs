//! Turning free-form model output into a `ClassificationResult`

use super::{ClassificationResult, Reaction};
use serde_json::Value;

const DEFAULT_CONFIDENCE: u8 = 50;
const SPEECHLESS_FEEDBACK: &str = "The AI was left speechless by your creativity!";

/// Parse the model's text answer. Expected shape:
/// `{"guesses": [{"label": "...", "confidence": 80}], "feedback": "...", "reaction": "..."}`
/// possibly wrapped in markdown fences or surrounded by prose.
pub fn parse_model_text(text: &str, target: &str, max_guesses: usize) -> ClassificationResult {
    let cleaned = strip_code_fences(text);

    match extract_json_object(&cleaned) {
        Some(parsed) => from_json(&parsed, target, max_guesses),
        None => from_plain_text(&cleaned),
    }
}

/// Case-insensitive containment in either direction
pub fn guess_matches(guess: &str, target: &str) -> bool {
    let guess = guess.trim().to_lowercase();
    let target = target.trim().to_lowercase();
    if guess.is_empty() || target.is_empty() {
        return false;
    }
    guess.contains(&target) || target.contains(&guess)
}

fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn extract_json_object(text: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn from_json(parsed: &Value, target: &str, max_guesses: usize) -> ClassificationResult {
    let items = parsed
        .get("guesses")
        .or_else(|| parsed.get("predictions"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let guesses: Vec<String> = items
        .iter()
        .filter_map(guess_label)
        .filter(|label| !label.trim().is_empty())
        .take(max_guesses)
        .collect();

    let confidence = items
        .first()
        .and_then(|first| first.get("confidence"))
        .or_else(|| parsed.get("confidence"))
        .and_then(confidence_value)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let feedback = parsed
        .get("feedback")
        .or_else(|| parsed.get("comment"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let reaction = parsed
        .get("reaction")
        .and_then(Value::as_str)
        .map(Reaction::from_model_text)
        .unwrap_or_default();

    let correct = guesses.first().is_some_and(|first| guess_matches(first, target));

    ClassificationResult {
        guesses,
        confidence,
        feedback,
        reaction,
        correct,
    }
}

fn from_plain_text(text: &str) -> ClassificationResult {
    let guesses = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| vec![line.to_string()])
        .unwrap_or_default();

    ClassificationResult {
        guesses,
        confidence: DEFAULT_CONFIDENCE,
        feedback: SPEECHLESS_FEEDBACK.to_string(),
        reaction: Reaction::Thinking,
        correct: false,
    }
}

fn guess_label(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("label").and_then(Value::as_str).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn confidence_value(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    Some(number.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fenced_json() {
        let text = "```json\n{\"guesses\": [{\"label\": \"Gato preto\", \"confidence\": 87}, {\"label\": \"cachorro\", \"confidence\": 10}], \"feedback\": \"Lindo!\", \"reaction\": \"happy\"}\n```";
        let result = parse_model_text(text, "gato", 5);

        assert_eq!(result.guesses, vec!["Gato preto", "cachorro"]);
        assert_eq!(result.confidence, 87);
        assert_eq!(result.feedback, "Lindo!");
        assert_eq!(result.reaction, Reaction::Happy);
        assert!(result.correct);
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let text = "Sure! Here it is: {\"predictions\": [\"casa\", \"sol\"], \"comment\": \"ok\"} hope it helps";
        let result = parse_model_text(text, "árvore", 5);

        assert_eq!(result.guesses, vec!["casa", "sol"]);
        assert_eq!(result.confidence, 50);
        assert_eq!(result.feedback, "ok");
        assert_eq!(result.reaction, Reaction::Thinking);
        assert!(!result.correct);
    }

    #[test]
    fn test_guess_limit_and_confidence_clamp() {
        let text = r#"{"guesses": [{"label": "a", "confidence": 140}, "b", "c", "d", "e", "f", "g"]}"#;
        let result = parse_model_text(text, "z", 5);
        assert_eq!(result.guesses.len(), 5);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn test_plain_text_fallback() {
        let result = parse_model_text("\n  um dragão voando\nmore text", "dragão", 5);
        assert_eq!(result.guesses, vec!["um dragão voando"]);
        assert!(!result.correct);
        assert_eq!(result.feedback, SPEECHLESS_FEEDBACK);

        let empty = parse_model_text("", "dragão", 5);
        assert!(empty.guesses.is_empty());
    }

    #[test]
    fn test_guess_matches_both_directions() {
        assert!(guess_matches("Um gato", "gato"));
        assert!(guess_matches("gato", "um gato astronauta"));
        assert!(!guess_matches("", "gato"));
        assert!(!guess_matches("peixe", "gato"));
    }
}
