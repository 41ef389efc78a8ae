use rand::Rng;

use crate::models::{AnalysisResult, SentimentLabel};

use super::MOCK_CONFIDENCE_RANGE;

const POSITIVE_WORDS: &[&str] = &[
    "love",
    "great",
    "excellent",
    "amazing",
    "happy",
    "good",
    "best",
    "awesome",
    "fantastic",
    "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "hate",
    "terrible",
    "bad",
    "worst",
    "awful",
    "sad",
    "poor",
    "horrible",
    "disappointing",
    "angry",
];

const STOPWORDS: &[&str] = &[
    "about", "their", "there", "which", "would", "could", "should", "these", "those", "other",
    "where", "while", "after", "before", "because", "something",
];

const MAX_KEYWORDS: usize = 3;
const MIN_KEYWORD_LEN: usize = 5;

/// Used when no token in the text survives filtering.
pub const FALLBACK_KEYWORDS: [&str; 2] = ["simulation", "demo"];

/// Keyword-driven label: positive cues win over negative ones, neither means neutral.
pub fn label_for(text: &str) -> SentimentLabel {
    let lower = text.to_lowercase();
    if POSITIVE_WORDS.iter().any(|w| lower.contains(w)) {
        SentimentLabel::Positive
    } else if NEGATIVE_WORDS.iter().any(|w| lower.contains(w)) {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// First three alphabetic tokens longer than four characters, stopwords removed.
///
/// Returns an empty vec when nothing qualifies; callers choose their own fallback.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphabetic())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
        .take(MAX_KEYWORDS)
        .collect()
}

pub(crate) fn simulated_rationale(label: SentimentLabel) -> String {
    let cue = match label {
        SentimentLabel::Positive => "Detected upbeat wording such as praise or enthusiasm.",
        SentimentLabel::Negative => "Detected critical wording such as complaints or frustration.",
        SentimentLabel::Neutral => "No strong emotional cues found; the text reads as informational.",
    };
    format!(
        "{} {} Configure an API key for model-generated reasoning.",
        AnalysisResult::SIMULATED_RATIONALE_PREFIX,
        cue
    )
}

/// Classifies `text` without any network call. Never fails.
pub fn classify<R: Rng>(text: &str, rng: &mut R) -> AnalysisResult {
    let label = label_for(text);

    let mut keywords = extract_keywords(text);
    if keywords.is_empty() {
        keywords = FALLBACK_KEYWORDS.iter().map(|k| k.to_string()).collect();
    }

    AnalysisResult {
        label,
        confidence: rng.gen_range(MOCK_CONFIDENCE_RANGE),
        rationale: simulated_rationale(label),
        keywords,
    }
}
