//! Prompt text shared by both adapters.

use super::BATCH_ENVELOPE_KEY;

pub fn analyze_prompt(text: &str) -> String {
    format!(
        "Analyze the sentiment of the following text. Classify it as Positive, Negative, or \
         Neutral, give a confidence between 0.0 and 1.0, a one or two sentence reasoning, \
         and up to three keywords that drove the decision.\n\nText: \"{text}\""
    )
}

pub fn batch_prompt(topic: &str, count: usize) -> String {
    format!(
        "Generate exactly {count} realistic, diverse short social media posts about \"{topic}\". \
         Mix positive, negative and neutral opinions. For each post include the post text, an \
         author handle starting with @, its sentiment (Positive, Negative, or Neutral), a \
         confidence between 0.0 and 1.0, a short reasoning, and up to three keywords."
    )
}

pub fn explain_prompt(name: &str) -> String {
    format!(
        "Explain the concept \"{name}\" as it relates to sentiment analysis and natural \
         language processing. Keep it to two short paragraphs of plain prose suitable for a \
         dashboard help panel. Do not use markdown headings."
    )
}

/// System message for chat backends that lack schema enforcement.
pub fn analyze_system_message() -> String {
    r#"You are a sentiment analysis engine. Respond with a single JSON object and nothing else.
The JSON object must have exactly this structure:
{
    "sentiment": "Positive" | "Negative" | "Neutral",
    "confidence": number, // between 0.0 and 1.0
    "reasoning": "string", // one or two sentences
    "keywords": ["string"] // up to three words from the text
}"#
    .to_string()
}

pub fn batch_system_message() -> String {
    format!(
        r#"You generate synthetic social media posts with sentiment labels. Respond with a single JSON object and nothing else.
The JSON object must have exactly this structure:
{{
    "{BATCH_ENVELOPE_KEY}": [
        {{
            "text": "string",
            "author": "@handle",
            "sentiment": "Positive" | "Negative" | "Neutral",
            "confidence": number, // between 0.0 and 1.0
            "reasoning": "string",
            "keywords": ["string"]
        }}
    ]
}}"#
    )
}

pub fn explain_system_message() -> String {
    "You are a patient instructor who explains natural language processing concepts in plain, \
     concise prose."
        .to_string()
}
