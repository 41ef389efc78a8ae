use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::{AnalysisResult, Post, SentimentLabel};

use super::MOCK_CONFIDENCE_RANGE;
use super::classifier::{extract_keywords, simulated_rationale};

type Template = fn(&str) -> String;

const POSITIVE_TEMPLATES: &[Template] = &[
    |t| format!("Just tried {t} and honestly it's amazing. Can't stop recommending it!"),
    |t| format!("{t} keeps getting better every week. Great work by everyone involved."),
    |t| format!("Huge fan of where {t} is heading. The community around it is wonderful."),
    |t| format!("Spent the weekend with {t}. Best decision I've made this month."),
    |t| format!("Whoever is behind {t}: thank you. This made my whole team happy."),
    |t| format!("Can we talk about how good {t} is right now? Genuinely impressed."),
];

const NEGATIVE_TEMPLATES: &[Template] = &[
    |t| format!("Really disappointed with {t} lately. Feels like nobody is listening."),
    |t| format!("{t} broke again this morning. Terrible timing, as usual."),
    |t| format!("Not sure why people hype {t}. My experience has been awful."),
    |t| format!("The latest {t} news is the worst thing I've read all week."),
    |t| format!("Three hours lost to {t} problems today. Absolutely frustrating."),
    |t| format!("Poor communication around {t} is making everyone angry."),
];

const NEUTRAL_TEMPLATES: &[Template] = &[
    |t| format!("Reading up on {t} this afternoon. Any recommended sources?"),
    |t| format!("New report on {t} published today, sharing for reference."),
    |t| format!("Has anyone compared {t} with the alternatives? Curious about the tradeoffs."),
    |t| format!("{t} is trending again. Wondering what changed."),
    |t| format!("Meeting notes: discussed {t} timelines, follow-up scheduled for Thursday."),
    |t| format!("Quick poll: how often do you use {t} in your daily workflow?"),
];

const HANDLES: &[&str] = &[
    "tech_guru",
    "daily_dev",
    "coffee_coder",
    "market_watch",
    "urban_nomad",
    "data_diva",
    "news_hound",
    "pixel_pusher",
    "cloud_walker",
    "quiet_reader",
];

/// Class mix for generated batches, in `SentimentLabel::ALL` order.
const CLASS_WEIGHTS: [u32; 3] = [40, 30, 30];

fn draw_label<R: Rng>(rng: &mut R) -> SentimentLabel {
    let total: u32 = CLASS_WEIGHTS.iter().sum();
    let mut roll = rng.gen_range(0..total);
    for (label, weight) in SentimentLabel::ALL.into_iter().zip(CLASS_WEIGHTS) {
        if roll < weight {
            return label;
        }
        roll -= weight;
    }
    SentimentLabel::Neutral
}

fn templates_for(label: SentimentLabel) -> &'static [Template] {
    match label {
        SentimentLabel::Positive => POSITIVE_TEMPLATES,
        SentimentLabel::Negative => NEGATIVE_TEMPLATES,
        SentimentLabel::Neutral => NEUTRAL_TEMPLATES,
    }
}

pub(crate) fn random_handle<R: Rng>(rng: &mut R) -> String {
    let name = HANDLES.choose(rng).copied().unwrap_or("anon");
    format!("@{}{}", name, rng.gen_range(10..1000))
}

fn topic_fallback_keyword(topic: &str) -> String {
    topic
        .split_whitespace()
        .next()
        .map(|w| w.to_lowercase())
        .unwrap_or_else(|| "topic".to_string())
}

/// Generates exactly `count` analyzed posts about `topic`.
pub fn generate_batch<R: Rng>(topic: &str, count: usize, rng: &mut R) -> Vec<Post> {
    let topic = topic.trim();
    let subject = if topic.is_empty() { "this" } else { topic };

    (0..count)
        .map(|_| {
            let label = draw_label(rng);
            let template = templates_for(label)
                .choose(rng)
                .copied()
                .unwrap_or(NEUTRAL_TEMPLATES[0]);
            let text = template(subject);

            let mut keywords = extract_keywords(&text);
            if keywords.is_empty() {
                keywords = vec![topic_fallback_keyword(topic)];
            }

            let analysis = AnalysisResult {
                label,
                confidence: rng.gen_range(MOCK_CONFIDENCE_RANGE),
                rationale: simulated_rationale(label),
                keywords,
            };
            Post::new(text, random_handle(rng), analysis)
        })
        .collect()
}
