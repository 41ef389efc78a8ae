//! Offline simulation: keyword classifier, synthetic post generator and
//! the latency that makes simulated calls feel like real ones.

pub mod classifier;
pub mod corpus;

use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::config::MockConfig;
use crate::models::AnalysisResult;

pub use classifier::{classify, extract_keywords};
pub use corpus::generate_batch;

/// Bounds for simulated confidence scores.
pub const MOCK_CONFIDENCE_RANGE: RangeInclusive<f64> = 0.70..=1.0;

/// Delay to await before handing back a simulated result.
pub fn latency<R: Rng>(cfg: &MockConfig, rng: &mut R) -> Duration {
    let jitter = if cfg.jitter_ms == 0 {
        0
    } else {
        rng.gen_range(0..=cfg.jitter_ms)
    };
    Duration::from_millis(cfg.latency_ms.saturating_add(jitter))
}

/// Canned explanation used when a concept is explained in simulate mode.
pub fn explain_concept(concept: &str) -> String {
    let concept = concept.trim();
    format!(
        "{prefix} {concept} is a term you will see in discussions about sentiment analysis. \
         In a live session the selected model would describe what {concept} means, where it \
         is used, and how it affects the way text is classified as positive, negative or \
         neutral. Add an API key and turn off simulate mode to get a real explanation.",
        prefix = AnalysisResult::SIMULATED_RATIONALE_PREFIX,
    )
}
