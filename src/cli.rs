//! Command-line arguments and terminal output.

use clap::{Parser, Subcommand};
use colored::Colorize;

use sentiment_pulse::{AnalysisMode, AnalysisResult, Config, Post, ProviderIdentity, SentimentLabel};

/// Classify text sentiment with Gemini or Groq, or simulate it offline.
#[derive(Debug, Parser)]
#[command(name = "sentiment-pulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Provider to use (gemini or groq); defaults to the configured one
    #[arg(short, long, global = true, env = "SENTIMENT_PROVIDER")]
    pub provider: Option<ProviderIdentity>,

    /// Use the offline simulator instead of a live API
    #[arg(short, long, global = true)]
    pub simulate: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify a single piece of text
    Analyze {
        /// Text to classify
        text: String,
    },

    /// Generate and classify a batch of posts about a topic
    Topic {
        /// Topic to generate posts about
        topic: String,

        /// Number of posts; defaults to the configured batch size
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Explain a sentiment-analysis concept in plain prose
    Explain {
        /// Concept name, e.g. "sarcasm detection"
        concept: String,
    },
}

impl Cli {
    /// Mode from flags, falling back to configured defaults.
    pub fn mode(&self, config: &Config) -> AnalysisMode {
        AnalysisMode {
            provider: self.provider.unwrap_or(config.defaults.provider),
            simulate: self.simulate || config.defaults.simulate,
        }
    }
}

const LABEL_WIDTH: usize = 10;

// Pads before coloring so escape codes don't eat into the column width.
fn colored_label(label: SentimentLabel, width: usize) -> String {
    let text = format!("{:<width$}", label.as_str());
    match label {
        SentimentLabel::Positive => text.green().bold().to_string(),
        SentimentLabel::Negative => text.red().bold().to_string(),
        SentimentLabel::Neutral => text.yellow().bold().to_string(),
    }
}

pub fn format_analysis(result: &AnalysisResult) -> String {
    let mut out = format!(
        "{} ({:.0}% confidence)\n{}",
        colored_label(result.label, 0),
        result.confidence * 100.0,
        result.rationale
    );
    if !result.keywords.is_empty() {
        out.push_str(&format!("\nKeywords: {}", result.keywords.join(", ").cyan()));
    }
    out
}

pub fn format_posts(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "No posts returned.".yellow().to_string();
    }

    let mut counts = [0usize; 3];
    let mut lines = Vec::with_capacity(posts.len() + 2);
    for post in posts {
        let (label, confidence) = match &post.analysis {
            Some(a) => {
                if let Some(i) = SentimentLabel::ALL.iter().position(|l| *l == a.label) {
                    counts[i] += 1;
                }
                (colored_label(a.label, LABEL_WIDTH), format!("{:.2}", a.confidence))
            }
            None => (
                format!("{:<LABEL_WIDTH$}", "-").dimmed().to_string(),
                "-".to_string(),
            ),
        };
        lines.push(format!(
            "{} {:>5}  {}  {}",
            label,
            confidence,
            post.author.dimmed(),
            post.text
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} posts: {} positive, {} negative, {} neutral",
        posts.len(),
        counts[0],
        counts[1],
        counts[2]
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_color() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_parse_topic_with_globals() {
        let cli = Cli::parse_from([
            "sentiment-pulse",
            "topic",
            "rust 2024",
            "-n",
            "4",
            "--provider",
            "groq",
            "--simulate",
        ]);
        assert_eq!(cli.provider, Some(ProviderIdentity::Groq));
        assert!(cli.simulate);
        match cli.command {
            Command::Topic { topic, count } => {
                assert_eq!(topic, "rust 2024");
                assert_eq!(count, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let parsed = Cli::try_parse_from(["sentiment-pulse", "--provider", "openai", "analyze", "hi"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_mode_falls_back_to_config() {
        let config = Config::from_yaml_str("defaults: { provider: groq, simulate: true, batch_size: 3 }")
            .unwrap();
        let cli = Cli::parse_from(["sentiment-pulse", "explain", "sarcasm"]);
        let mode = cli.mode(&config);
        assert_eq!(mode.provider, ProviderIdentity::Groq);
        assert!(mode.simulate);
    }

    #[test]
    fn test_format_analysis_plain() {
        no_color();
        let text = format_analysis(&AnalysisResult {
            label: SentimentLabel::Negative,
            confidence: 0.874,
            rationale: "Complaint.".to_string(),
            keywords: vec!["update".to_string(), "terrible".to_string()],
        });
        assert_eq!(text, "Negative (87% confidence)\nComplaint.\nKeywords: update, terrible");
    }

    #[test]
    fn test_format_posts_summary_line() {
        no_color();
        let posts = vec![Post::new(
            "Love it".to_string(),
            "@a".to_string(),
            AnalysisResult {
                label: SentimentLabel::Positive,
                confidence: 0.9,
                rationale: "Praise.".to_string(),
                keywords: vec![],
            },
        )];
        let text = format_posts(&posts);
        assert!(text.ends_with("1 posts: 1 positive, 0 negative, 0 neutral"));
        assert_eq!(format_posts(&[]), "No posts returned.");
    }

    #[test]
    fn test_label_padding_sits_inside_color_codes() {
        // Holds with or without color: the spaces are part of the styled text
        let label = colored_label(SentimentLabel::Neutral, LABEL_WIDTH);
        assert!(label.contains("Neutral   "));
        assert!(colored_label(SentimentLabel::Positive, 0).contains("Positive"));
    }
}
