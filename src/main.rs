use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Command};
use sentiment_pulse::{Config, SentimentError, SentimentService};

/// Used when RUST_LOG is unset or unparseable.
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let mode = cli.mode(&config);

    let service = SentimentService::new(config).context("Failed to initialize service")?;
    tracing::info!(provider = %mode.provider, simulate = mode.simulate, "Service ready");

    let outcome = match &cli.command {
        Command::Analyze { text } => service
            .analyze_single(text, mode)
            .await
            .map(|result| render(cli.json, &result, cli::format_analysis)),
        Command::Topic { topic, count } => service
            .analyze_topic(topic, count.unwrap_or(service.config().defaults.batch_size), mode)
            .await
            .map(|posts| render(cli.json, &posts, |p| cli::format_posts(p))),
        Command::Explain { concept } => service.explain(concept, mode).await.map(|text| {
            if cli.json {
                Ok(serde_json::json!({ "concept": concept, "explanation": text }).to_string())
            } else {
                Ok(text)
            }
        }),
    };

    match outcome {
        Ok(output) => {
            println!("{}", output.context("Failed to serialize output")?);
            Ok(())
        }
        Err(e) => {
            if let SentimentError::MissingCredential { provider } = &e {
                eprintln!(
                    "{} set {}_API_KEY or rerun with --simulate",
                    "hint:".yellow().bold(),
                    provider.as_str().to_uppercase()
                );
            } else if e.is_recoverable_by_simulation() {
                eprintln!(
                    "{} rerun with --simulate to try the offline simulator",
                    "hint:".yellow().bold()
                );
            }
            Err(e).context(format!("{} request failed", mode.provider))
        }
    }
}

fn render<T: serde::Serialize + ?Sized>(
    json: bool,
    value: &T,
    pretty: impl FnOnce(&T) -> String,
) -> serde_json::Result<String> {
    if json {
        serde_json::to_string_pretty(value)
    } else {
        Ok(pretty(value))
    }
}
