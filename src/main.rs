use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use intentguard::analysis::extract_spans;
use intentguard::orchestrator::SuggestionOrchestrator;
use intentguard::telemetry::TelemetryRecorder;
use intentguard::{EngineConfig, InMemoryGuardCatalog};

#[derive(Parser)]
#[command(name = "intentguard", version, about = "Score text for actionable intent and suggest a matching guard")]
struct Cli {
    /// Engine configuration (JSON). Defaults apply when omitted.
    #[arg(long, env = "INTENTGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Guard catalog (JSON array). Enables suggestion output.
    #[arg(long, env = "INTENTGUARD_CATALOG")]
    catalog: Option<PathBuf>,

    /// Include a telemetry snapshot in the output.
    #[arg(long)]
    telemetry: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text).context("reading stdin")?;

    let recorder = Arc::new(TelemetryRecorder::new());
    let mut orchestrator = SuggestionOrchestrator::new(config).with_telemetry(recorder.clone());

    let result = orchestrator.evaluate(&text);
    let spans: Vec<_> = result
        .matched_segments
        .iter()
        .flat_map(|seg| extract_spans(&seg.text, seg.start, text.len()))
        .collect();

    let suggestion = match &cli.catalog {
        Some(path) => {
            let catalog = InMemoryGuardCatalog::from_path(path)
                .with_context(|| format!("loading guard catalog from {}", path.display()))?;
            let surface = orchestrator.attach_surface();
            orchestrator.refresh_suggestion(surface, &text, &catalog).await
        }
        None => None,
    };

    let mut output = json!({
        "trigger": &result,
        "spans": &spans,
        "suggestion": &suggestion,
    });
    if cli.telemetry {
        output["telemetry"] = serde_json::to_value(recorder.snapshot())?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    tracing::info!(trigger = result.trigger, reason = %result.reason.as_str(), "evaluation complete");
    Ok(())
}
