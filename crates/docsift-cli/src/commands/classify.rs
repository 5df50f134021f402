//! Classify command - report which variant a PDF matches.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use docsift_core::pdf_to_text;

use super::{build_pipeline, ensure_input, load_config};

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Rule file or directory (overrides config)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Print the classification as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    ensure_input(&args.input)?;
    let pipeline = build_pipeline(&config, args.rules.as_ref())?;

    info!("Classifying file: {}", args.input.display());
    let content = pdf_to_text(&args.input)?;
    let classification = pipeline.classify(&content.text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
        return Ok(());
    }

    match &classification.variant_id {
        Some(variant) => println!(
            "{} {} (confidence {:.0}%, {})",
            style("✓").green(),
            style(variant).bold(),
            classification.confidence * 100.0,
            classification.evidence
        ),
        None => println!(
            "{} No variant matched ({} variants checked)",
            style("✗").red(),
            pipeline.rules().len()
        ),
    }

    Ok(())
}
