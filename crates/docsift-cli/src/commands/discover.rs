//! Discover command - propose a field schema from regex hints.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::json;
use tracing::info;

use docsift_core::{discover, pdf_to_text, Hints};

use super::{ensure_input, load_config};

/// Arguments for the discover command.
#[derive(Args)]
pub struct DiscoverArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Hints JSON file (overrides config; built-in hints otherwise)
    #[arg(long)]
    hints: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include the raw matches alongside the schema
    #[arg(long)]
    raw: bool,

    /// Include the per-page text
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: DiscoverArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    ensure_input(&args.input)?;
    if let Some(hints) = &args.hints {
        ensure_input(hints)?;
    }

    let hints_path = args.hints.or(config.discovery.hints_path);
    let hints = Hints::load(hints_path.as_deref())?;

    info!("Discovering fields in {}", args.input.display());
    let content = pdf_to_text(&args.input)?;
    let result = discover(content.pages, &hints);

    let mut output = json!({ "schema": result.schema });
    if args.raw {
        output["fields"] = serde_json::to_value(&result.fields)?;
    }
    if args.show_text {
        output["text_by_page"] = serde_json::to_value(&result.text_by_page)?;
    }
    let output = serde_json::to_string_pretty(&output)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} keys written to {}",
            style("✓").green(),
            result.schema.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
