//! Extract command - pull fields from a single PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docsift_core::extract::validate::TotalsOutcome;
use docsift_core::{pdf_to_text, DocumentExtraction};

use super::{build_pipeline, ensure_input, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Rule file or directory (overrides config)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Skip classification and extract with this variant
    #[arg(long)]
    variant: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show classification confidence and timing
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    ensure_input(&args.input)?;
    let pipeline = build_pipeline(&config, args.rules.as_ref())?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading PDF...");
    pb.set_position(10);
    let content = match pdf_to_text(&args.input) {
        Ok(content) => content,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };
    debug!("PDF has {} pages", content.pages.len());

    pb.set_message("Extracting fields...");
    pb.set_position(60);
    let result = match &args.variant {
        Some(variant) => pipeline.extract_with_variant(&content.text, variant),
        None => pipeline.extract(&content.text),
    };
    let extraction = match result {
        Ok(extraction) => extraction,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };

    pb.finish_and_clear();

    if let Some(report) = &extraction.fields.validation {
        if !report.valid {
            eprintln!("{}", style("Totals do not add up:").yellow());
            for check in &report.checks {
                if let TotalsOutcome::Mismatch { total, sum, difference } = &check.outcome {
                    eprintln!(
                        "  - {}: {} != {} (off by {})",
                        check.total, total, sum, difference
                    );
                }
            }
        }
    }

    let output = format_extraction(&extraction, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Classification confidence: {:.1}% ({})",
            style("ℹ").blue(),
            extraction.classification.confidence * 100.0,
            extraction.classification.evidence
        );
        println!(
            "{} Fields found: {}/{}",
            style("ℹ").blue(),
            extraction.fields.found_count(),
            extraction.fields.len()
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            extraction.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_extraction(extraction: &DocumentExtraction, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(extraction)?),
        OutputFormat::Csv => format_csv(extraction),
        OutputFormat::Text => Ok(format_text(extraction)),
    }
}

fn format_csv(extraction: &DocumentExtraction) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["variant", "field", "value", "confidence", "evidence"])?;
    for (name, result) in &extraction.fields.fields {
        wtr.write_record([
            extraction.variant.as_str(),
            name.as_str(),
            result.value.as_deref().unwrap_or(""),
            &format!("{:.2}", result.confidence),
            &result.evidence.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(extraction: &DocumentExtraction) -> String {
    let mut output = String::new();

    output.push_str(&format!("Variant: {}\n", extraction.variant));
    if extraction.classification.variant_id.is_none() {
        output.push_str("  (fallback, no variant matched)\n");
    }
    output.push('\n');

    let width = extraction
        .fields
        .names()
        .map(|n| n.len())
        .max()
        .unwrap_or(0);

    for (name, result) in &extraction.fields.fields {
        match &result.value {
            Some(value) => output.push_str(&format!("  {:width$}  {}\n", name, value)),
            None => output.push_str(&format!("  {:width$}  - ({})\n", name, result.evidence)),
        }
    }

    if let Some(report) = &extraction.fields.validation {
        output.push_str(&format!(
            "\nTotals: {}\n",
            if report.valid { "ok" } else { "mismatch" }
        ));
    }

    output
}
