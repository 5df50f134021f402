//! Batch command - extract many PDFs into one JSONL file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use docsift_core::{
    pdf_to_text, ClassificationResult, DocsiftError, DocumentPipeline, FieldResults,
};

use super::{build_pipeline, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output JSONL file, one record per document
    #[arg(short, long, required = true)]
    output: PathBuf,

    /// Rule file or directory (overrides config)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Also write a summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,
}

/// One JSONL line.
#[derive(Debug, Serialize)]
struct BatchRecord {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip)]
    processing_time_ms: u64,
}

impl BatchRecord {
    fn failure(path: &Path, error: &str, message: Option<String>) -> Self {
        Self {
            path: path.display().to_string(),
            classification: None,
            variant: None,
            fields: None,
            error: Some(error.to_string()),
            message,
            processing_time_ms: 0,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let pipeline = Arc::new(build_pipeline(&config, args.rules.as_ref())?);

    let files = expand_input(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found for: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, path) in files.iter().cloned().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let pipeline = pipeline.clone();
        tasks.spawn_blocking(move || {
            let record = process_file(&pipeline, &path);
            drop(permit);
            (idx, record)
        });
    }

    let mut records: Vec<Option<BatchRecord>> = files.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, record)) => {
                if let Some(error) = &record.error {
                    warn!("{}: {}", record.path, error);
                }
                records[idx] = Some(record);
            }
            Err(e) => warn!("Batch worker failed: {}", e),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    let records = fill_missing(records, &files);

    let mut out = BufWriter::new(File::create(&args.output)?);
    for record in &records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    debug!("Wrote {} records to {}", records.len(), args.output.display());

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &records)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = records.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        records.len(),
        start.elapsed()
    );
    println!(
        "   {} extracted, {} failed",
        style(records.len() - failed.len()).green(),
        style(failed.len()).red()
    );
    println!(
        "{} Output written to {}",
        style("✓").green(),
        args.output.display()
    );

    Ok(())
}

/// A directory means every PDF directly inside it; anything else is a glob.
fn expand_input(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let dir = Path::new(input);
    let pattern = if dir.is_dir() {
        dir.join("*").to_string_lossy().into_owned()
    } else {
        input.to_string()
    };

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_pdf(p))
        .collect();
    files.sort();
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn process_file(pipeline: &DocumentPipeline, path: &Path) -> BatchRecord {
    let start = Instant::now();

    let content = match pdf_to_text(path) {
        Ok(content) => content,
        Err(DocsiftError::UnreadableDocument(reason)) => {
            return BatchRecord::failure(path, "no_text", Some(reason));
        }
        Err(e) => return BatchRecord::failure(path, "failed", Some(e.to_string())),
    };

    let mut record = match pipeline.extract(&content.text) {
        Ok(extraction) => BatchRecord {
            path: path.display().to_string(),
            classification: Some(extraction.classification),
            variant: Some(extraction.variant),
            fields: Some(extraction.fields),
            error: None,
            message: None,
            processing_time_ms: extraction.processing_time_ms,
        },
        Err(DocsiftError::UnreadableDocument(reason)) => {
            BatchRecord::failure(path, "no_text", Some(reason))
        }
        Err(DocsiftError::NoVariantMatched(_)) => BatchRecord {
            classification: pipeline.classify(&content.text).ok(),
            ..BatchRecord::failure(path, "no_variant", None)
        },
        Err(e) => BatchRecord::failure(path, "failed", Some(e.to_string())),
    };

    if record.processing_time_ms == 0 {
        record.processing_time_ms = start.elapsed().as_millis() as u64;
    }
    record
}

/// A slot left empty by a crashed worker becomes a `failed` record for its file.
fn fill_missing(slots: Vec<Option<BatchRecord>>, files: &[PathBuf]) -> Vec<BatchRecord> {
    slots
        .into_iter()
        .zip(files)
        .map(|(slot, path)| {
            slot.unwrap_or_else(|| {
                BatchRecord::failure(path, "failed", Some("worker panicked".to_string()))
            })
        })
        .collect()
}

fn write_summary(path: &Path, records: &[BatchRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "variant",
        "confidence",
        "fields_found",
        "fields_total",
        "processing_time_ms",
        "error",
    ])?;

    for record in records {
        let filename = Path::new(&record.path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let confidence = record
            .classification
            .as_ref()
            .map(|c| format!("{:.2}", c.confidence))
            .unwrap_or_default();
        let (found, total) = record
            .fields
            .as_ref()
            .map(|f| (f.found_count().to_string(), f.len().to_string()))
            .unwrap_or_default();

        wtr.write_record([
            filename,
            if record.error.is_some() { "error" } else { "success" },
            record.variant.as_deref().unwrap_or(""),
            &confidence,
            &found,
            &total,
            &record.processing_time_ms.to_string(),
            record.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
