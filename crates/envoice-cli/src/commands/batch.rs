//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use envoice_core::models::BatchConfig;
use envoice_core::{AnySource, BatchReport, DocumentSource, InvoiceEngine};

use crate::export::{write_output, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file
    #[arg(short, long, default_value = "output/invoice_data_combined.csv")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of parallel workers (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Abort on the first unreadable file
    #[arg(long)]
    fail_fast: bool,

    /// Also write a per-file summary CSV next to the output
    #[arg(long)]
    summary: bool,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;
    let source = AnySource::new(config.pdf.clone());

    let files = collect_inputs(&args.input, &source)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let batch_config = BatchConfig {
        jobs: args.jobs.unwrap_or(config.batch.jobs).max(1),
        continue_on_error: config.batch.continue_on_error && !args.fail_fast,
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let engine = InvoiceEngine::from_config(&config.extraction)?;
    let report = engine.process_files(&source, &files, &batch_config, |_| pb.inc(1));
    pb.finish_and_clear();
    let report = report?;

    let output_path = if args.output.extension().is_none() {
        args.output.with_extension(args.format.extension())
    } else {
        args.output.clone()
    };

    // Create output directory if needed
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(&output_path)?;
    write_output(&report.output, args.format, file)?;
    debug!("Wrote {} records to {}", report.output.len(), output_path.display());

    if args.summary {
        let summary_path = summary_path(&output_path);
        write_summary(&summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = report.failed().collect();

    println!(
        "{} Processed {} files into {} records in {:?}",
        style("✓").green(),
        report.documents.len(),
        report.output.len(),
        start.elapsed()
    );
    println!(
        "   {} read, {} unreadable",
        style(report.documents.len() - failed.len()).green(),
        style(failed.len()).red()
    );
    println!("   Data saved to {}", output_path.display());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Unreadable files:").red());
        for document in &failed {
            println!(
                "  - {}: {}",
                document.path.display(),
                document.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand a directory or glob into supported files, sorted by path.
fn collect_inputs(input: &str, source: &AnySource) -> anyhow::Result<Vec<PathBuf>> {
    let dir = Path::new(input);

    let mut files: Vec<PathBuf> = if dir.is_dir() {
        fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect()
    } else {
        glob(input)?.filter_map(|r| r.ok()).collect()
    };

    files.retain(|p| source.supports(p));
    files.sort();
    Ok(files)
}

fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{}_summary.csv", stem))
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "records",
        "line_items",
        "processing_time_ms",
        "error",
    ])?;

    for document in &report.documents {
        let filename = document
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        wtr.write_record([
            filename,
            if document.error.is_some() { "error" } else { "success" },
            &document.records.to_string(),
            &document.line_items.to_string(),
            &document.processing_time_ms.to_string(),
            document.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
