//! Process command - extract records from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use envoice_core::{merge, AnySource, DocumentSource, InvoiceEngine, OutputSet};

use crate::export::{write_output, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or JSON bundle)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show which label matched each field
    #[arg(long)]
    explain: bool,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let source = AnySource::new(config.pdf.clone());
    if !source.supports(&args.input) {
        anyhow::bail!(
            "Unsupported file format: {} (expected .pdf or .json)",
            args.input.display()
        );
    }

    info!("Processing file: {}", args.input.display());

    let engine = InvoiceEngine::from_config(&config.extraction)?;
    let document = source.acquire(&args.input)?;
    if document.pages.is_empty() {
        eprintln!(
            "{} No text found in {}",
            style("!").yellow(),
            args.input.display()
        );
    }

    let result = engine.extract(&document);

    if args.explain {
        for m in &result.matches {
            eprintln!(
                "{} {} <- {:?} at byte {}: {}",
                style("ℹ").blue(),
                m.field,
                m.synonym,
                m.position.0,
                m.value
            );
        }
        for warning in &result.warnings {
            eprintln!("{} {}", style("!").yellow(), warning);
        }
    }

    let records = merge(result.fields, result.rows, &document.file_name);
    let output = OutputSet::new(records);

    // Write output
    if let Some(output_path) = &args.output {
        let file = fs::File::create(output_path)?;
        write_output(&output, args.format, file)?;
        println!(
            "{} {} records written to {}",
            style("✓").green(),
            output.len(),
            output_path.display()
        );
    } else {
        write_output(&output, args.format, std::io::stdout().lock())?;
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
