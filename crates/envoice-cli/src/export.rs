//! Rendering of flattened records as CSV, JSON or plain text.

use std::io::Write;

use envoice_core::OutputSet;

/// Output format for extracted records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of records
    Json,
    /// CSV table, one row per record
    Csv,
    /// Plain text listing
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// Write `output` to `writer` in the given format.
pub fn write_output<W: Write>(output: &OutputSet, format: OutputFormat, writer: W) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(output, writer),
        OutputFormat::Csv => write_csv(output, writer),
        OutputFormat::Text => write_text(output, writer),
    }
}

/// CSV with the union of all record keys as header; missing keys are
/// written as empty cells.
pub fn write_csv<W: Write>(output: &OutputSet, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let (columns, rows) = output.to_rows();
    if columns.is_empty() {
        wtr.flush()?;
        return Ok(());
    }

    wtr.write_record(&columns)?;
    for row in &rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(output: &OutputSet, mut writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, output)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_text<W: Write>(output: &OutputSet, mut writer: W) -> anyhow::Result<()> {
    for (i, record) in output.records().iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "Record {}:", i + 1)?;
        for (key, value) in record.entries() {
            writeln!(writer, "  {}: {}", key, value)?;
        }
    }
    Ok(())
}
