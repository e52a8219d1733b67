//! Configuration structures for the extraction pipeline.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::synonyms::SynonymDictionary;
use crate::error::{EnvoiceError, Result};
use crate::invoice::rules::DEFAULT_AMOUNT_FIELD;

/// Main configuration for the envoice pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvoiceConfig {
    /// Label synonym tables and field post-processing.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Synonym tables and field post-processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Document-level fields matched against page text.
    pub fields: SynonymDictionary,

    /// Line-item columns matched against table headers.
    pub columns: SynonymDictionary,

    /// Field whose captured value is parsed as a monetary amount.
    pub amount_field: String,

    /// Separator placed between page texts before matching.
    pub page_separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fields: SynonymDictionary::invoice_fields(),
            columns: SynonymDictionary::line_item_columns(),
            amount_field: DEFAULT_AMOUNT_FIELD.to_string(),
            page_separator: "\n".to_string(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum embedded text length for a PDF to count as text-based.
    pub min_text_length: usize,

    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 1,
            max_pages: 0,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of parallel workers.
    pub jobs: usize,

    /// Emit a field-only record for unreadable inputs instead of aborting.
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            continue_on_error: true,
        }
    }
}

impl EnvoiceConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| EnvoiceError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check the synonym tables and batch settings.
    pub fn validate(&self) -> Result<()> {
        self.extraction.fields.validate()?;
        self.extraction.columns.validate()?;
        if self.batch.jobs == 0 {
            return Err(EnvoiceError::Config("batch.jobs must be at least 1".to_string()));
        }
        Ok(())
    }
}
