//! Batch processing of files through acquisition and the engine.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, error, warn};

use super::engine::{DocumentInput, InvoiceEngine};
use crate::error::Result;
use crate::models::{BatchConfig, CombinedRecord, OutputSet};
use crate::source::{file_name_of, DocumentSource};

/// Outcome for one input file.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// Input path.
    pub path: PathBuf,
    /// Records produced for this file.
    pub records: usize,
    /// Line items decoded from tables.
    pub line_items: usize,
    /// Acquisition error, if the file could not be read.
    pub error: Option<String>,
    /// Processing time in milliseconds, acquisition included.
    pub processing_time_ms: u64,
}

/// Output of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Flattened records in input order.
    pub output: OutputSet,
    /// Per-file outcomes in input order.
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| d.error.is_some())
    }
}

impl InvoiceEngine {
    /// Acquire and flatten `paths` in order using `config.jobs` workers.
    ///
    /// With `continue_on_error`, a file that cannot be read still yields
    /// its field-only record (just the file name); otherwise the first
    /// failure aborts the batch.
    pub fn process_files<S, F>(
        &self,
        source: &S,
        paths: &[PathBuf],
        config: &BatchConfig,
        on_done: F,
    ) -> Result<BatchReport>
    where
        S: DocumentSource + Sync,
        F: Fn(&DocumentReport) + Sync,
    {
        let run_one = |path: &PathBuf| -> Result<(Vec<CombinedRecord>, DocumentReport)> {
            let result = self.process_path(source, path, config.continue_on_error);
            if let Ok((_, report)) = &result {
                on_done(report);
            }
            result
        };

        let results: Vec<Result<(Vec<CombinedRecord>, DocumentReport)>> = if config.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.jobs)
                .build()?;
            pool.install(|| paths.par_iter().map(run_one).collect())
        } else {
            let mut results = Vec::with_capacity(paths.len());
            for path in paths {
                let result = run_one(path);
                let failed = result.is_err();
                results.push(result);
                if failed {
                    break;
                }
            }
            results
        };

        let mut report = BatchReport::default();
        for result in results {
            let (records, document) = result?;
            report.output.extend(records);
            report.documents.push(document);
        }
        Ok(report)
    }

    fn process_path<S: DocumentSource>(
        &self,
        source: &S,
        path: &Path,
        continue_on_error: bool,
    ) -> Result<(Vec<CombinedRecord>, DocumentReport)> {
        let start = Instant::now();

        let (document, error) = match source.acquire(path) {
            Ok(document) => (document, None),
            Err(e) if continue_on_error => {
                warn!("Failed to read {}: {}", path.display(), e);
                (DocumentInput::empty(file_name_of(path)), Some(e.to_string()))
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return Err(e);
            }
        };

        let extraction = self.extract(&document);
        for warning in &extraction.warnings {
            debug!("{}: {}", document.file_name, warning);
        }
        let line_items = extraction.rows.len();
        let records = super::merge::merge(extraction.fields, extraction.rows, &document.file_name);

        let report = DocumentReport {
            path: path.to_path_buf(),
            records: records.len(),
            line_items,
            error,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };
        Ok((records, report))
    }
}

/// Process a single file, failing if it cannot be read.
pub fn process_file<S: DocumentSource>(
    engine: &InvoiceEngine,
    source: &S,
    path: &Path,
) -> Result<Vec<CombinedRecord>> {
    let document = source.acquire(path)?;
    Ok(engine.process(&document))
}
