//! Document acquisition: turning files into page texts and raw tables.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{EnvoiceError, ExtractionError, Result};
use crate::invoice::DocumentInput;
use crate::models::{PdfConfig, RawTable};

#[cfg(feature = "pdf")]
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Produces page texts and tables for a file.
pub trait DocumentSource {
    /// Whether this source handles `path`.
    fn supports(&self, path: &Path) -> bool;

    /// Read `path` into a document.
    fn acquire(&self, path: &Path) -> Result<DocumentInput>;
}

/// File name recorded in output records.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Pre-extracted JSON bundle written by an external layout or OCR tool.
///
/// ```json
/// { "pages": ["page one", "page two"], "tables": [[["Unit", null], ["kg", "2"]]] }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleSource;

#[derive(Deserialize)]
struct Bundle {
    #[serde(default)]
    pages: Vec<String>,
    #[serde(default)]
    tables: Vec<RawTable>,
}

impl BundleSource {
    /// Parse bundle JSON for the document named `file_name`.
    pub fn parse(file_name: &str, json: &str) -> Result<DocumentInput> {
        let bundle: Bundle = serde_json::from_str(json)
            .map_err(|e| ExtractionError::InvalidBundle(format!("{}: {}", file_name, e)))?;
        Ok(DocumentInput::new(file_name, bundle.pages, bundle.tables))
    }
}

impl DocumentSource for BundleSource {
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, "json")
    }

    fn acquire(&self, path: &Path) -> Result<DocumentInput> {
        let content = fs::read_to_string(path)?;
        let document = Self::parse(&file_name_of(path), &content)?;
        debug!(
            "Loaded bundle {}: {} pages, {} tables",
            path.display(),
            document.pages.len(),
            document.tables.len()
        );
        Ok(document)
    }
}

/// Embedded PDF text. Yields no tables.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Default)]
pub struct PdfSource {
    config: PdfConfig,
}

#[cfg(feature = "pdf")]
impl PdfSource {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "pdf")]
impl DocumentSource for PdfSource {
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, "pdf")
    }

    fn acquire(&self, path: &Path) -> Result<DocumentInput> {
        let data = fs::read(path)?;
        let mut extractor = PdfExtractor::new();
        extractor.load(&data)?;

        let mut pages = extractor.extract_pages(self.config.max_pages)?;
        let text_len: usize = pages.iter().map(|p| p.chars().count()).sum();
        if text_len < self.config.min_text_length {
            debug!(
                "{} has {} characters of embedded text, treating as textless",
                path.display(),
                text_len
            );
            pages.clear();
        }

        Ok(DocumentInput::new(file_name_of(path), pages, Vec::new()))
    }
}

/// Dispatches on file extension to the bundle or PDF source.
#[derive(Debug, Clone, Default)]
pub struct AnySource {
    bundle: BundleSource,
    #[cfg(feature = "pdf")]
    pdf: PdfSource,
}

impl AnySource {
    #[cfg_attr(not(feature = "pdf"), allow(unused_variables))]
    pub fn new(config: PdfConfig) -> Self {
        Self {
            bundle: BundleSource,
            #[cfg(feature = "pdf")]
            pdf: PdfSource::new(config),
        }
    }
}

impl DocumentSource for AnySource {
    fn supports(&self, path: &Path) -> bool {
        #[cfg(feature = "pdf")]
        {
            if self.pdf.supports(path) {
                return true;
            }
        }
        self.bundle.supports(path)
    }

    fn acquire(&self, path: &Path) -> Result<DocumentInput> {
        #[cfg(feature = "pdf")]
        {
            if self.pdf.supports(path) {
                return self.pdf.acquire(path);
            }
        }
        if self.bundle.supports(path) {
            return self.bundle.acquire(path);
        }
        Err(EnvoiceError::UnsupportedFormat(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bundle() {
        let doc = BundleSource::parse(
            "a.json",
            r#"{"pages": ["Số (No.): 1"], "tables": [[["Đơn vị tính\n(Unit)", null], ["kg", ""]]]}"#,
        )
        .unwrap();

        assert_eq!(doc.file_name, "a.json");
        assert_eq!(doc.pages, ["Số (No.): 1"]);
        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].data_rows().len(), 1);
    }

    #[test]
    fn test_bundle_sections_are_optional() {
        let doc = BundleSource::parse("b.json", "{}").unwrap();
        assert!(doc.pages.is_empty());
        assert!(doc.tables.is_empty());
    }

    #[test]
    fn test_invalid_bundle() {
        let err = BundleSource::parse("c.json", r#"{"pages": 3}"#).unwrap_err();
        assert!(matches!(
            err,
            EnvoiceError::Extraction(ExtractionError::InvalidBundle(msg)) if msg.starts_with("c.json")
        ));
    }

    #[test]
    fn test_acquire_bundle_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inv.JSON");
        fs::write(&path, r#"{"pages": ["x"]}"#).unwrap();

        let source = AnySource::default();
        assert!(source.supports(&path));
        let doc = source.acquire(&path).unwrap();
        assert_eq!(doc.file_name, "inv.JSON");
    }

    #[test]
    fn test_unsupported_extension() {
        let source = AnySource::default();
        let path = Path::new("scan.tiff");
        assert!(!source.supports(path));
        assert!(matches!(source.acquire(path), Err(EnvoiceError::UnsupportedFormat(_))));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_pdf_source_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4 garbage").unwrap();

        let err = PdfSource::default().acquire(&path).unwrap_err();
        assert!(matches!(err, EnvoiceError::Pdf(_)));
    }
}
