//! Error types for the envoice-core library.

use thiserror::Error;

/// Main error type for the envoice library.
#[derive(Error, Debug)]
pub enum EnvoiceError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Synonym table or document bundle error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// No acquisition adapter handles this file.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while compiling synonym tables or reading document bundles.
///
/// Missing fields, unmatched headers and unparsable amounts are not errors;
/// they simply leave keys out of the output.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A synonym could not be turned into a search pattern.
    #[error("invalid pattern for {name} synonym {synonym:?}: {source}")]
    Pattern {
        name: String,
        synonym: String,
        #[source]
        source: regex::Error,
    },

    /// A synonym list contains an empty or whitespace-only entry.
    #[error("empty synonym for {0}")]
    EmptySynonym(String),

    /// The same canonical name is declared twice in one dictionary.
    #[error("duplicate canonical name: {0}")]
    DuplicateName(String),

    /// A pre-extracted document bundle is malformed.
    #[error("invalid document bundle: {0}")]
    InvalidBundle(String),
}

/// Result type for the envoice library.
pub type Result<T> = std::result::Result<T, EnvoiceError>;
