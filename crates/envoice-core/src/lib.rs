//! Core library for invoice field extraction.
//!
//! This crate provides:
//! - Synonym-driven label matching for document-level invoice fields
//! - Table header canonicalization and line-item row decoding
//! - Flattening of fields and line items into spreadsheet-ready records
//! - Document acquisition from PDF text and pre-extracted JSON bundles

pub mod error;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod source;

pub use error::{EnvoiceError, ExtractionError, PdfError, Result};
pub use invoice::rules::{
    decode_rows, normalize_text, parse_amount, FieldMatch, FieldMatcher, HeaderMapper,
};
pub use invoice::{merge, BatchReport, DocumentInput, DocumentReport, ExtractionResult, InvoiceEngine};
pub use models::{
    CombinedRecord, ColumnMapping, EnvoiceConfig, FieldMap, FieldValue, OutputSet, RawTable,
    RowRecord, SynonymDictionary, SynonymEntry,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use source::{AnySource, BundleSource, DocumentSource};
#[cfg(feature = "pdf")]
pub use source::PdfSource;
