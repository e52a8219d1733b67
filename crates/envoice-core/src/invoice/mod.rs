//! Invoice field extraction and record flattening.

mod batch;
mod engine;
mod merge;
pub mod rules;

pub use batch::{process_file, BatchReport, DocumentReport};
pub use engine::{DocumentInput, ExtractionResult, InvoiceEngine};
pub use merge::merge;
