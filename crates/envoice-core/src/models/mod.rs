//! Data models: configuration, synonym dictionaries, tables, and extracted records.

pub mod config;
pub mod record;
pub mod synonyms;
pub mod table;

pub use config::{BatchConfig, EnvoiceConfig, ExtractionConfig, PdfConfig};
pub use record::{
    CellRef, CombinedRecord, FieldMap, FieldValue, OutputSet, Record, RowRecord, FILE_NAME_KEY,
};
pub use synonyms::{SynonymDictionary, SynonymEntry};
pub use table::{cell_has_text, ColumnMapping, RawTable};
