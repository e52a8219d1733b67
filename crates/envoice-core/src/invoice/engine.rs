//! Per-document extraction pipeline and batch flattening.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::merge::merge;
use super::rules::{decode_rows, join_pages, normalize_text, FieldMatch, FieldMatcher, HeaderMapper};
use crate::error::EnvoiceError;
use crate::models::{
    CombinedRecord, ExtractionConfig, FieldMap, OutputSet, RawTable, RowRecord, SynonymDictionary,
};

/// Raw content of one document as produced by acquisition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Name recorded in every output record.
    #[serde(default)]
    pub file_name: String,
    /// Page texts in reading order.
    #[serde(default)]
    pub pages: Vec<String>,
    /// Tables found in the document, in page order.
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

impl DocumentInput {
    pub fn new(file_name: impl Into<String>, pages: Vec<String>, tables: Vec<RawTable>) -> Self {
        Self {
            file_name: file_name.into(),
            pages,
            tables,
        }
    }

    /// A document whose acquisition produced nothing.
    pub fn empty(file_name: impl Into<String>) -> Self {
        Self::new(file_name, Vec::new(), Vec::new())
    }
}

/// Result of running the pipeline on one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Document-level fields.
    pub fields: FieldMap,
    /// Decoded line items from every table, in table then row order.
    pub rows: Vec<RowRecord>,
    /// Winning label matches, for diagnostics.
    pub matches: Vec<FieldMatch>,
    /// Non-fatal observations (missing fields, unmapped tables).
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Compiled synonym tables plus the pipeline that uses them.
///
/// Immutable once built and safe to share across worker threads.
#[derive(Debug, Clone)]
pub struct InvoiceEngine {
    fields: FieldMatcher,
    headers: HeaderMapper,
    field_names: Vec<String>,
    page_separator: String,
}

impl InvoiceEngine {
    /// Build an engine from explicit dictionaries with the default page
    /// separator and amount field.
    pub fn new(fields: &SynonymDictionary, columns: &SynonymDictionary) -> Result<Self, EnvoiceError> {
        Ok(Self {
            fields: FieldMatcher::new(fields)?,
            headers: HeaderMapper::new(columns)?,
            field_names: fields.names().map(String::from).collect(),
            page_separator: "\n".to_string(),
        })
    }

    /// Build an engine from the extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, EnvoiceError> {
        let mut engine = Self::new(&config.fields, &config.columns)?;
        engine.fields = if config.amount_field.is_empty() {
            engine.fields.without_amount_field()
        } else {
            engine.fields.with_amount_field(config.amount_field.clone())
        };
        engine.page_separator = config.page_separator.clone();
        Ok(engine)
    }

    /// Set the amount field.
    pub fn with_amount_field(mut self, field: impl Into<String>) -> Self {
        self.fields = self.fields.with_amount_field(field);
        self
    }

    /// Set the separator placed between pages.
    pub fn with_page_separator(mut self, separator: impl Into<String>) -> Self {
        self.page_separator = separator.into();
        self
    }

    /// Run normalization, field matching and table decoding on one document.
    pub fn extract(&self, document: &DocumentInput) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let text = normalize_text(&join_pages(&document.pages, &self.page_separator));
        let matches = self.fields.extract_matches(&text);
        let fields = self.fields.to_field_map(&matches);

        for name in &self.field_names {
            if !fields.contains_key(name) {
                warnings.push(format!("No label found for {}", name));
            }
        }

        let mut rows = Vec::new();
        for (index, table) in document.tables.iter().enumerate() {
            let mapping = self.headers.map_headers(table.headers());
            if mapping.is_empty() {
                warnings.push(format!("Table {} has no recognised columns", index + 1));
            }
            let decoded = decode_rows(table, &mapping);
            debug!(
                "Table {} of {}: {} mapped columns, {} rows",
                index + 1,
                document.file_name,
                mapping.len(),
                decoded.len()
            );
            rows.extend(decoded);
        }

        ExtractionResult {
            fields,
            rows,
            matches,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Full per-document pipeline: extract then flatten.
    pub fn process(&self, document: &DocumentInput) -> Vec<CombinedRecord> {
        let result = self.extract(document);
        info!(
            "Processed {}: {} fields, {} line items",
            document.file_name,
            result.fields.len(),
            result.rows.len()
        );
        merge(result.fields, result.rows, &document.file_name)
    }

    /// Flatten every document in order on the global worker pool.
    ///
    /// Output order is document order, then row order, regardless of which
    /// worker finished first.
    pub fn merge_all(&self, documents: &[DocumentInput]) -> OutputSet {
        let per_document: Vec<Vec<CombinedRecord>> =
            documents.par_iter().map(|doc| self.process(doc)).collect();
        OutputSet::new(per_document.into_iter().flatten().collect())
    }

    /// Like [`InvoiceEngine::merge_all`] with a dedicated pool of `jobs`
    /// workers; `jobs <= 1` runs on the calling thread.
    pub fn merge_all_with_jobs(
        &self,
        documents: &[DocumentInput],
        jobs: usize,
    ) -> Result<OutputSet, EnvoiceError> {
        if jobs <= 1 {
            let mut output = OutputSet::default();
            for doc in documents {
                output.extend(self.process(doc));
            }
            return Ok(output);
        }

        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        Ok(pool.install(|| self.merge_all(documents)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellRef, FieldValue, SynonymEntry};
    use pretty_assertions::assert_eq;

    fn engine() -> InvoiceEngine {
        InvoiceEngine::from_config(&ExtractionConfig::default()).unwrap()
    }

    fn line_items() -> RawTable {
        RawTable::from_strings([
            ["STT", "Tên hàng hóa, dịch vụ\n(Name of goods, services)", "Đơn vị tính\n(Unit)", "Thành tiền\n(Amount)"],
            ["1", "Giấy A4", "Ram", "500.000"],
            ["", "", "", ""],
            ["2", "Bút bi", "Hộp", "120.000"],
        ])
    }

    fn document(name: &str, number: &str, tables: Vec<RawTable>) -> DocumentInput {
        DocumentInput::new(
            name,
            vec![
                format!("HÓA ĐƠN\nSố (No.): {}", number),
                "Tổng cộng tiền thanh toán (Total payment): 620.000".to_string(),
            ],
            tables,
        )
    }

    #[test]
    fn test_pages_are_joined_before_matching() {
        let result = engine().extract(&document("a.pdf", "0000042", Vec::new()));

        assert_eq!(result.fields.get("invoice_number"), Some(&FieldValue::from("0000042")));
        assert_eq!(result.fields.get("total_amount"), Some(&FieldValue::Number(620000.0)));
        assert!(result.warnings.iter().any(|w| w.contains("seller_company")));
    }

    #[test]
    fn test_process_fans_out_line_items() {
        let records = engine().process(&document("a.pdf", "0000042", vec![line_items()]));

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].keys(),
            ["invoice_number", "total_amount", "file_name", "Name of goods, services", "Unit", "Amount"]
        );
        assert_eq!(records[1].get("Unit").map(|v| v.to_string()), Some("Hộp".to_string()));
        assert_eq!(
            records[1].get("invoice_number").map(|v| v.to_string()),
            Some("0000042".to_string())
        );
    }

    #[test]
    fn test_rows_from_multiple_tables_are_concatenated() {
        let second = RawTable::from_strings([["Đơn vị tính\n(Unit)"], ["Cái"]]);
        let result = engine().extract(&document("a.pdf", "1", vec![line_items(), second]));

        let units: Vec<_> = result.rows.iter().filter_map(|r| r.get("Unit").cloned()).collect();
        assert_eq!(units, ["Ram", "Hộp", "Cái"]);
    }

    #[test]
    fn test_unrecognised_table_falls_back_to_field_record() {
        let table = RawTable::from_strings([["Foo", "Bar"], ["1", "2"]]);
        let records = engine().process(&document("a.pdf", "1", vec![table]));

        // The row is not blank, so it survives as an empty line item.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keys(), ["invoice_number", "total_amount", "file_name"]);
    }

    #[test]
    fn test_empty_document_yields_file_name_only() {
        let records = engine().process(&DocumentInput::empty("broken.pdf"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keys(), ["file_name"]);
    }

    #[test]
    fn test_merge_all_preserves_document_order() {
        let docs: Vec<_> = (0..32)
            .map(|i| document(&format!("{:02}.pdf", i), &format!("{:07}", i), vec![line_items()]))
            .collect();

        let output = engine().merge_all_with_jobs(&docs, 4).unwrap();
        assert_eq!(output.len(), 64);

        let names: Vec<_> = output.records().iter().map(|r| r.file_name.clone()).collect();
        let expected: Vec<_> = (0..32)
            .flat_map(|i| [format!("{:02}.pdf", i), format!("{:02}.pdf", i)])
            .collect();
        assert_eq!(names, expected);

        let sequential = engine().merge_all_with_jobs(&docs, 1).unwrap();
        assert_eq!(sequential, output);
    }

    #[test]
    fn test_new_engine_parses_total_amount() {
        let engine = InvoiceEngine::new(
            &SynonymDictionary::invoice_fields(),
            &SynonymDictionary::line_item_columns(),
        )
        .unwrap();
        let doc = DocumentInput::new(
            "a.pdf",
            vec!["Tổng cộng tiền thanh toán (Total payment): 1.234.567".to_string()],
            Vec::new(),
        );

        let records = engine.process(&doc);
        assert_eq!(
            records[0].get("total_amount"),
            Some(CellRef::Field(&FieldValue::Number(1234567.0)))
        );
    }

    #[test]
    fn test_empty_amount_field_keeps_text() {
        let config = ExtractionConfig {
            amount_field: String::new(),
            ..ExtractionConfig::default()
        };
        let result = InvoiceEngine::from_config(&config)
            .unwrap()
            .extract(&document("a.pdf", "1", Vec::new()));
        assert_eq!(result.fields.get("total_amount"), Some(&FieldValue::from("620.000")));
    }

    #[test]
    fn test_custom_dictionaries() {
        let fields = SynonymDictionary::new(vec![SynonymEntry::new("po", ["PO Number"])]);
        let columns = SynonymDictionary::new(vec![SynonymEntry::new("sku", ["SKU"])]);
        let engine = InvoiceEngine::new(&fields, &columns).unwrap();

        let doc = DocumentInput::new(
            "po.pdf",
            vec!["PO   Number: 7781".to_string()],
            vec![RawTable::from_strings([["Item SKU"], ["A-1"]])],
        );
        let records = engine.process(&doc);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("po").map(|v| v.to_string()), Some("7781".to_string()));
        assert_eq!(records[0].get("sku").map(|v| v.to_string()), Some("A-1".to_string()));
    }
}
