//! Flattening of document fields and line items into output records.

use crate::models::{CombinedRecord, FieldMap, RowRecord};

/// Expand one document into its output records.
///
/// Each row yields one record repeating the document fields. A document
/// without rows yields a single field-only record.
pub fn merge(fields: FieldMap, rows: Vec<RowRecord>, file_name: &str) -> Vec<CombinedRecord> {
    if rows.is_empty() {
        return vec![CombinedRecord::new(file_name, fields, None)];
    }

    rows.into_iter()
        .map(|row| CombinedRecord::new(file_name, fields.clone(), Some(row)))
        .collect()
}
