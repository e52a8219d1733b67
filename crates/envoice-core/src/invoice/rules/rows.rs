//! Table row decoding.

use tracing::trace;

use crate::models::{cell_has_text, ColumnMapping, RawTable, RowRecord};

/// Decode the data rows of `table` through `mapping`.
///
/// Rows whose cells are all empty are dropped. In the remaining rows only
/// mapped, non-empty cells are kept.
pub fn decode_rows(table: &RawTable, mapping: &ColumnMapping) -> Vec<RowRecord> {
    let mut records = Vec::new();

    for (offset, row) in table.data_rows().iter().enumerate() {
        if !row.iter().any(cell_has_text) {
            trace!("Skipping blank row {}", offset + 1);
            continue;
        }

        let record: RowRecord = mapping
            .iter()
            .filter_map(|(&index, column)| {
                row.get(index)
                    .and_then(|cell| cell.as_deref())
                    .filter(|cell| !cell.is_empty())
                    .map(|cell| (column.clone(), cell.to_string()))
            })
            .collect();

        records.push(record);
    }

    records
}
