//! Raw tables as delivered by document acquisition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column index to canonical column name.
pub type ColumnMapping = BTreeMap<usize, String>;

/// A table region: row 0 holds headers, the rest are data rows.
///
/// Cells may be missing (`None`), which acquisition tools emit for merged
/// or undetected cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build a table from non-null string cells.
    pub fn from_strings<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|c| Some(c.into())).collect())
                .collect(),
        )
    }

    /// Header row, empty if the table has no rows at all.
    pub fn headers(&self) -> &[Option<String>] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows after the header row.
    pub fn data_rows(&self) -> &[Vec<Option<String>>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Whether a cell carries any text. Whitespace-only cells count as text.
pub fn cell_has_text(cell: &Option<String>) -> bool {
    cell.as_deref().is_some_and(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_and_data_rows() {
        let table = RawTable::from_strings([["a", "b"], ["1", "2"], ["3", "4"]]);
        assert_eq!(table.headers().len(), 2);
        assert_eq!(table.data_rows().len(), 2);

        let empty = RawTable::default();
        assert!(empty.headers().is_empty());
        assert!(empty.data_rows().is_empty());
    }

    #[test]
    fn test_deserialize_with_null_cells() {
        let table: RawTable = serde_json::from_str(r#"[["Unit", null], ["kg", ""]]"#).unwrap();
        assert_eq!(table.headers(), &[Some("Unit".to_string()), None]);
        assert!(!cell_has_text(&table.data_rows()[0][1]));
        assert!(cell_has_text(&table.data_rows()[0][0]));
    }
}
