//! Extracted values and the flattened records handed to exporters.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// Key under which the source document name is stored in every record.
pub const FILE_NAME_KEY: &str = "file_name";

/// A scalar value extracted from document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Parsed monetary amount.
    Number(f64),
    /// Raw captured text.
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Insertion-ordered map with at most one value per key.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V> {
    entries: Vec<(String, V)>,
}

/// Document-level scalar fields, in canonical declaration order.
pub type FieldMap = Record<FieldValue>;

/// One decoded line-item row, in table column order.
pub type RowRecord = Record<String>;

impl<V> Record<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert a value, replacing any previous value for the key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for Record<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Record<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<V: Serialize> Serialize for Record<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Borrowed view of a single value in a [`CombinedRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef<'a> {
    /// Document-level field value.
    Field(&'a FieldValue),
    /// Table cell or file name.
    Text(&'a str),
}

impl CellRef<'_> {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Field(v) => v.as_str(),
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for CellRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(v) => v.fmt(f),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CellRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(v) => v.serialize(serializer),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One flattened output row: document fields, at most one line item, and
/// the source file name.
///
/// Key precedence on collision is row, then file name, then document
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRecord {
    pub file_name: String,
    pub fields: FieldMap,
    pub row: Option<RowRecord>,
}

impl CombinedRecord {
    pub fn new(file_name: impl Into<String>, fields: FieldMap, row: Option<RowRecord>) -> Self {
        Self {
            file_name: file_name.into(),
            fields,
            row,
        }
    }

    pub fn get(&self, key: &str) -> Option<CellRef<'_>> {
        if let Some(v) = self.row.as_ref().and_then(|r| r.get(key)) {
            return Some(CellRef::Text(v));
        }
        if key == FILE_NAME_KEY {
            return Some(CellRef::Text(&self.file_name));
        }
        self.fields.get(key).map(CellRef::Field)
    }

    /// All visible entries: fields, then file name, then row cells.
    pub fn entries(&self) -> Vec<(&str, CellRef<'_>)> {
        let row_has = |key: &str| self.row.as_ref().is_some_and(|r| r.contains_key(key));

        let mut out = Vec::with_capacity(self.fields.len() + 1 + self.row.as_ref().map_or(0, |r| r.len()));
        for (k, v) in self.fields.iter() {
            if k != FILE_NAME_KEY && !row_has(k) {
                out.push((k, CellRef::Field(v)));
            }
        }
        if !row_has(FILE_NAME_KEY) {
            out.push((FILE_NAME_KEY, CellRef::Text(&self.file_name)));
        }
        if let Some(row) = &self.row {
            out.extend(row.iter().map(|(k, v)| (k, CellRef::Text(v.as_str()))));
        }
        out
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }
}

impl Serialize for CombinedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            map.serialize_entry(k, &v)?;
        }
        map.end()
    }
}

/// All records across a batch, in document order then row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSet {
    records: Vec<CombinedRecord>,
}

impl OutputSet {
    pub fn new(records: Vec<CombinedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CombinedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CombinedRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Union of record keys in order of first appearance.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        columns
    }

    /// Records as string cells aligned to [`OutputSet::columns`]; missing
    /// keys become empty cells.
    pub fn to_rows(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let columns = self.columns();
        let rows = self
            .records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        (columns, rows)
    }
}

impl Extend<CombinedRecord> for OutputSet {
    fn extend<T: IntoIterator<Item = CombinedRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl Serialize for OutputSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields() -> FieldMap {
        [("invoice_number", FieldValue::from("inv-1")), ("total_amount", FieldValue::from(1500.0))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut row = RowRecord::new();
        row.insert("Unit", "kg".to_string());
        row.insert("Quantity", "5".to_string());
        assert_eq!(row.insert("Unit", "box".to_string()), Some("kg".to_string()));
        assert_eq!(row.keys().collect::<Vec<_>>(), ["Unit", "Quantity"]);
        assert_eq!(row.get("Unit").map(String::as_str), Some("box"));
    }

    #[test]
    fn test_combined_entries_order() {
        let row: RowRecord = [("Unit", "kg".to_string())].into_iter().collect();
        let record = CombinedRecord::new("a.pdf", fields(), Some(row));
        assert_eq!(record.keys(), ["invoice_number", "total_amount", "file_name", "Unit"]);
        assert_eq!(record.get("file_name").map(|v| v.to_string()), Some("a.pdf".to_string()));
    }

    #[test]
    fn test_row_keys_override_fields() {
        let row: RowRecord = [("invoice_number", "from-row".to_string())].into_iter().collect();
        let record = CombinedRecord::new("a.pdf", fields(), Some(row));

        assert_eq!(record.get("invoice_number"), Some(CellRef::Text("from-row")));
        assert_eq!(record.keys(), ["total_amount", "file_name", "invoice_number"]);
    }

    #[test]
    fn test_serialize_flat_record() {
        let record = CombinedRecord::new("a.pdf", fields(), None);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"invoice_number":"inv-1","total_amount":1500.0,"file_name":"a.pdf"}"#
        );
    }

    #[test]
    fn test_output_set_rows_fill_missing_cells() {
        let row: RowRecord = [("Unit", "kg".to_string())].into_iter().collect();
        let set = OutputSet::new(vec![
            CombinedRecord::new("a.pdf", fields(), Some(row)),
            CombinedRecord::new("b.pdf", FieldMap::new(), None),
        ]);

        let (columns, rows) = set.to_rows();
        assert_eq!(columns, ["invoice_number", "total_amount", "file_name", "Unit"]);
        assert_eq!(rows[0], ["inv-1", "1500", "a.pdf", "kg"]);
        assert_eq!(rows[1], ["", "", "b.pdf", ""]);
    }
}
