//! Synonym dictionaries mapping canonical names to observed label wordings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// One canonical name with its surface-form synonyms, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    /// Canonical field or column name written to the output.
    pub name: String,

    /// Label wordings seen in real documents. Earlier entries win.
    pub synonyms: Vec<String>,
}

impl SynonymEntry {
    pub fn new<I, S>(name: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            synonyms: synonyms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered canonical name to synonym list mapping.
///
/// Declaration order is significant: it is the tie-break order whenever two
/// entries could claim the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymDictionary {
    entries: Vec<SynonymEntry>,
}

impl SynonymDictionary {
    pub fn new(entries: Vec<SynonymEntry>) -> Self {
        Self { entries }
    }

    /// Default scalar fields for Vietnamese e-invoices.
    pub fn invoice_fields() -> Self {
        Self::new(vec![
            SynonymEntry::new("invoice_number", ["Số (No.)"]),
            SynonymEntry::new("seller_company", ["Đơn vị bán hàng (Seller)"]),
            SynonymEntry::new(
                "buyer_company",
                ["Tên đơn vị (Company's name)", "Tên đơn vị (Company name)"],
            ),
            SynonymEntry::new("tax_code", ["Mã số thuế (Tax code)"]),
            SynonymEntry::new("total_amount", ["Tổng cộng tiền thanh toán (Total payment)"]),
            SynonymEntry::new(
                "date",
                [
                    "Ngày phát hành",
                    "Ngày xuất hóa đơn",
                    "Date",
                    "Invoice Date",
                    "Issue Date",
                ],
            ),
        ])
    }

    /// Default line-item table columns for Vietnamese e-invoices.
    pub fn line_item_columns() -> Self {
        Self::new(vec![
            SynonymEntry::new(
                "Name of goods, services",
                [
                    "Tên hàng hóa, dịch vụ\n(Name of goods, services)",
                    "Tên hàng hóa, dịch vụ\n(Description)",
                ],
            ),
            SynonymEntry::new("Unit", ["Đơn vị tính\n(Unit)"]),
            SynonymEntry::new("Quantity", ["Số lượng (Quantity)"]),
            SynonymEntry::new("Unit price", ["Đơn giá\n(Unit price)"]),
            SynonymEntry::new("Amount", ["Thành tiền\n(Amount)"]),
        ])
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    /// Canonical names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.synonyms.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject empty synonyms and repeated canonical names.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ExtractionError::DuplicateName(entry.name.clone()));
            }
            if entry.synonyms.iter().any(|s| s.trim().is_empty()) {
                return Err(ExtractionError::EmptySynonym(entry.name.clone()));
            }
        }
        Ok(())
    }
}
