//! Synonym-driven scalar field extraction.

use tracing::debug;

use super::amounts::parse_amount;
use super::patterns::{compile_dictionary, label_value_pattern, SynonymPattern};
use super::Result;
use crate::models::{FieldMap, FieldValue, SynonymDictionary};

/// Canonical field holding the invoice total.
pub const DEFAULT_AMOUNT_FIELD: &str = "total_amount";

/// A labelled value found in normalized document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    /// Canonical field name.
    pub field: String,
    /// Synonym whose pattern matched.
    pub synonym: String,
    /// Captured value, first line only, trimmed.
    pub value: String,
    /// Byte span of the whole match in the searched text.
    pub position: (usize, usize),
}

/// Matches document-level fields against lower-cased text.
///
/// For each field the synonyms are tried in declared order and the first
/// one that matches anywhere wins; its earliest occurrence supplies the
/// value. Fields with no matching synonym are left out entirely.
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    patterns: Vec<SynonymPattern>,
    amount_field: Option<String>,
}

impl FieldMatcher {
    /// Compile the field dictionary. Values of [`DEFAULT_AMOUNT_FIELD`] are
    /// parsed as monetary amounts.
    pub fn new(dict: &SynonymDictionary) -> Result<Self> {
        Ok(Self {
            patterns: compile_dictionary(dict, label_value_pattern)?,
            amount_field: Some(DEFAULT_AMOUNT_FIELD.to_string()),
        })
    }

    /// Parse the value of `field` as a monetary amount instead.
    pub fn with_amount_field(mut self, field: impl Into<String>) -> Self {
        self.amount_field = Some(field.into());
        self
    }

    /// Keep every captured value as text.
    pub fn without_amount_field(mut self) -> Self {
        self.amount_field = None;
        self
    }

    /// Find the winning match for every field that has one.
    pub fn extract_matches(&self, normalized_text: &str) -> Vec<FieldMatch> {
        let mut matches: Vec<FieldMatch> = Vec::new();

        for pattern in &self.patterns {
            if matches.iter().any(|m| m.field == pattern.name) {
                continue;
            }

            let Some(caps) = pattern.regex.captures(normalized_text) else {
                continue;
            };
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let value = first_line(value.as_str());
            debug!(
                "Matched {} via {:?} at {}: {:?}",
                pattern.name,
                pattern.synonym,
                whole.start(),
                value
            );

            matches.push(FieldMatch {
                field: pattern.name.clone(),
                synonym: pattern.synonym.clone(),
                value: value.to_string(),
                position: (whole.start(), whole.end()),
            });
        }

        matches
    }

    /// Extract the field map from normalized text.
    pub fn extract(&self, normalized_text: &str) -> FieldMap {
        self.to_field_map(&self.extract_matches(normalized_text))
    }

    /// Turn winning matches into field values, parsing the amount field.
    pub fn to_field_map(&self, matches: &[FieldMatch]) -> FieldMap {
        matches
            .iter()
            .map(|m| {
                let value = if self.amount_field.as_deref() == Some(m.field.as_str()) {
                    parse_amount(&m.value)
                } else {
                    FieldValue::Text(m.value.clone())
                };
                (m.field.clone(), value)
            })
            .collect()
    }
}

/// Text before the first line break, trimmed.
fn first_line(value: &str) -> &str {
    value
        .trim()
        .split(['\n', '\r'])
        .next()
        .unwrap_or_default()
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::normalize::normalize_text;
    use crate::models::SynonymEntry;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "HÓA ĐƠN GIÁ TRỊ GIA TĂNG
Ký hiệu (Serial): 1C24TAA
Số (No.): 0000123
Đơn vị bán hàng (Seller): CÔNG TY TNHH ABC
Mã số thuế (Tax code): 0101234567
Tên đơn vị (Company name): CÔNG TY CP XYZ
Tổng cộng tiền thanh toán (Total payment): 1.234.567
";

    fn matcher() -> FieldMatcher {
        FieldMatcher::new(&SynonymDictionary::invoice_fields()).unwrap()
    }

    #[test]
    fn test_extract_invoice_fields() {
        let fields = matcher().extract(&normalize_text(INVOICE));

        assert_eq!(fields.get("invoice_number"), Some(&FieldValue::from("0000123")));
        assert_eq!(fields.get("seller_company"), Some(&FieldValue::from("công ty tnhh abc")));
        assert_eq!(fields.get("buyer_company"), Some(&FieldValue::from("công ty cp xyz")));
        assert_eq!(fields.get("tax_code"), Some(&FieldValue::from("0101234567")));
        assert_eq!(fields.get("total_amount"), Some(&FieldValue::Number(1234567.0)));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let fields = matcher().extract(&normalize_text(INVOICE));
        assert!(!fields.contains_key("date"));
        assert_eq!(fields.len(), 5);

        let empty = matcher().extract("");
        assert!(empty.is_empty());
    }

    #[test]
    fn test_first_declared_synonym_wins() {
        let dict = SynonymDictionary::new(vec![SynonymEntry::new(
            "date",
            ["Invoice Date", "Issue Date"],
        )]);
        let matcher = FieldMatcher::new(&dict).unwrap();

        // The second synonym appears earlier in the text.
        let text = "issue date: 2024-01-01\ninvoice date: 2024-02-02";
        let matches = matcher.extract_matches(text);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].synonym, "Invoice Date");
        assert_eq!(matches[0].value, "2024-02-02");
    }

    #[test]
    fn test_first_occurrence_is_used() {
        let text = "số (no.): 0000001\nsố (no.): 0000002";
        let fields = matcher().extract(text);
        assert_eq!(fields.get("invoice_number"), Some(&FieldValue::from("0000001")));
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let text = "mã số thuế (tax code): 1\nsố (no.): 2";
        let fields = matcher().extract(text);
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["invoice_number", "tax_code"]);
    }

    #[test]
    fn test_value_on_following_line() {
        let text = "đơn vị bán hàng (seller):\ncông ty abc\nđịa chỉ: hà nội";
        let fields = matcher().extract(text);
        assert_eq!(fields.get("seller_company"), Some(&FieldValue::from("công ty abc")));
    }

    #[test]
    fn test_amount_without_digits_stays_text() {
        let text = "tổng cộng tiền thanh toán (total payment): chưa xác định";
        let fields = matcher().extract(text);
        assert_eq!(fields.get("total_amount"), Some(&FieldValue::from("chưa xác định")));
    }

    #[test]
    fn test_total_amount_parsed_by_default() {
        let fields = matcher().extract("tổng cộng tiền thanh toán (total payment): 1.234.567");
        assert_eq!(fields.get("total_amount"), Some(&FieldValue::Number(1234567.0)));
    }

    #[test]
    fn test_amount_field_override_and_disable() {
        let text = "tổng cộng tiền thanh toán (total payment): 1.000\nsố (no.): 0.042";

        let plain = matcher().without_amount_field();
        let fields = plain.extract(text);
        assert_eq!(fields.get("total_amount"), Some(&FieldValue::from("1.000")));

        let renamed = matcher().with_amount_field("invoice_number");
        let fields = renamed.extract(text);
        assert_eq!(fields.get("invoice_number"), Some(&FieldValue::Number(42.0)));
        assert_eq!(fields.get("total_amount"), Some(&FieldValue::from("1.000")));
    }

    #[test]
    fn test_first_line_strips_carriage_return() {
        assert_eq!(first_line("  abc \r"), "abc");
        assert_eq!(first_line("abc\ndef"), "abc");
    }
}
