//! Search pattern construction for synonym labels.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::error::ExtractionError;
use crate::models::SynonymDictionary;

lazy_static! {
    // First run of ASCII digits and dots in a cleaned amount
    pub static ref AMOUNT_RUN: Regex = Regex::new(r"[0-9.]+").unwrap();
}

/// One (canonical name, synonym, compiled pattern) triple.
#[derive(Debug, Clone)]
pub struct SynonymPattern {
    pub name: String,
    pub synonym: String,
    pub regex: Regex,
}

/// Compile every synonym of `dict` in declaration order, name by name.
pub fn compile_dictionary<F>(
    dict: &SynonymDictionary,
    build: F,
) -> super::Result<Vec<SynonymPattern>>
where
    F: Fn(&str) -> Result<Regex, regex::Error>,
{
    dict.validate()?;

    let mut patterns = Vec::new();
    for entry in dict.entries() {
        for synonym in &entry.synonyms {
            let regex = build(synonym).map_err(|source| ExtractionError::Pattern {
                name: entry.name.clone(),
                synonym: synonym.clone(),
                source,
            })?;
            patterns.push(SynonymPattern {
                name: entry.name.clone(),
                synonym: synonym.clone(),
                regex,
            });
        }
    }
    Ok(patterns)
}

/// Pattern for a labelled value in lower-cased text.
///
/// Whitespace inside the label matches any run of whitespace, including
/// none, so labels wrapped across lines still hit. An optional colon may
/// follow; group 1 captures the rest of the line.
pub fn label_value_pattern(synonym: &str) -> Result<Regex, regex::Error> {
    let label = synonym
        .to_lowercase()
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*");
    Regex::new(&format!(r"{}:?\s*(.+)", label))
}

/// Case-insensitive, unanchored literal pattern for a table header.
pub fn header_pattern(synonym: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(synonym))
        .case_insensitive(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_pattern_tolerates_wrapped_labels() {
        let re = label_value_pattern("Mã số thuế (Tax code)").unwrap();
        let caps = re.captures("mã số\nthuế (tax  code): 0101234567").unwrap();
        assert_eq!(&caps[1], "0101234567");
    }

    #[test]
    fn test_label_pattern_escapes_metacharacters() {
        let re = label_value_pattern("Số (No.)").unwrap();
        assert!(re.is_match("số (no.): 0000123"));
        assert!(!re.is_match("số (nox): 0000123"));
    }

    #[test]
    fn test_label_pattern_is_case_sensitive_on_normalized_text() {
        let re = label_value_pattern("Date").unwrap();
        assert!(re.is_match("date: 01/02/2024"));
        assert!(!re.is_match("DATE: 01/02/2024"));
    }

    #[test]
    fn test_header_pattern_unanchored_and_case_insensitive() {
        let re = header_pattern("Đơn vị tính\n(Unit)").unwrap();
        assert!(re.is_match("STT  đơn vị tính\n(unit) "));
        assert!(!re.is_match("Đơn vị tính (Unit)"));
    }

    #[test]
    fn test_compile_dictionary_keeps_order() {
        let patterns =
            compile_dictionary(&SynonymDictionary::invoice_fields(), label_value_pattern).unwrap();
        let names: Vec<_> = patterns.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"invoice_number"));
        assert_eq!(names.iter().filter(|n| **n == "date").count(), 5);
        assert_eq!(patterns.len(), 11);
    }
}
