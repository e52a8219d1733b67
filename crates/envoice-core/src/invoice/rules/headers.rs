//! Table header canonicalization.

use tracing::{debug, trace};

use super::patterns::{compile_dictionary, header_pattern, SynonymPattern};
use super::Result;
use crate::models::{ColumnMapping, SynonymDictionary};

/// Maps table header cells to canonical column names.
///
/// Matching is an unanchored, case-insensitive literal search. The first
/// (column, synonym) pair in declaration order that hits a header claims
/// that column index, even when a later pair would be a longer match.
#[derive(Debug, Clone)]
pub struct HeaderMapper {
    patterns: Vec<SynonymPattern>,
}

impl HeaderMapper {
    /// Compile the column dictionary.
    pub fn new(dict: &SynonymDictionary) -> Result<Self> {
        Ok(Self {
            patterns: compile_dictionary(dict, header_pattern)?,
        })
    }

    /// Build the column mapping for a header row. Empty and unmatched
    /// headers are omitted.
    pub fn map_headers(&self, headers: &[Option<String>]) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();

        for (index, header) in headers.iter().enumerate() {
            let Some(header) = header.as_deref().filter(|h| !h.is_empty()) else {
                continue;
            };
            let header = header.trim();

            match self.patterns.iter().find(|p| p.regex.is_match(header)) {
                Some(pattern) => {
                    debug!("Column {} {:?} -> {}", index, header, pattern.name);
                    mapping.insert(index, pattern.name.clone());
                }
                None => trace!("Column {} {:?} has no matching synonym", index, header),
            }
        }

        mapping
    }
}
