//! Rule-based extraction steps: normalization, field and header matching,
//! row decoding.

pub mod amounts;
pub mod fields;
pub mod headers;
pub mod normalize;
pub mod patterns;
pub mod rows;

use crate::error::ExtractionError;

/// Result type for compiling rule tables.
pub type Result<T> = std::result::Result<T, ExtractionError>;

pub use amounts::parse_amount;
pub use fields::{FieldMatch, FieldMatcher, DEFAULT_AMOUNT_FIELD};
pub use headers::HeaderMapper;
pub use normalize::{join_pages, normalize_text};
pub use patterns::{compile_dictionary, header_pattern, label_value_pattern, SynonymPattern};
pub use rows::decode_rows;
