//! Monetary amount post-processing.

use tracing::trace;

use super::patterns::AMOUNT_RUN;
use crate::models::FieldValue;

/// Parse a captured amount such as `"1.234.567 vnd"`.
///
/// Thousands separators (both `,` and `.`) are dropped first, so the
/// result is always a whole number. When no digits are present, or the
/// number overflows `f64`, the raw capture is kept unchanged.
pub fn parse_amount(raw: &str) -> FieldValue {
    let cleaned = raw.replace([',', '.'], "");

    let parsed = AMOUNT_RUN
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|amount| amount.is_finite());

    match parsed {
        Some(amount) => FieldValue::Number(amount),
        None => {
            trace!("No numeric literal in amount {:?}, keeping raw text", raw);
            FieldValue::Text(raw.to_string())
        }
    }
}
