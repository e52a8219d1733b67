//! Text normalization ahead of label matching.

/// Lower-case text for case-insensitive matching.
///
/// No whitespace collapsing, diacritic stripping or locale-specific folding.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

/// Join page texts into one document string.
pub fn join_pages<S: AsRef<str>>(pages: &[S], separator: &str) -> String {
    pages
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<&str>>()
        .join(separator)
}
