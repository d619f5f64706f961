//! Small text helpers shared by the sub-parsers.

/// Splits off the first run of non-whitespace.
///
/// Leading whitespace is skipped. The remainder keeps its own leading
/// whitespace (including newlines) so multi-line arguments survive; it is
/// `None` when nothing follows the head.
#[must_use]
pub fn split_head(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map_or(trimmed.len(), |(i, _)| i);
    let (head, rest) = trimmed.split_at(end);
    (head, (!rest.is_empty()).then_some(rest))
}

/// Trims spaces and tabs from both ends, keeping newlines.
#[must_use]
pub fn trim_spaces(text: &str) -> &str {
    text.trim_matches(|c| c == ' ' || c == '\t')
}

/// Normalizes command arguments: spaces are trimmed and empty becomes `None`.
#[must_use]
pub fn normalize_rest(rest: Option<&str>) -> Option<&str> {
    rest.map(trim_spaces).filter(|r| !r.is_empty())
}
