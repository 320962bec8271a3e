//! Scope string parsing.

/// Split a space-separated scope string into scope tokens.
///
/// `None`, empty and whitespace-only input yield an empty vector. Tokens keep
/// their original order and duplicates are preserved.
#[must_use]
pub fn parse_scopes(scope: Option<&str>) -> Vec<String> {
    scope
        .map(|s| s.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}
