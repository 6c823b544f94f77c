use crate::models::AuthorRecord;

/// Serializes author records as pretty-printed JSON
///
/// Dates are written as `YYYY-MM-DD`; a missing Twitter handle is `null`.
pub fn to_json(authors: &[AuthorRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(authors)
}
