//! Families and categories.

use super::{CategoryId, FamilyId};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Scoping boundary for chores and completions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    /// URL-safe slug derived from `name`.
    pub code: String,
    pub created_at: NaiveDateTime,
}

/// Shared chore category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub ico: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Lowercase, dash-separated ASCII slug.
pub fn slugify(value: &str) -> String {
    let lowered = value.trim().to_ascii_lowercase();
    NON_SLUG_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  The Rossi  Family! "), "the-rossi-family");
        assert_eq!(slugify("---"), "");
    }
}
