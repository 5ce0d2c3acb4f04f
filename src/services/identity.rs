//! Deterministic identifiers derived from human-entered hierarchy fields.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::domain::UserRole;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN is a valid regex pattern"));

// ASCII alphanumerics, hyphen and the Hebrew block survive.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z0-9\-\x{0590}-\x{05FF}]").expect("DISALLOWED is a valid regex pattern")
});

/// Collapses whitespace runs into one hyphen, then strips every character
/// outside the allowed set.
pub fn sanitize_segment(value: &str) -> String {
    let hyphenated = WHITESPACE_RUN.replace_all(value, "-");
    DISALLOWED.replace_all(&hyphenated, "").into_owned()
}

/// `{school}_{grade}_{class_num}` with each segment sanitized. Total: empty
/// inputs give empty segments, so callers reject blanks beforehand.
pub fn derive_class_id(school_name: &str, grade: &str, class_num: &str) -> String {
    format!(
        "{}_{}_{}",
        sanitize_segment(school_name),
        sanitize_segment(grade),
        sanitize_segment(class_num)
    )
}

/// `{Role}-{class_id}-{display_name}`, e.g. `Student-Ort-High_ז_3-dana`.
pub fn derive_user_id(role: UserRole, class_id: &str, display_name: &str) -> String {
    format!(
        "{}-{}-{}",
        role.id_prefix(),
        class_id,
        sanitize_segment(display_name)
    )
}

/// Id of the seeded research manager, who lives outside any class.
pub fn manager_user_id(username: &str) -> String {
    format!("{}_{}", UserRole::ResearchManager.as_str(), username)
}
