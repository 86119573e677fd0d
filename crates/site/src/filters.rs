//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Truncates text to `limit` characters, appending an ellipsis when cut.
///
/// Usage in templates: `{{ listing.description|truncate_chars(140) }}`
#[askama::filter_fn]
pub fn truncate_chars(
    value: impl Display,
    _env: &dyn askama::Values,
    limit: usize,
) -> askama::Result<String> {
    Ok(truncate_to(&value.to_string(), limit))
}

fn truncate_to(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    format!("{}\u{2026}", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_leaves_short_text_alone() {
        assert_eq!(truncate_to("brief", 10), "brief");
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        let out = truncate_to("a rather long description", 10);
        assert!(out.ends_with('\u{2026}'));
        assert!(out.chars().count() <= 10);
    }
}
