//! Declarative form validation.
//!
//! Each mutating form has a [`Schema`] of field rules. Evaluation walks every
//! rule and collects every violation before failing, so a user fixing a form
//! sees all the problems at once instead of one per submission. Unknown
//! fields in the payload are ignored; only declared rules are checked.

use std::collections::BTreeMap;

use artecho_core::Category;

/// Submitted form fields, keyed by field name.
pub type FormPayload = BTreeMap<String, String>;

/// One or more validation violations for a payload.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{}", violations.join(", "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    /// A single-violation error, for typed parses outside schema evaluation.
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            violations: vec![message.into()],
        }
    }
}

/// Value constraint for a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Free-form text, no constraint beyond presence rules.
    Text,
    /// Decimal number within an optional inclusive range.
    Number { min: Option<f64> },
    /// Whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    /// One of a fixed set of values.
    OneOf(&'static [&'static str]),
}

/// Rule for one form field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    /// Whether the field must be present in the payload.
    pub required: bool,
    /// Whether a present-but-blank value is acceptable.
    pub allow_empty: bool,
    pub kind: FieldKind,
}

impl FieldRule {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: true,
            allow_empty: false,
            kind,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: false,
            allow_empty: true,
            kind,
        }
    }
}

/// A named set of field rules for one form.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub rules: Vec<FieldRule>,
}

impl Schema {
    /// Check a payload against every rule, collecting all violations.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violated rule.
    pub fn evaluate(&self, payload: &FormPayload) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        for rule in &self.rules {
            let value = payload.get(rule.name).map(|v| v.trim());

            let value = match value {
                None => {
                    if rule.required {
                        violations.push(format!("\"{}\" is required", rule.name));
                    }
                    continue;
                }
                Some("") => {
                    if !rule.allow_empty {
                        violations.push(format!("\"{}\" is not allowed to be empty", rule.name));
                    }
                    continue;
                }
                Some(v) => v,
            };

            match rule.kind {
                FieldKind::Text => {}
                FieldKind::Number { min } => match value.parse::<f64>() {
                    Ok(n) => {
                        if let Some(min) = min {
                            if n < min {
                                violations.push(format!(
                                    "\"{}\" must be greater than or equal to {min}",
                                    rule.name
                                ));
                            }
                        }
                    }
                    Err(_) => {
                        violations.push(format!("\"{}\" must be a number", rule.name));
                    }
                },
                FieldKind::Integer { min, max } => match value.parse::<i64>() {
                    Ok(n) => {
                        if n < min || n > max {
                            violations.push(format!(
                                "\"{}\" must be between {min} and {max}",
                                rule.name
                            ));
                        }
                    }
                    Err(_) => {
                        violations.push(format!("\"{}\" must be a whole number", rule.name));
                    }
                },
                FieldKind::OneOf(choices) => {
                    if !choices.contains(&value) {
                        violations.push(format!(
                            "\"{}\" must be one of [{}]",
                            rule.name,
                            choices.join(", ")
                        ));
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// Schema for the listing create/update forms.
#[must_use]
pub fn listing_schema() -> Schema {
    Schema {
        name: "listing",
        rules: vec![
            FieldRule::required("title", FieldKind::Text),
            FieldRule::required("artist", FieldKind::Text),
            FieldRule::required("category", FieldKind::OneOf(Category::names())),
            FieldRule::required("price", FieldKind::Number { min: Some(0.0) }),
            FieldRule::optional("medium", FieldKind::Text),
            FieldRule::optional("description", FieldKind::Text),
            FieldRule::optional("year_created", FieldKind::Integer { min: 0, max: 9999 }),
        ],
    }
}

/// Schema for the review form.
#[must_use]
pub fn review_schema() -> Schema {
    Schema {
        name: "review",
        rules: vec![
            FieldRule::required("comment", FieldKind::Text),
            FieldRule::required("rating", FieldKind::Integer { min: 1, max: 5 }),
        ],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> FormPayload {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn valid_listing() -> FormPayload {
        payload(&[
            ("title", "Starry Night"),
            ("artist", "V. van Gogh"),
            ("category", "Painting"),
            ("price", "1200.50"),
        ])
    }

    #[test]
    fn test_listing_schema_accepts_valid_payload() {
        assert!(listing_schema().evaluate(&valid_listing()).is_ok());
    }

    #[test]
    fn test_listing_schema_collects_every_violation() {
        let err = listing_schema()
            .evaluate(&payload(&[("category", "Fresco"), ("price", "-5")]))
            .unwrap_err();

        assert_eq!(err.violations.len(), 4);
        assert!(err.violations.iter().any(|v| v.contains("\"title\"")));
        assert!(err.violations.iter().any(|v| v.contains("\"artist\"")));
        assert!(err.violations.iter().any(|v| v.contains("\"category\"")));
        assert!(
            err.violations
                .iter()
                .any(|v| v == "\"price\" must be greater than or equal to 0")
        );
    }

    #[test]
    fn test_listing_schema_allows_blank_optional_fields() {
        let mut form = valid_listing();
        form.insert("medium".to_owned(), String::new());
        form.insert("description".to_owned(), "   ".to_owned());
        assert!(listing_schema().evaluate(&form).is_ok());
    }

    #[test]
    fn test_listing_schema_rejects_blank_required_field() {
        let mut form = valid_listing();
        form.insert("title".to_owned(), "   ".to_owned());
        let err = listing_schema().evaluate(&form).unwrap_err();
        assert_eq!(err.violations, vec!["\"title\" is not allowed to be empty"]);
    }

    #[test]
    fn test_listing_schema_ignores_undeclared_fields() {
        let mut form = valid_listing();
        form.insert("unexpected".to_owned(), "ignored".to_owned());
        assert!(listing_schema().evaluate(&form).is_ok());
    }

    #[test]
    fn test_review_schema_bounds_rating() {
        let err = review_schema()
            .evaluate(&payload(&[("comment", "Great"), ("rating", "6")]))
            .unwrap_err();
        assert_eq!(err.violations, vec!["\"rating\" must be between 1 and 5"]);

        assert!(
            review_schema()
                .evaluate(&payload(&[("comment", "Great"), ("rating", "5")]))
                .is_ok()
        );
    }

    #[test]
    fn test_review_schema_rejects_non_integer_rating() {
        let err = review_schema()
            .evaluate(&payload(&[("comment", "Great"), ("rating", "five")]))
            .unwrap_err();
        assert_eq!(err.violations, vec!["\"rating\" must be a whole number"]);
    }

    #[test]
    fn test_validation_error_display_joins_violations() {
        let err = ValidationError {
            violations: vec!["\"a\" is required".to_owned(), "\"b\" is required".to_owned()],
        };
        assert_eq!(err.to_string(), "\"a\" is required, \"b\" is required");
    }
}
