//! Listing domain types.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use artecho_core::{Category, ListingId, Price, UserId};

use crate::pipeline::validate::{FormPayload, ValidationError};
use crate::models::review::ReviewWithAuthor;

/// An image hosted on the external media host.
///
/// Only the URL and the host's public id are persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    /// Public delivery URL.
    pub url: String,
    /// Media host identifier, kept for later replacement or deletion.
    pub public_id: String,
}

/// An art listing (domain type).
#[derive(Debug, Clone)]
pub struct Listing {
    /// Unique listing ID.
    pub id: ListingId,
    /// Title of the artwork.
    pub title: String,
    /// Name of the artist.
    pub artist: String,
    /// Category from the fixed enumeration.
    pub category: Category,
    /// Asking price (non-negative).
    pub price: Price,
    /// Medium, e.g. "Oil on Canvas".
    pub medium: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Year the artwork was created.
    pub year_created: Option<i32>,
    /// Uploaded image, if any.
    pub image: Option<ListingImage>,
    /// The user who listed the artwork.
    pub owner_id: UserId,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
}

/// A listing joined with its owner's name and its reviews, for the detail page.
#[derive(Debug, Clone)]
pub struct ListingDetail {
    pub listing: Listing,
    pub owner_name: String,
    pub reviews: Vec<ReviewWithAuthor>,
}

/// Validated listing fields from a submitted form.
///
/// Built only after the listing schema has accepted the payload; the typed
/// parses here re-check value constraints so a draft can never hold an
/// out-of-range price or unknown category.
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub title: String,
    pub artist: String,
    pub category: Category,
    pub price: Price,
    pub medium: Option<String>,
    pub description: Option<String>,
    pub year_created: i32,
}

impl ListingDraft {
    /// Build a draft from a validated form payload.
    ///
    /// An absent or empty year defaults to the current year, matching the
    /// behaviour of the listing form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any field fails its typed parse.
    pub fn from_payload(payload: &FormPayload) -> Result<Self, ValidationError> {
        let title = required(payload, "title")?;
        let artist = required(payload, "artist")?;
        let category: Category = required(payload, "category")?
            .parse()
            .map_err(|_| ValidationError::single("\"category\" is not a known category"))?;
        let price = Price::parse(&required(payload, "price")?)
            .map_err(|e| ValidationError::single(format!("\"price\" {e}")))?;

        let year_created = match optional(payload, "year_created") {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|_| ValidationError::single("\"year_created\" must be a whole number"))?,
            None => Utc::now().year(),
        };

        Ok(Self {
            title,
            artist,
            category,
            price,
            medium: optional(payload, "medium"),
            description: optional(payload, "description"),
            year_created,
        })
    }
}

fn required(payload: &FormPayload, field: &str) -> Result<String, ValidationError> {
    payload
        .get(field)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationError::single(format!("\"{field}\" is required")))
}

fn optional(payload: &FormPayload, field: &str) -> Option<String> {
    payload
        .get(field)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
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

    #[test]
    fn test_draft_from_complete_payload() {
        let draft = ListingDraft::from_payload(&payload(&[
            ("title", "Starry Night"),
            ("artist", "V. van Gogh"),
            ("category", "Painting"),
            ("price", "1200.50"),
            ("medium", "Oil on Canvas"),
            ("year_created", "1889"),
        ]))
        .unwrap();

        assert_eq!(draft.title, "Starry Night");
        assert_eq!(draft.category, Category::Painting);
        assert_eq!(draft.price.display(), "$1200.50");
        assert_eq!(draft.year_created, 1889);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_draft_defaults_year_to_current() {
        let draft = ListingDraft::from_payload(&payload(&[
            ("title", "Untitled"),
            ("artist", "Anon"),
            ("category", "Other"),
            ("price", "0"),
        ]))
        .unwrap();

        assert_eq!(draft.year_created, Utc::now().year());
    }

    #[test]
    fn test_draft_rejects_unknown_category() {
        let err = ListingDraft::from_payload(&payload(&[
            ("title", "Untitled"),
            ("artist", "Anon"),
            ("category", "Fresco"),
            ("price", "10"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_draft_treats_blank_optional_as_absent() {
        let draft = ListingDraft::from_payload(&payload(&[
            ("title", "Untitled"),
            ("artist", "Anon"),
            ("category", "Sculpture"),
            ("price", "10"),
            ("medium", "   "),
        ]))
        .unwrap();

        assert_eq!(draft.medium, None);
    }
}
