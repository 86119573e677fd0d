//! Review domain types.

use chrono::{DateTime, Utc};

use artecho_core::{ListingId, Rating, ReviewId, UserId};

use crate::pipeline::validate::{FormPayload, ValidationError};

/// A review on a listing (domain type).
#[derive(Debug, Clone)]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Listing the review belongs to.
    pub listing_id: ListingId,
    /// The user who wrote the review.
    pub owner_id: UserId,
    /// Review text.
    pub comment: String,
    /// Star rating, 1-5.
    pub rating: Rating,
    /// When the review was posted.
    pub created_at: DateTime<Utc>,
}

/// A review joined with its author's name, for the listing detail page.
#[derive(Debug, Clone)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author_name: String,
}

/// Validated review fields from a submitted form.
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub comment: String,
    pub rating: Rating,
}

impl ReviewDraft {
    /// Build a draft from a validated form payload.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any field fails its typed parse.
    pub fn from_payload(payload: &FormPayload) -> Result<Self, ValidationError> {
        let comment = payload
            .get("comment")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationError::single("\"comment\" is required"))?;

        let raw_rating = payload
            .get("rating")
            .ok_or_else(|| ValidationError::single("\"rating\" is required"))?;
        let rating = Rating::parse(raw_rating)
            .map_err(|e| ValidationError::single(format!("\"rating\" {e}")))?;

        Ok(Self { comment, rating })
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

    #[test]
    fn test_draft_from_valid_payload() {
        let draft =
            ReviewDraft::from_payload(&payload(&[("comment", "Lovely"), ("rating", "5")])).unwrap();
        assert_eq!(draft.comment, "Lovely");
        assert_eq!(draft.rating.as_i32(), 5);
    }

    #[test]
    fn test_draft_rejects_out_of_range_rating() {
        let err = ReviewDraft::from_payload(&payload(&[("comment", "Meh"), ("rating", "6")]))
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 5"));
    }
}
