//! Review repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use artecho_core::{ListingId, Rating, ReviewId, UserId};

use super::RepositoryError;
use crate::models::{Review, ReviewDraft, ReviewWithAuthor};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    listing_id: ListingId,
    owner_id: UserId,
    comment: String,
    rating: Rating,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            listing_id: row.listing_id,
            owner_id: row.owner_id,
            comment: row.comment,
            rating: row.rating,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewWithAuthorRow {
    id: ReviewId,
    listing_id: ListingId,
    owner_id: UserId,
    comment: String,
    rating: Rating,
    created_at: DateTime<Utc>,
    author_name: String,
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a listing with their authors' names, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_listing(
        &self,
        listing_id: ListingId,
    ) -> Result<Vec<ReviewWithAuthor>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewWithAuthorRow>(
            r"
            SELECT r.id, r.listing_id, r.owner_id, r.comment, r.rating, r.created_at,
                   u.username AS author_name
            FROM reviews r
            JOIN users u ON u.id = r.owner_id
            WHERE r.listing_id = $1
            ORDER BY r.created_at DESC
            ",
        )
        .bind(listing_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReviewWithAuthor {
                review: Review {
                    id: row.id,
                    listing_id: row.listing_id,
                    owner_id: row.owner_id,
                    comment: row.comment,
                    rating: row.rating,
                    created_at: row.created_at,
                },
                author_name: row.author_name,
            })
            .collect())
    }

    /// Insert a review on a listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing does not exist
    /// (surfaced as a foreign-key violation).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        listing_id: ListingId,
        owner: UserId,
        draft: &ReviewDraft,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            INSERT INTO reviews (listing_id, owner_id, comment, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING id, listing_id, owner_id, comment, rating, created_at
            ",
        )
        .bind(listing_id)
        .bind(owner)
        .bind(&draft.comment)
        .bind(draft.rating)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            _ => RepositoryError::Database(e),
        })?;

        Ok(row.into())
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no review has this ID.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Who wrote a review, or `None` if the review does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owner_of(&self, id: ReviewId) -> Result<Option<UserId>, RepositoryError> {
        let row: Option<(UserId,)> =
            sqlx::query_as("SELECT owner_id FROM reviews WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(owner,)| owner))
    }
}
