//! Listing repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use artecho_core::{Category, ListingId, Price, UserId};

use super::RepositoryError;
use crate::models::{Listing, ListingDetail, ListingDraft, ListingImage};

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: ListingId,
    title: String,
    artist: String,
    category: String,
    price: Price,
    medium: Option<String>,
    description: Option<String>,
    year_created: Option<i32>,
    image_url: Option<String>,
    image_public_id: Option<String>,
    owner_id: UserId,
    created_at: DateTime<Utc>,
}

const LISTING_COLUMNS: &str = "id, title, artist, category, price, medium, description, \
     year_created, image_url, image_public_id, owner_id, created_at";

impl ListingRow {
    fn into_listing(self) -> Result<Listing, RepositoryError> {
        let category: Category = self.category.parse().map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "unknown category in database: {}",
                self.category
            ))
        })?;

        let image = match (self.image_url, self.image_public_id) {
            (Some(url), Some(public_id)) => Some(ListingImage { url, public_id }),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "partial image columns for listing {}",
                    self.id
                )));
            }
        };

        Ok(Listing {
            id: self.id,
            title: self.title,
            artist: self.artist,
            category,
            price: self.price,
            medium: self.medium,
            description: self.description,
            year_created: self.year_created,
            image,
            owner_id: self.owner_id,
            created_at: self.created_at,
        })
    }
}

/// Repository for listing database operations.
pub struct ListingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ListingRepository<'a> {
    /// Create a new listing repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Listing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ListingRow::into_listing).collect()
    }

    /// Listings in one category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Listing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE category = $1 ORDER BY created_at DESC"
        ))
        .bind(category.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ListingRow::into_listing).collect()
    }

    /// Listings whose title or artist matches the query, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Listing>, RepositoryError> {
        // Escape LIKE wildcards so user input matches literally
        let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let pattern = format!("%{escaped}%");

        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE title ILIKE $1 OR artist ILIKE $1 \
             ORDER BY created_at DESC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ListingRow::into_listing).collect()
    }

    /// Get a listing by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ListingRow::into_listing).transpose()
    }

    /// Get a listing with its owner's name and reviews, for the detail page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    /// Returns `RepositoryError::DataCorruption` if the owner row is missing.
    pub async fn find_detail(&self, id: ListingId) -> Result<Option<ListingDetail>, RepositoryError> {
        let Some(listing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let owner_name: Option<(String,)> =
            sqlx::query_as("SELECT username FROM users WHERE id = $1")
                .bind(listing.owner_id)
                .fetch_optional(self.pool)
                .await?;
        let owner_name = owner_name
            .map(|(name,)| name)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("listing {id} has no owner row"))
            })?;

        let reviews = super::reviews::ReviewRepository::new(self.pool)
            .list_for_listing(id)
            .await?;

        Ok(Some(ListingDetail {
            listing,
            owner_name,
            reviews,
        }))
    }

    /// Insert a new listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        draft: &ListingDraft,
        owner: UserId,
        image: Option<&ListingImage>,
    ) -> Result<Listing, RepositoryError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "INSERT INTO listings \
                (title, artist, category, price, medium, description, year_created, \
                 image_url, image_public_id, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {LISTING_COLUMNS}"
        ))
        .bind(&draft.title)
        .bind(&draft.artist)
        .bind(draft.category.as_str())
        .bind(draft.price)
        .bind(&draft.medium)
        .bind(&draft.description)
        .bind(draft.year_created)
        .bind(image.map(|i| i.url.as_str()))
        .bind(image.map(|i| i.public_id.as_str()))
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        row.into_listing()
    }

    /// Update a listing's editable fields.
    ///
    /// The image columns are untouched; [`Self::set_image`] replaces them
    /// when a new upload arrives.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no listing has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ListingId,
        draft: &ListingDraft,
    ) -> Result<Listing, RepositoryError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "UPDATE listings \
             SET title = $2, artist = $3, category = $4, price = $5, \
                 medium = $6, description = $7, year_created = $8 \
             WHERE id = $1 \
             RETURNING {LISTING_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.artist)
        .bind(draft.category.as_str())
        .bind(draft.price)
        .bind(&draft.medium)
        .bind(&draft.description)
        .bind(draft.year_created)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_listing()
    }

    /// Replace a listing's image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no listing has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_image(
        &self,
        id: ListingId,
        image: &ListingImage,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE listings SET image_url = $2, image_public_id = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(&image.url)
        .bind(&image.public_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a listing. Its reviews go with it via the FK cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no listing has this ID.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ListingId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Who owns a listing, or `None` if the listing does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owner_of(&self, id: ListingId) -> Result<Option<UserId>, RepositoryError> {
        let row: Option<(UserId,)> =
            sqlx::query_as("SELECT owner_id FROM listings WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(owner,)| owner))
    }
}
