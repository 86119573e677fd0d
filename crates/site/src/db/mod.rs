//! Database operations for the ArtEcho `PostgreSQL` database.
//!
//! # Tables
//!
//! - `users` - Site accounts (argon2 password hashes)
//! - `listings` - Art listings, owned by users
//! - `reviews` - Reviews on listings, owned by users
//! - `session` - Tower-sessions storage (managed by the session store)
//!
//! Queries use runtime `query_as` with row structs rather than the sqlx
//! macros so the workspace builds without a live database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p artecho-cli -- migrate
//! ```

pub mod listings;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use artecho_core::{ListingId, ReviewId, UserId};

use crate::pipeline::OwnerDirectory;

/// Errors from the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// The ownership guards resolve owners through the live database.
#[async_trait::async_trait]
impl OwnerDirectory for PgPool {
    async fn listing_owner(&self, id: ListingId) -> Result<Option<UserId>, RepositoryError> {
        listings::ListingRepository::new(self).owner_of(id).await
    }

    async fn review_owner(&self, id: ReviewId) -> Result<Option<UserId>, RepositoryError> {
        reviews::ReviewRepository::new(self).owner_of(id).await
    }
}
