//! Domain models for the site.
//!
//! Models are validated domain objects, separate from the database row types
//! in [`crate::db`]. Row-to-model conversion happens in the repositories so
//! invalid stored values surface as `DataCorruption` rather than panics.

pub mod listing;
pub mod review;
pub mod user;

pub use listing::{Listing, ListingDetail, ListingDraft, ListingImage};
pub use review::{Review, ReviewDraft, ReviewWithAuthor};
pub use user::{CurrentUser, User, session_keys};
