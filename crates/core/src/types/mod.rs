//! Shared type definitions.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod rating;

pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::{ListingId, ReviewId, UserId};
pub use price::{Price, PriceError};
pub use rating::{Rating, RatingError};
