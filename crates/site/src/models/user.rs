//! User domain types and session keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use artecho_core::{Email, UserId};

/// A site account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Public display name, unique across the site.
    pub username: String,
    /// User's email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Session-stored principal.
///
/// Minimal data stored in the session to identify the logged-in user; the
/// guard pipeline compares `id` against resource owner ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's display name.
    pub username: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Session keys for authentication and pipeline state.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the URL an anonymous user tried to reach before login.
    pub const REDIRECT_TARGET: &str = "redirect_target";

    /// Key for the one-shot success notice queue.
    pub const FLASH_SUCCESS: &str = "flash.success";

    /// Key for the one-shot error notice queue.
    pub const FLASH_ERROR: &str = "flash.error";
}
