//! Authentication extractor and session helpers.
//!
//! The page handlers use [`OptionalAuth`] to render the navigation for both
//! signed-in and anonymous visitors; admission decisions belong to the guard
//! pipeline, not to extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that optionally gets the current user.
///
/// Never rejects: an anonymous request yields `OptionalAuth(None)`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalAuth(user): OptionalAuth,
/// ) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.username),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is set in extensions by SessionManagerLayer
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

/// Record the URI an anonymous user tried to reach, for the post-login
/// redirect.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_redirect_target(
    session: &Session,
    uri: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::REDIRECT_TARGET, uri).await
}

/// Consume the recorded redirect target, if any.
///
/// The target is removed so it applies to exactly one login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_redirect_target(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    session
        .remove::<String>(session_keys::REDIRECT_TARGET)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use artecho_core::UserId;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_set_and_clear_current_user() {
        let session = session();
        let user = CurrentUser {
            id: UserId::new(1),
            username: "ada".to_owned(),
        };

        set_current_user(&session, &user).await.unwrap();
        let stored: Option<CurrentUser> =
            session.get(session_keys::CURRENT_USER).await.unwrap();
        assert_eq!(stored, Some(user));

        clear_current_user(&session).await.unwrap();
        let stored: Option<CurrentUser> =
            session.get(session_keys::CURRENT_USER).await.unwrap();
        assert_eq!(stored, None);
    }

    #[tokio::test]
    async fn test_redirect_target_is_consumed_once() {
        let session = session();
        remember_redirect_target(&session, "/listings/3/edit")
            .await
            .unwrap();

        assert_eq!(
            take_redirect_target(&session).await.unwrap().as_deref(),
            Some("/listings/3/edit")
        );
        assert_eq!(take_redirect_target(&session).await.unwrap(), None);
    }
}
