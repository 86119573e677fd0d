//! One-shot session notices.
//!
//! Notices queue in the session under two keys (success and error) and are
//! consumed exactly once: [`take`] reads and clears both queues, so a notice
//! survives the redirect that queued it and disappears on the next page load.

use tower_sessions::Session;

use crate::models::session_keys;

/// Notices drained from the session for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashMessages {
    pub success: Vec<String>,
    pub error: Vec<String>,
}

impl FlashMessages {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

/// Queue a success notice.
///
/// # Errors
///
/// Returns `tower_sessions::session::Error` if the session store fails.
pub async fn success(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, session_keys::FLASH_SUCCESS, message.into()).await
}

/// Queue an error notice.
///
/// # Errors
///
/// Returns `tower_sessions::session::Error` if the session store fails.
pub async fn error(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, session_keys::FLASH_ERROR, message.into()).await
}

async fn push(
    session: &Session,
    key: &str,
    message: String,
) -> Result<(), tower_sessions::session::Error> {
    let mut queue: Vec<String> = session.get(key).await?.unwrap_or_default();
    queue.push(message);
    session.insert(key, queue).await
}

/// Drain both notice queues, clearing them from the session.
///
/// # Errors
///
/// Returns `tower_sessions::session::Error` if the session store fails.
pub async fn take(session: &Session) -> Result<FlashMessages, tower_sessions::session::Error> {
    let success: Vec<String> = session
        .remove(session_keys::FLASH_SUCCESS)
        .await?
        .unwrap_or_default();
    let error: Vec<String> = session
        .remove(session_keys::FLASH_ERROR)
        .await?
        .unwrap_or_default();
    Ok(FlashMessages { success, error })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_take_drains_in_queue_order() {
        let session = session();
        success(&session, "first").await.unwrap();
        success(&session, "second").await.unwrap();
        error(&session, "oops").await.unwrap();

        let flash = take(&session).await.unwrap();
        assert_eq!(flash.success, vec!["first", "second"]);
        assert_eq!(flash.error, vec!["oops"]);
    }

    #[tokio::test]
    async fn test_notices_are_one_shot() {
        let session = session();
        success(&session, "once").await.unwrap();

        assert!(!take(&session).await.unwrap().is_empty());
        assert!(take(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_session_yields_no_notices() {
        let flash = take(&session()).await.unwrap();
        assert!(flash.is_empty());
    }
}
