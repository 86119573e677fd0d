//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::pipeline::{ChainError, GuardSet};
use crate::services::media::MediaClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    media: MediaClient,
    guards: GuardSet,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds every guard chain up front, so a misordered chain aborts
    /// startup instead of surfacing on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if any guard chain is misordered.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, ChainError> {
        let media = MediaClient::new(&config.media);
        let guards = GuardSet::build()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                media,
                guards,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the media host client.
    #[must_use]
    pub fn media(&self) -> &MediaClient {
        &self.inner.media
    }

    /// Get a reference to the pre-built guard chains.
    #[must_use]
    pub fn guards(&self) -> &GuardSet {
        &self.inner.guards
    }
}
