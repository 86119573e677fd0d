//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every failure renders the shared error page: validation failures as a 400
//! listing each violation, missing resources as a 404, and anything without
//! a specific classification as a plain 400.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::filters;
use crate::flash::FlashMessages;
use crate::models::CurrentUser;
use crate::pipeline::ValidationError;
use crate::services::media::MediaError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// A form payload failed schema validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Page Not Found!")]
    NotFound,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Image upload to the media host failed.
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Anything without a more specific classification.
    #[error("Something Went Wrong!")]
    Unexpected(String),
}

/// Shared error page.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
    pub status: u16,
    pub title: String,
    pub details: Vec<String>,
}

impl ErrorTemplate {
    /// The fixed page served for routes that match nothing.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            current_user: None,
            flash: FlashMessages::default(),
            status: 404,
            title: "Page Not Found!".to_owned(),
            details: Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side faults to Sentry; client mistakes are not events
        if matches!(
            self,
            Self::Repository(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
                | Self::Media(_)
                | Self::Session(_)
                | Self::Unexpected(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::NotFound | Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Validation(_)
            | Self::Repository(_)
            | Self::Media(_)
            | Self::Session(_)
            | Self::Unexpected(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let (title, details) = match &self {
            Self::Validation(err) => ("Invalid input".to_owned(), err.violations.clone()),
            Self::NotFound | Self::Repository(RepositoryError::NotFound) => {
                ("Page Not Found!".to_owned(), Vec::new())
            }
            Self::Repository(_) | Self::Media(_) | Self::Session(_) | Self::Unexpected(_) => {
                ("Something Went Wrong!".to_owned(), Vec::new())
            }
        };

        let page = ErrorTemplate {
            current_user: None,
            flash: FlashMessages::default(),
            status: status.as_u16(),
            title,
            details,
        };
        (status, page).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::Validation(ValidationError::single("\"title\" is required"));
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(get_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_row_maps_to_404() {
        // A delete racing another delete surfaces as repository NotFound
        assert_eq!(
            get_status(AppError::Repository(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unclassified_defaults_to_bad_request() {
        assert_eq!(
            get_status(AppError::Unexpected("boom".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Repository(
                crate::db::RepositoryError::DataCorruption("bad row".to_owned())
            )),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Validation(ValidationError {
            violations: vec![
                "\"title\" is required".to_owned(),
                "\"price\" must be a number".to_owned(),
            ],
        });
        assert_eq!(
            err.to_string(),
            "\"title\" is required, \"price\" must be a number"
        );
    }
}
