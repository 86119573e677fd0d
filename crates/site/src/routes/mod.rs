//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the gallery
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Listings
//! GET  /listings               - Gallery of all listings
//! POST /listings               - Create listing (multipart, guarded)
//! GET  /listings/new           - New listing form (guarded)
//! GET  /listings/search        - Search by title or artist
//! GET  /listings/category/{slug} - Gallery filtered by category
//! GET  /listings/{id}          - Listing detail with reviews
//! POST /listings/{id}          - Update listing (multipart, guarded)
//! GET  /listings/{id}/edit     - Edit form (guarded)
//! POST /listings/{id}/delete   - Delete listing (guarded)
//!
//! # Reviews
//! POST /listings/{id}/reviews                  - Post review (guarded)
//! POST /listings/{id}/reviews/{review_id}/delete - Delete review (guarded)
//!
//! # Auth
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /logout                 - Logout action
//! ```
//!
//! Anything else falls through to the fixed not-found page.

pub mod auth;
pub mod listings;
pub mod reviews;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::error::ErrorTemplate;
use crate::state::AppState;

/// Create the listing routes router (nested under `/listings`).
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listings::index).post(listings::create))
        .route("/new", get(listings::new_form))
        .route("/search", get(listings::search))
        .route("/category/{slug}", get(listings::by_category))
        .route("/{id}", get(listings::show).post(listings::update))
        .route("/{id}/edit", get(listings::edit_form))
        .route("/{id}/delete", post(listings::delete))
        .route("/{id}/reviews", post(reviews::create))
        .route("/{id}/reviews/{review_id}/delete", post(reviews::delete))
}

/// Create the auth routes router (mounted at the root).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create the full application router (state and layers applied in `main`).
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/listings", listing_routes())
        .merge(auth_routes())
        .fallback(not_found)
}

/// The root just forwards to the gallery.
async fn home() -> Redirect {
    Redirect::to("/listings")
}

/// Liveness check.
async fn health() -> &'static str {
    "OK"
}

/// Readiness check: verifies the database answers.
async fn ready(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => (StatusCode::OK, "READY").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY").into_response()
        }
    }
}

/// Fixed page for unmatched routes.
async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, ErrorTemplate::not_found()).into_response()
}
