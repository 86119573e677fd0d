//! Review route handlers.
//!
//! Reviews have no pages of their own; both routes end in a redirect back to
//! the parent listing.

use axum::{
    Form,
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use artecho_core::{ListingId, ReviewId};

use crate::db::reviews::ReviewRepository;
use crate::error::AppError;
use crate::flash;
use crate::models::ReviewDraft;
use crate::pipeline::{FormPayload, GuardContext};
use crate::state::AppState;

/// Post a review on a listing.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    Path(listing_id): Path<i32>,
    Form(payload): Form<FormPayload>,
) -> Result<Response, AppError> {
    let listing_id = ListingId::new(listing_id);

    let mut ctx = GuardContext::new(&session, uri.to_string(), state.pool())
        .with_listing(listing_id)
        .with_form(payload);
    if let Some(rejection) = state.guards().review_create.run(&mut ctx).await? {
        return Ok(Redirect::to(&rejection.redirect_to).into_response());
    }
    let principal = ctx
        .principal
        .ok_or_else(|| AppError::Unexpected("review create ran without a principal".into()))?;

    let form = ctx
        .form
        .ok_or_else(|| AppError::Unexpected("review create ran without a form".into()))?;
    let draft = ReviewDraft::from_payload(&form)?;

    // A listing deleted mid-submission surfaces as NotFound here
    ReviewRepository::new(state.pool())
        .create(listing_id, principal.id, &draft)
        .await?;

    flash::success(&session, "Review posted successfully!").await?;
    Ok(Redirect::to(&format!("/listings/{listing_id}")).into_response())
}

/// Delete an owned review.
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    Path((listing_id, review_id)): Path<(i32, i32)>,
) -> Result<Response, AppError> {
    let listing_id = ListingId::new(listing_id);
    let review_id = ReviewId::new(review_id);

    let mut ctx = GuardContext::new(&session, uri.to_string(), state.pool())
        .with_listing(listing_id)
        .with_review(review_id);
    if let Some(rejection) = state.guards().review_delete.run(&mut ctx).await? {
        return Ok(Redirect::to(&rejection.redirect_to).into_response());
    }

    ReviewRepository::new(state.pool()).delete(review_id).await?;

    flash::success(&session, "Review deleted successfully!").await?;
    Ok(Redirect::to(&format!("/listings/{listing_id}")).into_response())
}
