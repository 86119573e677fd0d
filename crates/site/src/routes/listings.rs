//! Listing route handlers.
//!
//! Gallery pages are open; every mutating route runs its guard chain before
//! touching the database.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, OriginalUri, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use artecho_core::{Category, ListingId};

use crate::db::listings::ListingRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::{self, FlashMessages};
use crate::middleware::auth::OptionalAuth;
use crate::models::{CurrentUser, Listing, ListingDetail, ListingDraft};
use crate::pipeline::{FormPayload, GuardContext};
use crate::services::media::UploadedImage;
use crate::state::AppState;

/// Notice shown when a gallery page is asked for a listing that is gone.
pub const LISTING_GONE: &str = "The art you are looking for - does not exist or was deleted!";

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the search page.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Gallery page template (all listings, one category, or search results).
#[derive(Template, WebTemplate)]
#[template(path = "listings/index.html")]
pub struct IndexTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
    pub heading: String,
    pub listings: Vec<Listing>,
}

/// Search page with nothing to show.
#[derive(Template, WebTemplate)]
#[template(path = "listings/no_results.html")]
pub struct NoResultsTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
    pub query: String,
}

/// Listing detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/show.html")]
pub struct ShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
    pub detail: ListingDetail,
}

/// New listing form template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/new.html")]
pub struct NewTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
    pub categories: &'static [&'static str],
}

/// One `<option>` in the edit form's category select.
pub struct CategoryOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Edit listing form template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/edit.html")]
pub struct EditTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
    pub listing: Listing,
    pub categories: Vec<CategoryOption>,
}

// =============================================================================
// Gallery Routes
// =============================================================================

/// All listings, newest first.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
) -> Result<Response, AppError> {
    let listings = ListingRepository::new(state.pool()).list().await?;
    let flash = flash::take(&session).await?;

    Ok(IndexTemplate {
        current_user,
        flash,
        heading: "All Artworks".to_owned(),
        listings,
    }
    .into_response())
}

/// Listings in one category.
pub async fn by_category(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let category = Category::from_slug(&slug).ok_or(AppError::NotFound)?;

    let listings = ListingRepository::new(state.pool())
        .list_by_category(category)
        .await?;
    let flash = flash::take(&session).await?;

    Ok(IndexTemplate {
        current_user,
        flash,
        heading: category.as_str().to_owned(),
        listings,
    }
    .into_response())
}

/// Search by title or artist.
pub async fn search(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let term = query.q.unwrap_or_default().trim().to_owned();
    if term.is_empty() {
        return Ok(Redirect::to("/listings").into_response());
    }

    let listings = ListingRepository::new(state.pool()).search(&term).await?;
    let flash = flash::take(&session).await?;

    if listings.is_empty() {
        return Ok(NoResultsTemplate {
            current_user,
            flash,
            query: term,
        }
        .into_response());
    }

    Ok(IndexTemplate {
        current_user,
        flash,
        heading: format!("Results for \"{term}\""),
        listings,
    }
    .into_response())
}

/// Listing detail with its reviews.
///
/// A missing listing is answered with a notice and a redirect to the
/// gallery, not an error page.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let id = ListingId::new(id);

    let Some(detail) = ListingRepository::new(state.pool()).find_detail(id).await? else {
        flash::error(&session, LISTING_GONE).await?;
        return Ok(Redirect::to("/listings").into_response());
    };

    let flash = flash::take(&session).await?;
    Ok(ShowTemplate {
        current_user,
        flash,
        detail,
    }
    .into_response())
}

// =============================================================================
// Mutating Routes
// =============================================================================

/// New listing form.
pub async fn new_form(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AppError> {
    let mut ctx = GuardContext::new(&session, uri.to_string(), state.pool());
    if let Some(rejection) = state.guards().listing_new_form.run(&mut ctx).await? {
        return Ok(Redirect::to(&rejection.redirect_to).into_response());
    }

    let flash = flash::take(&session).await?;
    Ok(NewTemplate {
        current_user: ctx.principal,
        flash,
        categories: Category::names(),
    }
    .into_response())
}

/// Create a listing from the multipart form.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (payload, image) = read_listing_form(multipart).await?;

    let mut ctx = GuardContext::new(&session, uri.to_string(), state.pool()).with_form(payload);
    if let Some(rejection) = state.guards().listing_create.run(&mut ctx).await? {
        return Ok(Redirect::to(&rejection.redirect_to).into_response());
    }
    let principal = ctx
        .principal
        .ok_or_else(|| AppError::Unexpected("create ran without a principal".into()))?;

    let form = ctx
        .form
        .ok_or_else(|| AppError::Unexpected("create ran without a form".into()))?;
    let draft = ListingDraft::from_payload(&form)?;

    let hosted = match image {
        Some(image) => Some(state.media().upload(image).await?),
        None => None,
    };

    let listing = ListingRepository::new(state.pool())
        .create(&draft, principal.id, hosted.as_ref())
        .await?;

    tracing::info!(listing = %listing.id, owner = %principal.id, "listing created");
    flash::success(&session, "New art uploaded successfully.").await?;
    Ok(Redirect::to(&format!("/listings/{}", listing.id)).into_response())
}

/// Edit form for an owned listing.
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let id = ListingId::new(id);

    let mut ctx = GuardContext::new(&session, uri.to_string(), state.pool()).with_listing(id);
    if let Some(rejection) = state.guards().listing_edit_form.run(&mut ctx).await? {
        return Ok(Redirect::to(&rejection.redirect_to).into_response());
    }

    // The ownership guard has already proven the listing exists
    let listing = ListingRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let categories = Category::ALL
        .iter()
        .map(|c| CategoryOption {
            name: c.as_str(),
            selected: *c == listing.category,
        })
        .collect();

    let flash = flash::take(&session).await?;
    Ok(EditTemplate {
        current_user: ctx.principal,
        flash,
        listing,
        categories,
    }
    .into_response())
}

/// Update an owned listing from the multipart form.
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let id = ListingId::new(id);
    let (payload, image) = read_listing_form(multipart).await?;

    let mut ctx = GuardContext::new(&session, uri.to_string(), state.pool())
        .with_listing(id)
        .with_form(payload);
    if let Some(rejection) = state.guards().listing_update.run(&mut ctx).await? {
        return Ok(Redirect::to(&rejection.redirect_to).into_response());
    }

    let form = ctx
        .form
        .ok_or_else(|| AppError::Unexpected("update ran without a form".into()))?;
    let draft = ListingDraft::from_payload(&form)?;

    let repo = ListingRepository::new(state.pool());
    repo.update(id, &draft).await?;

    if let Some(image) = image {
        let hosted = state.media().upload(image).await?;
        repo.set_image(id, &hosted).await?;
    }

    flash::success(&session, "Art updated successfully!").await?;
    Ok(Redirect::to(&format!("/listings/{id}")).into_response())
}

/// Delete an owned listing.
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let id = ListingId::new(id);

    let mut ctx = GuardContext::new(&session, uri.to_string(), state.pool()).with_listing(id);
    if let Some(rejection) = state.guards().listing_delete.run(&mut ctx).await? {
        return Ok(Redirect::to(&rejection.redirect_to).into_response());
    }

    ListingRepository::new(state.pool()).delete(id).await?;

    tracing::info!(listing = %id, "listing deleted");
    flash::success(&session, "Art deleted successfully!").await?;
    Ok(Redirect::to("/listings").into_response())
}

// =============================================================================
// Multipart Helper
// =============================================================================

/// Split a listing form submission into text fields and the optional image.
///
/// A file part with an empty filename means the picker was left untouched
/// and counts as no image.
pub async fn read_listing_form(
    mut multipart: Multipart,
) -> Result<(FormPayload, Option<UploadedImage>), AppError> {
    let mut payload = FormPayload::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Unexpected(format!("unreadable form: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            if file_name.is_empty() {
                continue;
            }
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Unexpected(format!("unreadable image: {e}")))?;
            image = Some(UploadedImage {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Unexpected(format!("unreadable field \"{name}\": {e}")))?;
            payload.insert(name, value);
        }
    }

    Ok((payload, image))
}
