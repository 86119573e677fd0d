//! Authentication route handlers.
//!
//! Signup, login and logout. A login that was forced by the login guard
//! returns the user to the page they originally asked for.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::flash::{self, FlashMessages};
use crate::middleware::auth::{
    OptionalAuth, clear_current_user, set_current_user, take_redirect_target,
};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: FlashMessages,
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
) -> Result<Response, AppError> {
    let flash = flash::take(&session).await?;
    Ok(SignupTemplate {
        current_user,
        flash,
    }
    .into_response())
}

/// Handle signup form submission.
///
/// A successful signup logs the new user straight in.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let service = AuthService::new(state.pool());

    let user = match service
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::Repository(e)) => return Err(e.into()),
        Err(e) => {
            flash::error(&session, e.to_string()).await?;
            return Ok(Redirect::to("/signup").into_response());
        }
    };

    let current_user = CurrentUser::from(&user);
    set_current_user(&session, &current_user).await?;

    tracing::info!(user = %user.id, "account created");
    flash::success(&session, "Welcome to the club!").await?;

    let target = take_redirect_target(&session)
        .await?
        .unwrap_or_else(|| "/listings".to_owned());
    Ok(Redirect::to(&target).into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
) -> Result<Response, AppError> {
    let flash = flash::take(&session).await?;
    Ok(LoginTemplate {
        current_user,
        flash,
    }
    .into_response())
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let service = AuthService::new(state.pool());

    let user = match service.login(&form.username, &form.password).await {
        Ok(user) => user,
        Err(AuthError::Repository(e)) => return Err(e.into()),
        Err(_) => {
            // One message for every failure mode, so the form leaks nothing
            flash::error(&session, "Invalid username or password").await?;
            return Ok(Redirect::to("/login").into_response());
        }
    };

    let current_user = CurrentUser::from(&user);
    set_current_user(&session, &current_user).await?;

    flash::success(&session, format!("Welcome back, {}!", user.username)).await?;

    let target = take_redirect_target(&session)
        .await?
        .unwrap_or_else(|| "/listings".to_owned());
    Ok(Redirect::to(&target).into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Log the current user out.
pub async fn logout(session: Session) -> Result<Response, AppError> {
    clear_current_user(&session).await?;
    flash::success(&session, "Logged out successfully!").await?;
    Ok(Redirect::to("/listings").into_response())
}
