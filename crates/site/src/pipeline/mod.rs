//! Request guard pipeline.
//!
//! Mutating handlers run an ordered [`GuardChain`] before touching the
//! database. Each [`Guard`] either lets the request continue or rejects it
//! with a redirect and a one-shot notice; the first rejection wins and the
//! terminal action only runs when every guard passed. Validation failures
//! are not redirects - they surface as errors and render through
//! [`crate::error::AppError`].
//!
//! Chains are assembled once at startup. [`GuardChain::new`] refuses a chain
//! where a guard that needs a signed-in principal is not preceded by a guard
//! that establishes one, so a misordered chain is a boot failure rather than
//! a latent authorization hole.

pub mod guards;
pub mod validate;

use tower_sessions::Session;

use artecho_core::{ListingId, ReviewId, UserId};

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::flash;
use crate::models::CurrentUser;

pub use guards::{RequireListingOwner, RequireLogin, RequireReviewOwner, ValidateSchema};
pub use validate::{FormPayload, Schema, ValidationError};

/// One-shot notice attached to a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// A guard's verdict on the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Hand the request to the next guard (or the terminal action).
    Continue,
    /// Stop the chain and redirect the client.
    Reject(Rejection),
}

/// Where a rejected request is sent, and what the user is told there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub redirect_to: String,
    pub notice: Notice,
}

/// Per-request state shared by the guards in a chain.
///
/// Handlers populate the fields relevant to their route (resource ids, form
/// payload) before running the chain; guards read and extend it (e.g.
/// `RequireLogin` fills in `principal`).
pub struct GuardContext<'a> {
    /// Session for the current request.
    pub session: &'a Session,
    /// Signed-in user, once a principal-establishing guard has run.
    pub principal: Option<CurrentUser>,
    /// Original request URI, recorded as the post-login redirect target.
    pub requested_uri: String,
    /// Listing addressed by the route, if any.
    pub listing_id: Option<ListingId>,
    /// Review addressed by the route, if any.
    pub review_id: Option<ReviewId>,
    /// Submitted form fields, for schema guards.
    pub form: Option<FormPayload>,
    /// Resolves resource owners for the ownership guards.
    pub owners: &'a dyn OwnerDirectory,
}

impl<'a> GuardContext<'a> {
    pub fn new(session: &'a Session, requested_uri: String, owners: &'a dyn OwnerDirectory) -> Self {
        Self {
            session,
            principal: None,
            requested_uri,
            listing_id: None,
            review_id: None,
            form: None,
            owners,
        }
    }

    #[must_use]
    pub fn with_listing(mut self, id: ListingId) -> Self {
        self.listing_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_review(mut self, id: ReviewId) -> Self {
        self.review_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: FormPayload) -> Self {
        self.form = Some(form);
        self
    }
}

/// Looks up who owns a listing or a review.
///
/// Implemented for `PgPool` in [`crate::db`]; tests substitute an in-memory
/// fake so guards can be exercised without a database.
#[async_trait::async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn listing_owner(&self, id: ListingId) -> Result<Option<UserId>, RepositoryError>;
    async fn review_owner(&self, id: ReviewId) -> Result<Option<UserId>, RepositoryError>;
}

/// A single admission check in a chain.
#[async_trait::async_trait]
pub trait Guard: Send + Sync {
    /// Stable name, used in chain-construction errors and logs.
    fn name(&self) -> &'static str;

    /// Whether this guard needs `ctx.principal` to be set before it runs.
    fn requires_principal(&self) -> bool {
        false
    }

    /// Whether this guard sets `ctx.principal` when it continues.
    fn establishes_principal(&self) -> bool {
        false
    }

    /// Evaluate the request.
    ///
    /// # Errors
    ///
    /// Returns `AppError` for failures that are answered with an error page
    /// rather than a redirect (missing resources, invalid payloads,
    /// repository faults).
    async fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<GuardOutcome, AppError>;
}

/// Error from assembling a misordered chain.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    /// A guard that needs a principal appears before any guard establishes one.
    #[error("chain \"{chain}\": guard \"{guard}\" requires a principal but none is established before it")]
    PrincipalNotEstablished { chain: String, guard: &'static str },
}

/// An ordered list of guards evaluated ahead of a terminal action.
pub struct GuardChain {
    name: String,
    guards: Vec<Box<dyn Guard>>,
}

impl GuardChain {
    /// Assemble a chain, checking guard ordering.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::PrincipalNotEstablished`] if any guard with
    /// `requires_principal()` is not preceded by one with
    /// `establishes_principal()`.
    pub fn new(name: impl Into<String>, guards: Vec<Box<dyn Guard>>) -> Result<Self, ChainError> {
        let name = name.into();
        let mut principal_established = false;
        for guard in &guards {
            if guard.requires_principal() && !principal_established {
                return Err(ChainError::PrincipalNotEstablished {
                    chain: name,
                    guard: guard.name(),
                });
            }
            if guard.establishes_principal() {
                principal_established = true;
            }
        }
        Ok(Self { name, guards })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate every guard in order.
    ///
    /// Stops at the first rejection, queues its notice in the session, and
    /// returns the rejection so the handler can issue the redirect. Returns
    /// `Ok(None)` when every guard continued.
    ///
    /// # Errors
    ///
    /// Propagates the first guard error; no later guard runs after a failure.
    pub async fn run(&self, ctx: &mut GuardContext<'_>) -> Result<Option<Rejection>, AppError> {
        for guard in &self.guards {
            match guard.evaluate(ctx).await? {
                GuardOutcome::Continue => {}
                GuardOutcome::Reject(rejection) => {
                    tracing::debug!(
                        chain = %self.name,
                        guard = guard.name(),
                        redirect_to = %rejection.redirect_to,
                        "request rejected by guard"
                    );
                    match rejection.notice.kind {
                        NoticeKind::Success => {
                            flash::success(ctx.session, &rejection.notice.message).await?;
                        }
                        NoticeKind::Error => {
                            flash::error(ctx.session, &rejection.notice.message).await?;
                        }
                    }
                    return Ok(Some(rejection));
                }
            }
        }
        Ok(None)
    }
}

/// The chains used by the route handlers, built once at startup.
pub struct GuardSet {
    pub listing_new_form: GuardChain,
    pub listing_create: GuardChain,
    pub listing_edit_form: GuardChain,
    pub listing_update: GuardChain,
    pub listing_delete: GuardChain,
    pub review_create: GuardChain,
    pub review_delete: GuardChain,
}

impl GuardSet {
    /// Build every chain the site uses.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if any chain is misordered, which aborts
    /// startup.
    pub fn build() -> Result<Self, ChainError> {
        let login = || Box::new(RequireLogin) as Box<dyn Guard>;
        let listing_owner = || Box::new(RequireListingOwner) as Box<dyn Guard>;
        let review_owner = || Box::new(RequireReviewOwner) as Box<dyn Guard>;
        let listing_form = || Box::new(ValidateSchema::new(validate::listing_schema())) as Box<dyn Guard>;
        let review_form = || Box::new(ValidateSchema::new(validate::review_schema())) as Box<dyn Guard>;

        Ok(Self {
            listing_new_form: GuardChain::new("listing-new-form", vec![login()])?,
            listing_create: GuardChain::new("listing-create", vec![login(), listing_form()])?,
            listing_edit_form: GuardChain::new("listing-edit-form", vec![login(), listing_owner()])?,
            listing_update: GuardChain::new(
                "listing-update",
                vec![login(), listing_owner(), listing_form()],
            )?,
            listing_delete: GuardChain::new("listing-delete", vec![login(), listing_owner()])?,
            review_create: GuardChain::new("review-create", vec![login(), review_form()])?,
            review_delete: GuardChain::new("review-delete", vec![login(), review_owner()])?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Establishes;

    #[async_trait::async_trait]
    impl Guard for Establishes {
        fn name(&self) -> &'static str {
            "establishes"
        }

        fn establishes_principal(&self) -> bool {
            true
        }

        async fn evaluate(&self, _ctx: &mut GuardContext<'_>) -> Result<GuardOutcome, AppError> {
            Ok(GuardOutcome::Continue)
        }
    }

    struct Requires;

    #[async_trait::async_trait]
    impl Guard for Requires {
        fn name(&self) -> &'static str {
            "requires"
        }

        fn requires_principal(&self) -> bool {
            true
        }

        async fn evaluate(&self, _ctx: &mut GuardContext<'_>) -> Result<GuardOutcome, AppError> {
            Ok(GuardOutcome::Continue)
        }
    }

    #[test]
    fn test_chain_accepts_establish_before_require() {
        let chain = GuardChain::new("ok", vec![Box::new(Establishes), Box::new(Requires)]);
        assert!(chain.is_ok());
    }

    #[test]
    fn test_chain_rejects_require_before_establish() {
        let err = GuardChain::new("bad", vec![Box::new(Requires), Box::new(Establishes)])
            .err()
            .unwrap();
        assert_eq!(
            err,
            ChainError::PrincipalNotEstablished {
                chain: "bad".to_owned(),
                guard: "requires",
            }
        );
    }

    #[test]
    fn test_chain_rejects_require_with_no_establisher() {
        assert!(GuardChain::new("bad", vec![Box::new(Requires)]).is_err());
    }

    #[test]
    fn test_guard_set_builds() {
        assert!(GuardSet::build().is_ok());
    }
}
