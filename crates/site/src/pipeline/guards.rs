//! The site's guard implementations.

use async_trait::async_trait;

use crate::error::AppError;
use crate::middleware::auth;
use crate::models::session_keys;

use super::{Guard, GuardContext, GuardOutcome, Notice, Rejection, Schema};

/// Notice shown when an anonymous user is bounced to the login page.
pub const LOGIN_REQUIRED: &str = "Login to proceed with the operation";

/// Notice shown when a signed-in user touches someone else's resource.
pub const NOT_OWNER: &str = "You don't have the permission to make the following changes!";

/// Requires a signed-in user, establishing the chain's principal.
///
/// On rejection the original request URI is recorded in the session so a
/// successful login can return the user to what they were doing.
pub struct RequireLogin;

#[async_trait]
impl Guard for RequireLogin {
    fn name(&self) -> &'static str {
        "require-login"
    }

    fn establishes_principal(&self) -> bool {
        true
    }

    async fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<GuardOutcome, AppError> {
        match ctx
            .session
            .get::<crate::models::CurrentUser>(session_keys::CURRENT_USER)
            .await?
        {
            Some(user) => {
                ctx.principal = Some(user);
                Ok(GuardOutcome::Continue)
            }
            None => {
                auth::remember_redirect_target(ctx.session, &ctx.requested_uri).await?;
                Ok(GuardOutcome::Reject(Rejection {
                    redirect_to: "/login".to_owned(),
                    notice: Notice::error(LOGIN_REQUIRED),
                }))
            }
        }
    }
}

/// Requires the principal to own the listing addressed by the route.
///
/// A missing listing is an error, not a rejection: the client is answered
/// with the not-found page rather than redirected.
pub struct RequireListingOwner;

#[async_trait]
impl Guard for RequireListingOwner {
    fn name(&self) -> &'static str {
        "require-listing-owner"
    }

    fn requires_principal(&self) -> bool {
        true
    }

    async fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<GuardOutcome, AppError> {
        let principal = ctx
            .principal
            .as_ref()
            .ok_or_else(|| AppError::Unexpected("ownership check ran without a principal".into()))?;
        let listing_id = ctx
            .listing_id
            .ok_or_else(|| AppError::Unexpected("ownership check ran without a listing id".into()))?;

        let owner = ctx
            .owners
            .listing_owner(listing_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if owner == principal.id {
            Ok(GuardOutcome::Continue)
        } else {
            Ok(GuardOutcome::Reject(Rejection {
                redirect_to: format!("/listings/{listing_id}"),
                notice: Notice::error(NOT_OWNER),
            }))
        }
    }
}

/// Requires the principal to own the review addressed by the route.
///
/// Rejections redirect to the parent listing's detail page.
pub struct RequireReviewOwner;

#[async_trait]
impl Guard for RequireReviewOwner {
    fn name(&self) -> &'static str {
        "require-review-owner"
    }

    fn requires_principal(&self) -> bool {
        true
    }

    async fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<GuardOutcome, AppError> {
        let principal = ctx
            .principal
            .as_ref()
            .ok_or_else(|| AppError::Unexpected("ownership check ran without a principal".into()))?;
        let listing_id = ctx
            .listing_id
            .ok_or_else(|| AppError::Unexpected("review check ran without a listing id".into()))?;
        let review_id = ctx
            .review_id
            .ok_or_else(|| AppError::Unexpected("review check ran without a review id".into()))?;

        let owner = ctx
            .owners
            .review_owner(review_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if owner == principal.id {
            Ok(GuardOutcome::Continue)
        } else {
            Ok(GuardOutcome::Reject(Rejection {
                redirect_to: format!("/listings/{listing_id}"),
                notice: Notice::error(NOT_OWNER),
            }))
        }
    }
}

/// Checks the submitted form against a declarative schema.
///
/// Violations are surfaced as a validation error (rendered as a 400), never
/// as a redirect.
pub struct ValidateSchema {
    schema: Schema,
}

impl ValidateSchema {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }
}

#[async_trait]
impl Guard for ValidateSchema {
    fn name(&self) -> &'static str {
        "validate-schema"
    }

    async fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<GuardOutcome, AppError> {
        let form = ctx.form.as_ref().ok_or_else(|| {
            AppError::Unexpected(format!(
                "schema \"{}\" ran without a form payload",
                self.schema.name
            ))
        })?;
        self.schema.evaluate(form)?;
        Ok(GuardOutcome::Continue)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use artecho_core::{ListingId, ReviewId, UserId};

    use crate::db::RepositoryError;
    use crate::models::CurrentUser;
    use crate::pipeline::{GuardChain, OwnerDirectory, validate};

    use super::*;

    struct FakeOwners {
        listing: Option<(ListingId, UserId)>,
        review: Option<(ReviewId, UserId)>,
    }

    #[async_trait]
    impl OwnerDirectory for FakeOwners {
        async fn listing_owner(&self, id: ListingId) -> Result<Option<UserId>, RepositoryError> {
            Ok(self.listing.filter(|(l, _)| *l == id).map(|(_, u)| u))
        }

        async fn review_owner(&self, id: ReviewId) -> Result<Option<UserId>, RepositoryError> {
            Ok(self.review.filter(|(r, _)| *r == id).map(|(_, u)| u))
        }
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn payload(pairs: &[(&str, &str)]) -> validate::FormPayload {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn no_owners() -> FakeOwners {
        FakeOwners {
            listing: None,
            review: None,
        }
    }

    fn current_user(id: i32) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            username: format!("user{id}"),
        }
    }

    #[tokio::test]
    async fn test_require_login_rejects_anonymous_and_records_target() {
        let session = session();
        let owners = no_owners();
        let mut ctx = GuardContext::new(&session, "/listings/new".to_owned(), &owners);

        let outcome = RequireLogin.evaluate(&mut ctx).await.unwrap();
        let GuardOutcome::Reject(rejection) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.redirect_to, "/login");
        assert_eq!(rejection.notice.message, LOGIN_REQUIRED);

        let target: Option<String> = session.get(session_keys::REDIRECT_TARGET).await.unwrap();
        assert_eq!(target.as_deref(), Some("/listings/new"));
    }

    #[tokio::test]
    async fn test_require_login_establishes_principal() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, current_user(7))
            .await
            .unwrap();
        let owners = no_owners();
        let mut ctx = GuardContext::new(&session, "/listings/new".to_owned(), &owners);

        let outcome = RequireLogin.evaluate(&mut ctx).await.unwrap();
        assert_eq!(outcome, GuardOutcome::Continue);
        assert_eq!(ctx.principal, Some(current_user(7)));
    }

    #[tokio::test]
    async fn test_listing_owner_passes_the_owner() {
        let session = session();
        let owners = FakeOwners {
            listing: Some((ListingId::new(3), UserId::new(7))),
            review: None,
        };
        let mut ctx = GuardContext::new(&session, "/listings/3/edit".to_owned(), &owners)
            .with_listing(ListingId::new(3));
        ctx.principal = Some(current_user(7));

        let outcome = RequireListingOwner.evaluate(&mut ctx).await.unwrap();
        assert_eq!(outcome, GuardOutcome::Continue);
    }

    #[tokio::test]
    async fn test_listing_owner_redirects_non_owner_to_detail() {
        let session = session();
        let owners = FakeOwners {
            listing: Some((ListingId::new(3), UserId::new(7))),
            review: None,
        };
        let mut ctx = GuardContext::new(&session, "/listings/3/edit".to_owned(), &owners)
            .with_listing(ListingId::new(3));
        ctx.principal = Some(current_user(8));

        let GuardOutcome::Reject(rejection) =
            RequireListingOwner.evaluate(&mut ctx).await.unwrap()
        else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.redirect_to, "/listings/3");
        assert_eq!(rejection.notice.message, NOT_OWNER);
    }

    #[tokio::test]
    async fn test_listing_owner_errors_on_missing_listing() {
        let session = session();
        let owners = no_owners();
        let mut ctx = GuardContext::new(&session, "/listings/3/edit".to_owned(), &owners)
            .with_listing(ListingId::new(3));
        ctx.principal = Some(current_user(7));

        let err = RequireListingOwner.evaluate(&mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_review_owner_redirects_non_owner_to_listing() {
        let session = session();
        let owners = FakeOwners {
            listing: None,
            review: Some((ReviewId::new(5), UserId::new(7))),
        };
        let mut ctx = GuardContext::new(&session, "/listings/3/reviews/5/delete".to_owned(), &owners)
            .with_listing(ListingId::new(3))
            .with_review(ReviewId::new(5));
        ctx.principal = Some(current_user(8));

        let GuardOutcome::Reject(rejection) =
            RequireReviewOwner.evaluate(&mut ctx).await.unwrap()
        else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.redirect_to, "/listings/3");
    }

    #[tokio::test]
    async fn test_validate_schema_surfaces_violations_as_error() {
        let session = session();
        let owners = no_owners();
        let mut ctx = GuardContext::new(&session, "/listings".to_owned(), &owners)
            .with_form(payload(&[("rating", "6")]));

        let err = ValidateSchema::new(validate::review_schema())
            .evaluate(&mut ctx)
            .await
            .unwrap_err();
        let AppError::Validation(err) = err else {
            panic!("expected validation error");
        };
        assert_eq!(err.violations.len(), 2);
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_rejection() {
        let session = session();
        let owners = FakeOwners {
            listing: Some((ListingId::new(3), UserId::new(7))),
            review: None,
        };
        let chain = GuardChain::new(
            "listing-update",
            vec![
                Box::new(RequireLogin) as Box<dyn Guard>,
                Box::new(RequireListingOwner),
                Box::new(ValidateSchema::new(validate::listing_schema())),
            ],
        )
        .unwrap();

        // Anonymous: the login guard rejects before the ownership guard can
        // touch the owner directory or the schema can run.
        let mut ctx = GuardContext::new(&session, "/listings/3".to_owned(), &owners)
            .with_listing(ListingId::new(3));
        let rejection = chain.run(&mut ctx).await.unwrap().unwrap();
        assert_eq!(rejection.redirect_to, "/login");
    }

    #[tokio::test]
    async fn test_update_chain_passes_the_owner_with_a_valid_form() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, current_user(7))
            .await
            .unwrap();
        let owners = FakeOwners {
            listing: Some((ListingId::new(3), UserId::new(7))),
            review: None,
        };
        let chain = GuardChain::new(
            "listing-update",
            vec![
                Box::new(RequireLogin) as Box<dyn Guard>,
                Box::new(RequireListingOwner),
                Box::new(ValidateSchema::new(validate::listing_schema())),
            ],
        )
        .unwrap();

        let mut ctx = GuardContext::new(&session, "/listings/3".to_owned(), &owners)
            .with_listing(ListingId::new(3))
            .with_form(payload(&[
                ("title", "Harbor at Dusk"),
                ("artist", "M. Okafor"),
                ("category", "Painting"),
                ("price", "900.00"),
            ]));
        assert!(chain.run(&mut ctx).await.unwrap().is_none());
    }
}
