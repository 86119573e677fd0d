//! End-to-end checks of the router and guard pipeline.
//!
//! These run without a database: the pool is created lazily and every
//! exercised path is rejected by a guard (or answered statically) before any
//! query would run. Sessions use the in-memory store.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use artecho_site::config::{MediaConfig, SiteConfig};
use artecho_site::routes;
use artecho_site::state::AppState;

fn test_config() -> SiteConfig {
    SiteConfig {
        database_url: SecretString::from("postgres://localhost:1/unreachable"),
        host: "127.0.0.1".parse().expect("valid address"),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("kJ8#mP2$vQ9@xR4!nT6&wY1*zB3^cD5%"),
        media: MediaConfig {
            cloud_name: "demo".to_owned(),
            upload_preset: "unsigned".to_owned(),
            folder: "artecho".to_owned(),
        },
        sentry_dsn: None,
    }
}

fn test_app() -> Router {
    // Lazy pool: never connects unless a handler actually queries
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:1/unreachable")
        .expect("lazy pool");

    let state = AppState::new(test_config(), pool).expect("guard chains build");
    let session_layer = SessionManagerLayer::new(MemoryStore::default());

    routes::create_router()
        .layer(session_layer)
        .with_state(state)
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn health_answers_without_a_database() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn root_redirects_to_gallery() {
    let response = test_app()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/listings");
}

#[tokio::test]
async fn anonymous_new_listing_form_is_sent_to_login() {
    let response = test_app()
        .oneshot(
            Request::get("/listings/new")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn anonymous_review_post_is_sent_to_login() {
    let response = test_app()
        .oneshot(
            Request::post("/listings/3/reviews")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from("comment=Lovely&rating=5"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn anonymous_listing_delete_is_sent_to_login() {
    let response = test_app()
        .oneshot(
            Request::post("/listings/3/delete")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn unmatched_route_gets_the_fixed_not_found_page() {
    let response = test_app()
        .oneshot(
            Request::get("/no/such/page")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_category_slug_is_not_found() {
    let response = test_app()
        .oneshot(
            Request::get("/listings/category/frescoes")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_page_renders_for_anonymous_visitors() {
    let response = test_app()
        .oneshot(Request::get("/login").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}
