//! Seed the database with demo accounts and listings.
//!
//! Intended for local development: creates two demo users and a handful of
//! listings with reviews so the gallery has something to show. Running it
//! twice is safe; existing usernames are skipped.

use secrecy::SecretString;
use sqlx::PgPool;

use artecho_core::{Category, Price, Rating, UserId};
use artecho_site::db::listings::ListingRepository;
use artecho_site::db::reviews::ReviewRepository;
use artecho_site::db::users::UserRepository;
use artecho_site::models::{ListingDraft, ReviewDraft};
use artecho_site::services::auth::{AuthError, AuthService};

struct DemoListing {
    title: &'static str,
    artist: &'static str,
    category: Category,
    price: &'static str,
    medium: &'static str,
    year: i32,
}

const DEMO_LISTINGS: &[DemoListing] = &[
    DemoListing {
        title: "Harbor at Dusk",
        artist: "M. Okafor",
        category: Category::Painting,
        price: "850.00",
        medium: "Oil on Canvas",
        year: 2021,
    },
    DemoListing {
        title: "Tidal Form III",
        artist: "L. Brandt",
        category: Category::Sculpture,
        price: "2400.00",
        medium: "Cast Bronze",
        year: 2019,
    },
    DemoListing {
        title: "Static Bloom",
        artist: "R. Ishida",
        category: Category::DigitalArt,
        price: "320.00",
        medium: "Archival Pigment Print",
        year: 2024,
    },
];

/// Run the seed command.
///
/// # Errors
///
/// Returns an error if the database is unreachable or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ARTECHO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "ARTECHO_DATABASE_URL is not set")?;
    let database_url = SecretString::from(database_url);

    let pool = artecho_site::db::create_pool(&database_url).await?;

    let alice = ensure_user(&pool, "alice", "alice@example.com").await?;
    let bruno = ensure_user(&pool, "bruno", "bruno@example.com").await?;

    let listings = ListingRepository::new(&pool);
    let reviews = ReviewRepository::new(&pool);

    for demo in DEMO_LISTINGS {
        let draft = ListingDraft {
            title: demo.title.to_owned(),
            artist: demo.artist.to_owned(),
            category: demo.category,
            price: Price::parse(demo.price)?,
            medium: Some(demo.medium.to_owned()),
            description: None,
            year_created: demo.year,
        };
        let listing = listings.create(&draft, alice, None).await?;
        tracing::info!(listing = %listing.id, title = demo.title, "seeded listing");

        let review = ReviewDraft {
            comment: "Saw this in person - even better up close.".to_owned(),
            rating: Rating::new(5)?,
        };
        reviews.create(listing.id, bruno, &review).await?;
    }

    tracing::info!("Seed complete!");
    Ok(())
}

/// Create a demo user, or reuse the account if it already exists.
async fn ensure_user(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let service = AuthService::new(pool);

    match service.register(username, email, "demo-password-1234").await {
        Ok(user) => {
            tracing::info!(user = %user.id, username, "seeded user");
            Ok(user.id)
        }
        Err(AuthError::UserAlreadyExists) => {
            let user = UserRepository::new(pool)
                .get_by_username(username)
                .await?
                .ok_or("user vanished between conflict and lookup")?;
            Ok(user.id)
        }
        Err(e) => Err(e.into()),
    }
}
