//! Price calculator and back office for safe-deposit box rentals.
//!
//! The public side prices a rental from the category rate tiers, the key
//! insurance table and a few configurable amounts. The back office under
//! `/api/admin` maintains those tables along with the safe inventory.

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use cache::AppCache;
use pricing::RateLookupPolicy;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub rate_lookup_policy: RateLookupPolicy,
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    // public calculator only; admin routes stay same-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .merge(pricing::router().layer(cors))
        .nest("/api/admin", admin::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
