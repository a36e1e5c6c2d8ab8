//! Administrative back office.
//!
//! Manages the pricing tables, the physical inventory (blocks and safes) and
//! the administrators themselves. All endpoints except login require an
//! `admin_session` cookie.

pub mod auth;
pub mod models;
pub mod queries;
pub mod routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::AppState;

pub use auth::AdminSession;

/// Routes mounted under `/api/admin`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/me", get(routes::me))
        .route(
            "/categories",
            get(routes::list_categories).post(routes::create_category),
        )
        .route("/categories/:id/rates", put(routes::update_category_rates))
        .route(
            "/insurance-rates",
            get(routes::list_insurance_rates).post(routes::create_insurance_rate),
        )
        .route("/insurance-rates/:id", delete(routes::delete_insurance_rate))
        .route("/settings/:key", put(routes::update_setting))
        .route("/blocks", get(routes::list_blocks).post(routes::create_block))
        .route("/safes", get(routes::list_safes).post(routes::create_safe))
        .route("/safes/:id/status", put(routes::update_safe_status))
        .route(
            "/administrators",
            get(routes::list_administrators).post(routes::create_administrator),
        )
        .route("/logs", get(routes::list_logs))
}
