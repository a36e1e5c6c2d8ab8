//! Public calculator routes

use askama::Template;
use axum::{
    extract::{Form, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde_json::json;

use crate::error::Result;
use crate::AppState;

use super::dates::format_date;
use super::models::{InsuranceRate, SafeCategory, GUARANTEE_AMOUNT, PACKAGE_PRICE, TRUST_DOCUMENT_PRICE};
use super::requests::CalculateRentalRequest;
use super::responses::{CalculationResponse, PricingSettingsResponse};
use super::services;

/// Calculator page template
#[derive(Template)]
#[template(path = "calculator.html")]
struct CalculatorTemplate {
    categories: Vec<SafeCategory>,
    insurance_rates: Vec<InsuranceRate>,
    has_insurance_rates: bool,
    trust_document_price: String,
    package_price: String,
    guarantee_amount: String,
    today: String,
}

/// Quote page rendered after a form submission
#[derive(Template)]
#[template(path = "quote.html")]
struct QuoteTemplate {
    quote: CalculationResponse,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(calculator_page))
        .route("/health", get(health))
        .route("/api/settings", get(settings))
        .route("/calculate", post(calculate_form))
        .route("/api/calculate", post(calculate))
}

/// Public calculator page
pub async fn calculator_page(State(state): State<AppState>) -> Result<Html<String>> {
    let config = services::pricing_config(&state.db, &state.cache).await?;
    let settings = &config.settings;

    let template = CalculatorTemplate {
        categories: config.categories.clone(),
        insurance_rates: config.insurance_rates.clone(),
        has_insurance_rates: !config.insurance_rates.is_empty(),
        trust_document_price: settings.amount(TRUST_DOCUMENT_PRICE).to_string(),
        package_price: settings.amount(PACKAGE_PRICE).to_string(),
        guarantee_amount: settings.amount(GUARANTEE_AMOUNT).to_string(),
        today: format_date(Local::now().date_naive()),
    };

    Ok(Html(template.render()?))
}

/// Pricing tables for the calculator UI
pub async fn settings(State(state): State<AppState>) -> Result<Json<PricingSettingsResponse>> {
    let config = services::pricing_config(&state.db, &state.cache).await?;

    Ok(Json(PricingSettingsResponse {
        categories: config.categories.clone(),
        insurance_rates: config.insurance_rates.clone(),
        settings: config.settings.clone(),
    }))
}

/// Price a rental request
pub async fn calculate(
    State(state): State<AppState>,
    Json(req): Json<CalculateRentalRequest>,
) -> Result<Json<CalculationResponse>> {
    let (input, result) =
        services::quote(&state.db, &state.cache, req.into(), state.rate_lookup_policy).await?;

    Ok(Json(CalculationResponse::new(&input, result)))
}

/// Price a rental submitted from the calculator page form
pub async fn calculate_form(
    State(state): State<AppState>,
    Form(req): Form<CalculateRentalRequest>,
) -> Result<Html<String>> {
    let (input, result) =
        services::quote(&state.db, &state.cache, req.into(), state.rate_lookup_policy).await?;

    let template = QuoteTemplate {
        quote: CalculationResponse::new(&input, result),
    };
    Ok(Html(template.render()?))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}
