//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::round_money;
use super::dates::format_date;
use super::models::{CalculationResult, InsuranceRate, SafeCategory, Settings};
use super::validation::ValidInput;

/// Response for a rental calculation. Money is rendered as strings with two
/// decimal places.
#[derive(Debug, Serialize)]
pub struct CalculationResponse {
    pub category: String,
    pub start_date: String,
    pub end_date: String,
    pub days: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub safe_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub safe_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub insurance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub guarantee: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub trust_documents_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub packages_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub penalty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cost: Decimal,
    pub is_weekend: bool,
}

impl CalculationResponse {
    pub fn new(input: &ValidInput, result: CalculationResult) -> Self {
        let money = |amount: Decimal| {
            let mut rounded = round_money(amount, 2);
            rounded.rescale(2);
            rounded
        };
        Self {
            category: input.category.clone(),
            start_date: format_date(input.start_date),
            end_date: format_date(input.end_date),
            days: result.days,
            safe_rate: money(result.safe_rate),
            safe_cost: money(result.safe_cost),
            insurance: money(result.insurance),
            guarantee: money(result.guarantee),
            trust_documents_cost: money(result.trust_documents_cost),
            packages_cost: money(result.packages_cost),
            penalty: money(result.penalty),
            total_cost: money(result.total_cost),
            is_weekend: result.is_weekend,
        }
    }
}

/// Response for the settings endpoint feeding the calculator UI
#[derive(Debug, Serialize)]
pub struct PricingSettingsResponse {
    pub categories: Vec<SafeCategory>,
    pub insurance_rates: Vec<InsuranceRate>,
    pub settings: Settings,
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
