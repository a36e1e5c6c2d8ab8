//! Core pricing calculation functions.
//!
//! Pure functions for rental pricing - no database access.
//! Rate tables are always passed in by the caller.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::Deserialize;

use super::dates::is_weekend;
use super::models::{
    CalculationInput, CalculationResult, ContractType, CoverageType, InsuranceRate, PricingConfig,
    SafeCategory, GUARANTEE_AMOUNT, PACKAGE_PRICE, TRUST_DOCUMENT_PRICE,
};
use super::services::PricingError;

/// What to do when a rate table has no entry for a lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLookupPolicy {
    /// Unknown category or uncovered day count prices at zero.
    #[default]
    ZeroOnMiss,
    /// Unknown category or uncovered day count is an error.
    ErrorOnMiss,
}

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use safebox_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));
/// assert_eq!(round_money(dec!(1.235), 2), dec!(1.24));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Inclusive day span between two calendar dates.
///
/// Both the start and the end date are rented days, so a same-day rental
/// is one day. `end < start` yields zero or a negative count; callers
/// validate before use.
pub fn calculate_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Per-day rate for a category at a given rental length. Unknown category is 0.
pub fn get_safe_rate(category_id: &str, days: i64, categories: &[SafeCategory]) -> Decimal {
    categories
        .iter()
        .find(|c| c.id == category_id)
        .map(|c| c.rates.for_days(days))
        .unwrap_or(Decimal::ZERO)
}

/// Flat insurance price for a day count. First matching range wins; no match is 0.
pub fn get_insurance_price(days: i64, insurance_rates: &[InsuranceRate]) -> Decimal {
    insurance_rates
        .iter()
        .find(|r| r.contains(days))
        .map(|r| r.price)
        .unwrap_or(Decimal::ZERO)
}

/// Rate lookup honoring a miss policy
pub fn resolve_safe_rate(
    category_id: &str,
    days: i64,
    categories: &[SafeCategory],
    policy: RateLookupPolicy,
) -> Result<Decimal, PricingError> {
    match categories.iter().find(|c| c.id == category_id) {
        Some(category) => Ok(category.rates.for_days(days)),
        None => match policy {
            RateLookupPolicy::ZeroOnMiss => Ok(Decimal::ZERO),
            RateLookupPolicy::ErrorOnMiss => Err(PricingError::UnknownCategory {
                category_id: category_id.to_string(),
            }),
        },
    }
}

/// Insurance lookup honoring a miss policy
pub fn resolve_insurance_price(
    days: i64,
    insurance_rates: &[InsuranceRate],
    policy: RateLookupPolicy,
) -> Result<Decimal, PricingError> {
    match insurance_rates.iter().find(|r| r.contains(days)) {
        Some(rate) => Ok(rate.price),
        None => match policy {
            RateLookupPolicy::ZeroOnMiss => Ok(Decimal::ZERO),
            RateLookupPolicy::ErrorOnMiss => Err(PricingError::NoInsuranceTier { days }),
        },
    }
}

/// Price a rental with zero-on-miss lookups.
///
/// # Panics
/// Panics if an amount overflows `Decimal`. Untrusted requests go through
/// `validate_request` and `calculate_rental_with_policy`, which report
/// overflow as an error instead.
pub fn calculate_rental(input: &CalculationInput, config: &PricingConfig) -> CalculationResult {
    let days = calculate_days(input.start_date, input.end_date);
    let safe_rate = get_safe_rate(&input.category, days, &config.categories);
    let insurance = match input.coverage_type {
        CoverageType::Insurance => get_insurance_price(days, &config.insurance_rates),
        CoverageType::Guarantee => Decimal::ZERO,
    };

    match compose(input, config, days, safe_rate, insurance) {
        Ok(result) => result,
        Err(e) => panic!("{}", e),
    }
}

/// Price a rental, failing on lookup misses when the policy asks for it
/// and on amounts too large to represent.
pub fn calculate_rental_with_policy(
    input: &CalculationInput,
    config: &PricingConfig,
    policy: RateLookupPolicy,
) -> Result<CalculationResult, PricingError> {
    let days = calculate_days(input.start_date, input.end_date);
    let safe_rate = resolve_safe_rate(&input.category, days, &config.categories, policy)?;
    let insurance = match input.coverage_type {
        CoverageType::Insurance => resolve_insurance_price(days, &config.insurance_rates, policy)?,
        CoverageType::Guarantee => Decimal::ZERO,
    };

    compose(input, config, days, safe_rate, insurance)
}

fn compose(
    input: &CalculationInput,
    config: &PricingConfig,
    days: i64,
    safe_rate: Decimal,
    insurance: Decimal,
) -> Result<CalculationResult, PricingError> {
    let settings = &config.settings;

    let safe_cost = checked_mul(safe_rate, Decimal::from(days), "safe_cost")?;

    // Extensions never pay the guarantee deposit
    let guarantee = match (input.contract_type, input.coverage_type) {
        (ContractType::New, CoverageType::Guarantee) => settings.amount(GUARANTEE_AMOUNT),
        _ => Decimal::ZERO,
    };

    let trust_documents_cost = checked_mul(
        Decimal::from(input.trust_documents),
        settings.amount(TRUST_DOCUMENT_PRICE),
        "trust_documents_cost",
    )?;
    let packages_cost = checked_mul(
        Decimal::from(input.packages),
        settings.amount(PACKAGE_PRICE),
        "packages_cost",
    )?;

    let total_cost = [insurance, guarantee, trust_documents_cost, packages_cost, input.penalty]
        .into_iter()
        .try_fold(safe_cost, |acc, amount| acc.checked_add(amount))
        .ok_or(PricingError::Overflow { item: "total_cost" })?;

    Ok(CalculationResult {
        days,
        safe_rate,
        safe_cost,
        insurance,
        guarantee,
        trust_documents_cost,
        packages_cost,
        penalty: input.penalty,
        total_cost,
        is_weekend: is_weekend(input.end_date),
    })
}

fn checked_mul(a: Decimal, b: Decimal, item: &'static str) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or(PricingError::Overflow { item })
}
