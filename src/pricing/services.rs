//! Pricing service functions with database access.
//!
//! These functions read the pricing tables through the cache and run the
//! pure calculators over them.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::cache::AppCache;
use crate::error::AppError;

use super::calculators::{calculate_rental_with_policy, RateLookupPolicy};
use super::models::{CalculationInput, CalculationResult, PricingConfig};
use super::queries;
use super::validation::{validate_request, ValidInput, ValidationError};

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    UnknownCategory { category_id: String },
    NoInsuranceTier { days: i64 },
    Overflow { item: &'static str },
    Invalid(ValidationError),
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::UnknownCategory { category_id } => {
                write!(f, "Unknown safe category '{}'", category_id)
            }
            PricingError::NoInsuranceTier { days } => {
                write!(f, "No insurance rate covers a {}-day rental", days)
            }
            PricingError::Overflow { item } => {
                write!(f, "Amount too large to price ({})", item)
            }
            PricingError::Invalid(e) => write!(f, "Invalid request: {}", e),
        }
    }
}

impl std::error::Error for PricingError {}

impl From<ValidationError> for PricingError {
    fn from(e: ValidationError) -> Self {
        PricingError::Invalid(e)
    }
}

/// Current pricing tables, cache first.
pub async fn pricing_config(
    pool: &PgPool,
    cache: &AppCache,
) -> Result<Arc<PricingConfig>, AppError> {
    if let Some(cached) = cache.pricing_config().await {
        debug!("Cache HIT for pricing tables");
        return Ok(cached);
    }

    debug!("Cache MISS for pricing tables");
    let config = queries::load_pricing_config(pool).await?;
    Ok(cache.store_pricing_config(config).await)
}

/// Validate a request and price it against the current tables.
pub async fn quote(
    pool: &PgPool,
    cache: &AppCache,
    input: CalculationInput,
    policy: RateLookupPolicy,
) -> Result<(ValidInput, CalculationResult), AppError> {
    let input = validate_request(input).map_err(PricingError::from)?;
    let config = pricing_config(pool, cache).await?;
    let result = calculate_rental_with_policy(&input, &config, policy)?;

    debug!(
        category = %input.category,
        days = result.days,
        total = %result.total_cost,
        "Rental quoted"
    );

    Ok((input, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::UnknownCategory {
            category_id: "XL".to_string(),
        };
        assert!(err.to_string().contains("XL"));

        let err = PricingError::NoInsuranceTier { days: 400 };
        assert!(err.to_string().contains("400"));

        let err = PricingError::Overflow { item: "total_cost" };
        assert!(err.to_string().contains("total_cost"));

        let err = PricingError::from(ValidationError::EndBeforeStart);
        assert!(err.to_string().contains("End date"));
    }
}
