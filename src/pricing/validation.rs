//! Request validation, run at the API boundary before pricing.

use std::ops::Deref;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::calculators::calculate_days;
use super::models::CalculationInput;

/// Longest rental the calculator accepts (ten years)
pub const MAX_RENTAL_DAYS: i64 = 3650;

/// Largest penalty a single request may carry
pub const MAX_PENALTY: Decimal = dec!(1000000000);

/// Largest trust-document or package count a single request may carry
pub const MAX_COUNT: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Category is required")]
    MissingCategory,

    #[error("End date must not be before start date")]
    EndBeforeStart,

    #[error("Rental of {days} days exceeds the maximum of {max} days")]
    TooLong { days: i64, max: i64 },

    #[error("Penalty must not be negative")]
    NegativePenalty,

    #[error("Penalty must not exceed {max}")]
    PenaltyTooLarge { max: Decimal },

    #[error("{field} must not be negative")]
    NegativeCount { field: &'static str },

    #[error("{field} must not exceed {max}")]
    CountTooLarge { field: &'static str, max: i64 },
}

/// A request that passed `validate_request`
#[derive(Debug, Clone, PartialEq)]
pub struct ValidInput(CalculationInput);

impl ValidInput {
    pub fn into_inner(self) -> CalculationInput {
        self.0
    }
}

impl Deref for ValidInput {
    type Target = CalculationInput;

    fn deref(&self) -> &CalculationInput {
        &self.0
    }
}

pub fn validate_request(input: CalculationInput) -> Result<ValidInput, ValidationError> {
    if input.category.trim().is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    if input.end_date < input.start_date {
        return Err(ValidationError::EndBeforeStart);
    }

    let days = calculate_days(input.start_date, input.end_date);
    if days > MAX_RENTAL_DAYS {
        return Err(ValidationError::TooLong {
            days,
            max: MAX_RENTAL_DAYS,
        });
    }

    if input.penalty < Decimal::ZERO {
        return Err(ValidationError::NegativePenalty);
    }
    if input.penalty > MAX_PENALTY {
        return Err(ValidationError::PenaltyTooLarge { max: MAX_PENALTY });
    }
    check_count("trust_documents", input.trust_documents)?;
    check_count("packages", input.packages)?;

    Ok(ValidInput(input))
}

fn check_count(field: &'static str, count: i64) -> Result<(), ValidationError> {
    if count < 0 {
        return Err(ValidationError::NegativeCount { field });
    }
    if count > MAX_COUNT {
        return Err(ValidationError::CountTooLarge {
            field,
            max: MAX_COUNT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{ContractType, CoverageType};
    use chrono::NaiveDate;

    fn input() -> CalculationInput {
        CalculationInput {
            category: "I".to_string(),
            contract_type: ContractType::New,
            coverage_type: CoverageType::Insurance,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
            penalty: dec!(0),
            trust_documents: 0,
            packages: 0,
        }
    }

    #[test]
    fn test_valid_request_passes_through_unchanged() {
        let valid = validate_request(input()).unwrap();
        assert_eq!(valid.category, "I");
        assert_eq!(valid.into_inner(), input());
    }

    #[test]
    fn test_same_day_rental_is_valid() {
        let mut request = input();
        request.end_date = request.start_date;
        assert!(validate_request(request).is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut request = input();
        request.end_date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(validate_request(request), Err(ValidationError::EndBeforeStart));
    }

    #[test]
    fn test_blank_category_is_rejected() {
        let mut request = input();
        request.category = "  ".to_string();
        assert_eq!(validate_request(request), Err(ValidationError::MissingCategory));
    }

    #[test]
    fn test_negative_amounts_are_rejected() {
        let mut request = input();
        request.penalty = dec!(-1);
        assert_eq!(validate_request(request), Err(ValidationError::NegativePenalty));

        let mut request = input();
        request.packages = -2;
        assert_eq!(
            validate_request(request),
            Err(ValidationError::NegativeCount { field: "packages" })
        );

        let mut request = input();
        request.trust_documents = -1;
        assert_eq!(
            validate_request(request),
            Err(ValidationError::NegativeCount { field: "trust_documents" })
        );
    }

    #[test]
    fn test_overly_long_rental_is_rejected() {
        let mut request = input();
        request.end_date = NaiveDate::from_ymd_opt(2040, 1, 1).unwrap();
        assert!(matches!(
            validate_request(request),
            Err(ValidationError::TooLong { max: MAX_RENTAL_DAYS, .. })
        ));
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let mut request = input();
        request.penalty = Decimal::MAX;
        assert_eq!(
            validate_request(request),
            Err(ValidationError::PenaltyTooLarge { max: MAX_PENALTY })
        );

        let mut request = input();
        request.trust_documents = i64::MAX;
        assert_eq!(
            validate_request(request),
            Err(ValidationError::CountTooLarge {
                field: "trust_documents",
                max: MAX_COUNT
            })
        );

        let mut request = input();
        request.packages = MAX_COUNT + 1;
        assert_eq!(
            validate_request(request),
            Err(ValidationError::CountTooLarge {
                field: "packages",
                max: MAX_COUNT
            })
        );
    }

    #[test]
    fn test_amounts_at_the_limit_are_accepted() {
        let mut request = input();
        request.penalty = MAX_PENALTY;
        request.trust_documents = MAX_COUNT;
        request.packages = MAX_COUNT;
        assert!(validate_request(request).is_ok());
    }
}
