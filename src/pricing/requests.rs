//! Request DTOs for pricing API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::dates;
use super::models::{CalculationInput, ContractType, CoverageType};

/// Request to price a rental
#[derive(Debug, Deserialize)]
pub struct CalculateRentalRequest {
    pub category: String,
    pub contract_type: ContractType,
    pub coverage_type: CoverageType,
    #[serde(with = "dates::iso")]
    pub start_date: NaiveDate,
    #[serde(with = "dates::iso")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub penalty: Decimal,
    #[serde(default)]
    pub trust_documents: i64,
    #[serde(default)]
    pub packages: i64,
}

impl From<CalculateRentalRequest> for CalculationInput {
    fn from(req: CalculateRentalRequest) -> Self {
        CalculationInput {
            category: req.category,
            contract_type: req.contract_type,
            coverage_type: req.coverage_type,
            start_date: req.start_date,
            end_date: req.end_date,
            penalty: req.penalty,
            trust_documents: req.trust_documents,
            packages: req.packages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_with_defaults() {
        let req: CalculateRentalRequest = serde_json::from_str(
            r#"{
                "category": "I",
                "contract_type": "new",
                "coverage_type": "insurance",
                "start_date": "2025-01-01",
                "end_date": "2025-01-30"
            }"#,
        )
        .unwrap();

        let input = CalculationInput::from(req);
        assert_eq!(input.penalty, dec!(0));
        assert_eq!(input.trust_documents, 0);
        assert_eq!(input.end_date, NaiveDate::from_ymd_opt(2025, 1, 30).unwrap());
    }

    #[test]
    fn test_penalty_accepts_string_or_number() {
        let base = r#""category":"I","contract_type":"extension","coverage_type":"guarantee","start_date":"2025-01-01","end_date":"2025-01-02""#;
        let as_string: CalculateRentalRequest =
            serde_json::from_str(&format!("{{{base},\"penalty\":\"12.50\"}}")).unwrap();
        let as_number: CalculateRentalRequest =
            serde_json::from_str(&format!("{{{base},\"penalty\":12.5}}")).unwrap();
        assert_eq!(as_string.penalty, dec!(12.50));
        assert_eq!(as_number.penalty, dec!(12.5));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let result: Result<CalculateRentalRequest, _> = serde_json::from_str(
            r#"{"category":"I","contract_type":"new","coverage_type":"insurance","start_date":"01/01/2025","end_date":"2025-01-30"}"#,
        );
        assert!(result.is_err());
    }
}
