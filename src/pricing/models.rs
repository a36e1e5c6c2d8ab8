//! Pricing domain types and the database rows they are built from.
//!
//! Row types use sqlx's FromRow derive for direct database deserialization;
//! the domain types are what the calculator consumes.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Settings key for the unit price of a trust document
pub const TRUST_DOCUMENT_PRICE: &str = "trust_document_price";
/// Settings key for the unit price of a package
pub const PACKAGE_PRICE: &str = "package_price";
/// Settings key for the refundable guarantee deposit
pub const GUARANTEE_AMOUNT: &str = "guarantee_amount";

/// Per-day rates of a category, one per duration tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRates {
    #[serde(with = "rust_decimal::serde::str")]
    pub up_to_30: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub from_31_to_90: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub from_91_to_180: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub from_181_to_365: Decimal,
}

impl TierRates {
    /// Rate for a day count. Tiers close on the upper bound; anything past
    /// 365 days stays on the last tier.
    pub fn for_days(&self, days: i64) -> Decimal {
        if days <= 30 {
            self.up_to_30
        } else if days <= 90 {
            self.from_31_to_90
        } else if days <= 180 {
            self.from_91_to_180
        } else {
            self.from_181_to_365
        }
    }

    /// True when every tier rate is zero or positive
    pub fn all_non_negative(&self) -> bool {
        [
            self.up_to_30,
            self.from_31_to_90,
            self.from_91_to_180,
            self.from_181_to_365,
        ]
        .iter()
        .all(|r| !r.is_sign_negative())
    }
}

/// A safe-box size/class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeCategory {
    pub id: String,
    pub name: String,
    pub rates: TierRates,
}

/// Flat key-insurance price for an inclusive day range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceRate {
    pub min_days: i64,
    pub max_days: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl InsuranceRate {
    pub fn contains(&self, days: i64) -> bool {
        days >= self.min_days && days <= self.max_days
    }
}

/// Configurable amounts stored as numeric strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub HashMap<String, String>);

impl Settings {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Parse a setting as money. Missing or non-numeric values count as zero.
    pub fn amount(&self, key: &str) -> Decimal {
        self.get(key)
            .and_then(|raw| Decimal::from_str(raw.trim()).ok())
            .unwrap_or(Decimal::ZERO)
    }
}

impl FromIterator<(String, String)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Settings(iter.into_iter().collect())
    }
}

/// Everything the calculator reads besides the request itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub categories: Vec<SafeCategory>,
    pub insurance_rates: Vec<InsuranceRate>,
    pub settings: Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    New,
    Extension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageType {
    Insurance,
    Guarantee,
}

/// A single rental request to be priced
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationInput {
    pub category: String,
    pub contract_type: ContractType,
    pub coverage_type: CoverageType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub penalty: Decimal,
    pub trust_documents: i64,
    pub packages: i64,
}

/// Itemized cost breakdown for one rental
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationResult {
    pub days: i64,
    pub safe_rate: Decimal,
    pub safe_cost: Decimal,
    pub insurance: Decimal,
    pub guarantee: Decimal,
    pub trust_documents_cost: Decimal,
    pub packages_cost: Decimal,
    pub penalty: Decimal,
    pub total_cost: Decimal,
    pub is_weekend: bool,
}

/// Category joined with its rate tiers (safe_categories + category_rates)
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub up_to_30: Decimal,
    pub from_31_to_90: Decimal,
    pub from_91_to_180: Decimal,
    pub from_181_to_365: Decimal,
}

impl From<CategoryRow> for SafeCategory {
    fn from(row: CategoryRow) -> Self {
        SafeCategory {
            id: row.id,
            name: row.name,
            rates: TierRates {
                up_to_30: row.up_to_30,
                from_31_to_90: row.from_31_to_90,
                from_91_to_180: row.from_91_to_180,
                from_181_to_365: row.from_181_to_365,
            },
        }
    }
}

/// Insurance rate from insurance_rates
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InsuranceRateRow {
    pub id: i32,
    pub min_days: i32,
    pub max_days: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl From<InsuranceRateRow> for InsuranceRate {
    fn from(row: InsuranceRateRow) -> Self {
        InsuranceRate {
            min_days: i64::from(row.min_days),
            max_days: i64::from(row.max_days),
            price: row.price,
        }
    }
}

/// Key/value pair from settings
#[derive(Debug, Clone, FromRow)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settings_amount_parses_numeric_strings() {
        let mut settings = Settings::default();
        settings.insert(TRUST_DOCUMENT_PRICE, "300");
        settings.insert(PACKAGE_PRICE, " 49.50 ");
        assert_eq!(settings.amount(TRUST_DOCUMENT_PRICE), dec!(300));
        assert_eq!(settings.amount(PACKAGE_PRICE), dec!(49.50));
    }

    #[test]
    fn test_settings_amount_falls_back_to_zero() {
        let mut settings = Settings::default();
        settings.insert(GUARANTEE_AMOUNT, "not a number");
        assert_eq!(settings.amount(GUARANTEE_AMOUNT), dec!(0));
        assert_eq!(settings.amount("missing"), dec!(0));
    }

    #[test]
    fn test_contract_and_coverage_serde_names() {
        assert_eq!(serde_json::to_string(&ContractType::Extension).unwrap(), "\"extension\"");
        let coverage: CoverageType = serde_json::from_str("\"guarantee\"").unwrap();
        assert_eq!(coverage, CoverageType::Guarantee);
    }

    #[test]
    fn test_category_row_conversion() {
        let row = CategoryRow {
            id: "I".to_string(),
            name: "Small".to_string(),
            up_to_30: dec!(39),
            from_31_to_90: dec!(25),
            from_91_to_180: dec!(20),
            from_181_to_365: dec!(15),
        };
        let category = SafeCategory::from(row);
        assert_eq!(category.rates.for_days(31), dec!(25));
        assert!(category.rates.all_non_negative());
    }
}
