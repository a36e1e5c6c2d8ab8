//! `YYYY-MM-DD` helpers used at the HTTP boundary.

use chrono::{Datelike, NaiveDate, Weekday};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid date '{input}', expected YYYY-MM-DD")]
pub struct DateParseError {
    pub input: String,
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| DateParseError {
        input: input.to_string(),
    })
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Serde adapter for `NaiveDate` fields carried as `YYYY-MM-DD` strings
pub mod iso {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_date(date), "2025-03-07");
    }

    #[test]
    fn test_parse_date_trims_whitespace() {
        let date = parse_date(" 2025-01-30\n").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 30).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("30/01/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
        let err = parse_date("tomorrow").unwrap_err();
        assert!(err.to_string().contains("tomorrow"));
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
    }

    #[test]
    fn test_is_weekend() {
        assert!(is_weekend(NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()));
        assert!(is_weekend(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()));
        assert!(!is_weekend(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()));
    }
}
