//! Rental pricing for safe-deposit boxes.
//!
//! `calculators` holds the pure pricing math; the rest of the module loads
//! the rate tables and exposes the calculator over HTTP.

pub mod calculators;
pub mod dates;
pub mod models;
pub mod overlap;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod validation;

// Re-export commonly used items
pub use calculators::{
    calculate_days, calculate_rental, calculate_rental_with_policy, get_insurance_price,
    get_safe_rate, round_money, RateLookupPolicy,
};
pub use dates::{format_date, parse_date};
pub use models::{CalculationInput, CalculationResult, PricingConfig};
pub use routes::router;
pub use services::PricingError;
pub use validation::{validate_request, ValidInput, ValidationError};
