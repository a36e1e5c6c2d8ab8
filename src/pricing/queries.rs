//! Database queries backing the pricing tables.

use sqlx::PgPool;

use crate::error::AppError;

use super::models::{
    CategoryRow, InsuranceRate, InsuranceRateRow, PricingConfig, SafeCategory, SettingRow,
    Settings,
};

/// Categories joined with their rate tiers
pub async fn fetch_categories(pool: &PgPool) -> Result<Vec<SafeCategory>, AppError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT
            c.id, c.name,
            r.up_to_30, r.from_31_to_90, r.from_91_to_180, r.from_181_to_365
        FROM safe_categories c
        JOIN category_rates r ON r.category_id = c.id
        ORDER BY c.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SafeCategory::from).collect())
}

/// Insurance rate rows, sorted by `min_days` ascending
pub async fn fetch_insurance_rate_rows(pool: &PgPool) -> Result<Vec<InsuranceRateRow>, AppError> {
    let rows = sqlx::query_as::<_, InsuranceRateRow>(
        r#"
        SELECT id, min_days, max_days, price
        FROM insurance_rates
        ORDER BY min_days ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn fetch_insurance_rates(pool: &PgPool) -> Result<Vec<InsuranceRate>, AppError> {
    let rows = fetch_insurance_rate_rows(pool).await?;
    Ok(rows.into_iter().map(InsuranceRate::from).collect())
}

pub async fn fetch_settings(pool: &PgPool) -> Result<Settings, AppError> {
    let rows = sqlx::query_as::<_, SettingRow>("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
}

/// Load every table the calculator reads
pub async fn load_pricing_config(pool: &PgPool) -> Result<PricingConfig, AppError> {
    let categories = fetch_categories(pool).await?;
    let insurance_rates = fetch_insurance_rates(pool).await?;
    let settings = fetch_settings(pool).await?;

    Ok(PricingConfig {
        categories,
        insurance_rates,
        settings,
    })
}
