//! Back-office route handlers.
//!
//! Every write runs in a transaction together with its change-log entry.
//! Writes that touch pricing tables drop the cached pricing snapshot.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use crate::error::{AppError, Result};
use crate::pricing::models::{InsuranceRate, InsuranceRateRow, SafeCategory, TierRates};
use crate::pricing::{overlap, queries as pricing_queries};
use crate::AppState;

use super::auth::{clear_session_cookie, hash_password, session_cookie, verify_password, AdminSession};
use super::models::{
    AdminResponse, Administrator, Block, ChangeLog, CreateAdministratorRequest, CreateBlockRequest,
    CreateCategoryRequest, CreateInsuranceRateRequest, CreateSafeRequest, LogQuery, LoginRequest,
    Safe, UpdateSafeStatusRequest, UpdateSettingRequest,
};
use super::queries;

// ==================== session ====================

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let admin = queries::find_administrator(&state.db, req.username.trim())
        .await?
        .filter(|admin| verify_password(&req.password, &admin.password_hash))
        .ok_or(AppError::Unauthorized)?;

    let mut tx = state.db.begin().await?;
    let token = queries::insert_session(&mut *tx, admin.id).await?;
    queries::insert_change_log(
        &mut *tx,
        admin.id,
        "session",
        &admin.id.to_string(),
        "login",
        json!({}),
    )
    .await?;
    tx.commit().await?;

    info!(username = %admin.username, "Administrator logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(token))],
        Json(AdminResponse {
            id: admin.id,
            username: admin.username,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<impl IntoResponse> {
    let mut tx = state.db.begin().await?;
    queries::delete_session(&mut *tx, session.token).await?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "session",
        &session.admin_id.to_string(),
        "logout",
        json!({}),
    )
    .await?;
    tx.commit().await?;

    info!(username = %session.username, "Administrator logged out");

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    ))
}

pub async fn me(session: AdminSession) -> Json<AdminResponse> {
    Json(AdminResponse {
        id: session.admin_id,
        username: session.username,
    })
}

// ==================== categories & rates ====================

pub async fn list_categories(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<SafeCategory>>> {
    Ok(Json(pricing_queries::fetch_categories(&state.db).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<SafeCategory>)> {
    let id = req.id.trim().to_string();
    let name = req.name.trim().to_string();
    if id.is_empty() || name.is_empty() {
        return Err(AppError::Validation("Category id and name are required".to_string()));
    }
    check_rates(&req.rates)?;

    let mut tx = state.db.begin().await?;
    queries::insert_category(&mut *tx, &id, &name, &req.rates).await?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "category",
        &id,
        "create",
        json!({ "name": name, "rates": req.rates }),
    )
    .await?;
    tx.commit().await?;
    state.cache.invalidate_pricing().await;

    Ok((
        StatusCode::CREATED,
        Json(SafeCategory {
            id,
            name,
            rates: req.rates,
        }),
    ))
}

pub async fn update_category_rates(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<String>,
    Json(rates): Json<TierRates>,
) -> Result<Json<TierRates>> {
    check_rates(&rates)?;

    let mut tx = state.db.begin().await?;
    if !queries::update_category_rates(&mut *tx, &id, &rates).await? {
        return Err(AppError::NotFound);
    }
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "category_rates",
        &id,
        "update",
        json!({ "rates": rates }),
    )
    .await?;
    tx.commit().await?;
    state.cache.invalidate_pricing().await;

    info!(category = %id, "Category rates updated");
    Ok(Json(rates))
}

fn check_rates(rates: &TierRates) -> Result<()> {
    if rates.all_non_negative() {
        Ok(())
    } else {
        Err(AppError::Validation("Rates must not be negative".to_string()))
    }
}

// ==================== insurance rates ====================

pub async fn list_insurance_rates(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<InsuranceRateRow>>> {
    Ok(Json(pricing_queries::fetch_insurance_rate_rows(&state.db).await?))
}

pub async fn create_insurance_rate(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateInsuranceRateRequest>,
) -> Result<(StatusCode, Json<InsuranceRateRow>)> {
    if req.min_days < 1 {
        return Err(AppError::Validation("min_days must be at least 1".to_string()));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::Validation("Price must not be negative".to_string()));
    }
    if req.min_days > req.max_days {
        return Err(AppError::Validation(
            "min_days must not exceed max_days".to_string(),
        ));
    }
    let candidate = InsuranceRate {
        min_days: i64::from(req.min_days),
        max_days: i64::from(req.max_days),
        price: req.price,
    };

    let mut tx = state.db.begin().await?;
    let table = queries::lock_insurance_rates(&mut *tx).await?;
    if let Some(existing) = overlap::find_overlap_with(&table, &candidate) {
        let other = &table[existing];
        return Err(AppError::Conflict(format!(
            "Range {}-{} overlaps existing range {}-{}",
            req.min_days, req.max_days, other.min_days, other.max_days
        )));
    }

    let row = queries::insert_insurance_rate(&mut *tx, req.min_days, req.max_days, req.price).await?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "insurance_rate",
        &row.id.to_string(),
        "create",
        json!({ "min_days": row.min_days, "max_days": row.max_days, "price": row.price }),
    )
    .await?;
    tx.commit().await?;
    state.cache.invalidate_pricing().await;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn delete_insurance_rate(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let mut tx = state.db.begin().await?;
    if !queries::delete_insurance_rate(&mut *tx, id).await? {
        return Err(AppError::NotFound);
    }
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "insurance_rate",
        &id.to_string(),
        "delete",
        json!({}),
    )
    .await?;
    tx.commit().await?;
    state.cache.invalidate_pricing().await;

    Ok(StatusCode::NO_CONTENT)
}

// ==================== settings ====================

pub async fn update_setting(
    State(state): State<AppState>,
    session: AdminSession,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<serde_json::Value>> {
    if !is_setting_key(&key) {
        return Err(AppError::Validation(format!("Invalid setting key '{}'", key)));
    }
    let value = req.value.trim();
    match Decimal::from_str(value) {
        Ok(amount) if amount >= Decimal::ZERO => {}
        _ => {
            return Err(AppError::Validation(format!(
                "Setting '{}' must be a non-negative amount",
                key
            )))
        }
    }

    let mut tx = state.db.begin().await?;
    queries::upsert_setting(&mut *tx, &key, value).await?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "setting",
        &key,
        "update",
        json!({ "value": value }),
    )
    .await?;
    tx.commit().await?;
    state.cache.invalidate_pricing().await;

    Ok(Json(json!({ "key": key, "value": value })))
}

fn is_setting_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

// ==================== blocks & safes ====================

pub async fn list_blocks(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Block>>> {
    Ok(Json(queries::list_blocks(&state.db).await?))
}

pub async fn create_block(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<Block>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Block name is required".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let block = queries::insert_block(&mut *tx, name, req.location.as_deref()).await?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "block",
        &block.id.to_string(),
        "create",
        json!({ "name": block.name, "location": block.location }),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn list_safes(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Safe>>> {
    Ok(Json(queries::list_safes(&state.db).await?))
}

pub async fn create_safe(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateSafeRequest>,
) -> Result<(StatusCode, Json<Safe>)> {
    let number = req.number.trim();
    if number.is_empty() {
        return Err(AppError::Validation("Safe number is required".to_string()));
    }
    if !queries::category_exists(&state.db, &req.category_id).await? {
        return Err(AppError::Validation(format!(
            "Unknown category '{}'",
            req.category_id
        )));
    }

    let mut tx = state.db.begin().await?;
    let safe =
        queries::insert_safe(&mut *tx, number, &req.category_id, req.block_id, req.status).await?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "safe",
        &safe.id.to_string(),
        "create",
        json!({ "number": safe.number, "category_id": safe.category_id, "status": safe.status }),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(safe)))
}

pub async fn update_safe_status(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i32>,
    Json(req): Json<UpdateSafeStatusRequest>,
) -> Result<Json<Safe>> {
    let mut tx = state.db.begin().await?;
    let safe = queries::update_safe_status(&mut *tx, id, req.status)
        .await?
        .ok_or(AppError::NotFound)?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "safe",
        &id.to_string(),
        "status",
        json!({ "status": req.status }),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(safe))
}

// ==================== administrators ====================

pub async fn list_administrators(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Administrator>>> {
    Ok(Json(queries::list_administrators(&state.db).await?))
}

pub async fn create_administrator(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateAdministratorRequest>,
) -> Result<(StatusCode, Json<Administrator>)> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;
    let admin = queries::insert_administrator(&mut *tx, username, &hash_password(&req.password)).await?;
    queries::insert_change_log(
        &mut *tx,
        session.admin_id,
        "administrator",
        &admin.id.to_string(),
        "create",
        json!({ "username": admin.username }),
    )
    .await?;
    tx.commit().await?;

    info!(created_by = %session.username, username = %admin.username, "Administrator created");
    Ok((StatusCode::CREATED, Json(admin)))
}

// ==================== change logs ====================

pub async fn list_logs(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<ChangeLog>>> {
    Ok(Json(
        queries::list_change_logs(&state.db, query.clamped_limit()).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_setting_keys() {
        assert!(is_setting_key("guarantee_amount"));
        assert!(is_setting_key("tier2_discount"));
        assert!(!is_setting_key(""));
        assert!(!is_setting_key("Package-Price"));
    }

    #[test]
    fn test_check_rates_rejects_negative_tier() {
        let mut rates = TierRates {
            up_to_30: dec!(39),
            from_31_to_90: dec!(25),
            from_91_to_180: dec!(20),
            from_181_to_365: dec!(15),
        };
        assert!(check_rates(&rates).is_ok());
        rates.from_91_to_180 = dec!(-1);
        assert!(matches!(check_rates(&rates), Err(AppError::Validation(_))));
    }
}
