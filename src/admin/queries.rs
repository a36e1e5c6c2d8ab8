//! Database queries for the back office.
//!
//! Writes take a connection so callers can group the change and its
//! change-log entry in one transaction.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::models::{InsuranceRate, InsuranceRateRow, TierRates};

use super::models::{Administrator, Block, ChangeLog, Safe, SafeStatus, SessionRow};

// ==================== administrators & sessions ====================

pub async fn find_administrator(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Administrator>, AppError> {
    let admin = sqlx::query_as::<_, Administrator>(
        r#"
        SELECT id, username, password_hash, created_at
        FROM administrators
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(admin)
}

pub async fn list_administrators(pool: &PgPool) -> Result<Vec<Administrator>, AppError> {
    let admins = sqlx::query_as::<_, Administrator>(
        "SELECT id, username, password_hash, created_at FROM administrators ORDER BY username",
    )
    .fetch_all(pool)
    .await?;

    Ok(admins)
}

pub async fn insert_administrator(
    conn: &mut PgConnection,
    username: &str,
    password_hash: &str,
) -> Result<Administrator, AppError> {
    let admin = sqlx::query_as::<_, Administrator>(
        r#"
        INSERT INTO administrators (id, username, password_hash, created_at)
        VALUES ($1, $2, $3, now())
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(conn)
    .await
    .map_err(|e| conflict_on_unique(e, format!("Administrator '{}' already exists", username)))?;

    Ok(admin)
}

pub async fn insert_session(conn: &mut PgConnection, admin_id: Uuid) -> Result<Uuid, AppError> {
    let token = Uuid::new_v4();
    sqlx::query("INSERT INTO admin_sessions (token, admin_id, created_at) VALUES ($1, $2, now())")
        .bind(token)
        .bind(admin_id)
        .execute(conn)
        .await?;

    Ok(token)
}

pub async fn find_session(pool: &PgPool, token: Uuid) -> Result<Option<SessionRow>, AppError> {
    let session = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT s.token, s.admin_id, a.username
        FROM admin_sessions s
        JOIN administrators a ON a.id = s.admin_id
        WHERE s.token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

pub async fn delete_session(conn: &mut PgConnection, token: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM admin_sessions WHERE token = $1")
        .bind(token)
        .execute(conn)
        .await?;

    Ok(())
}

// ==================== categories & rates ====================

pub async fn insert_category(
    conn: &mut PgConnection,
    id: &str,
    name: &str,
    rates: &TierRates,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO safe_categories (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(|e| conflict_on_unique(e, format!("Category '{}' already exists", id)))?;

    sqlx::query(
        r#"
        INSERT INTO category_rates
            (category_id, up_to_30, from_31_to_90, from_91_to_180, from_181_to_365)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(rates.up_to_30)
    .bind(rates.from_31_to_90)
    .bind(rates.from_91_to_180)
    .bind(rates.from_181_to_365)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Returns false when the category has no rate row
pub async fn update_category_rates(
    conn: &mut PgConnection,
    id: &str,
    rates: &TierRates,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE category_rates
        SET up_to_30 = $2, from_31_to_90 = $3, from_91_to_180 = $4, from_181_to_365 = $5
        WHERE category_id = $1
        "#,
    )
    .bind(id)
    .bind(rates.up_to_30)
    .bind(rates.from_31_to_90)
    .bind(rates.from_91_to_180)
    .bind(rates.from_181_to_365)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn category_exists(pool: &PgPool, id: &str) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM safe_categories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Read the insurance table under a lock that blocks concurrent writers
/// until the surrounding transaction ends.
pub async fn lock_insurance_rates(conn: &mut PgConnection) -> Result<Vec<InsuranceRate>, AppError> {
    sqlx::query("LOCK TABLE insurance_rates IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *conn)
        .await?;

    let rows = sqlx::query_as::<_, InsuranceRateRow>(
        "SELECT id, min_days, max_days, price FROM insurance_rates ORDER BY min_days, id",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(InsuranceRate::from).collect())
}

pub async fn insert_insurance_rate(
    conn: &mut PgConnection,
    min_days: i32,
    max_days: i32,
    price: Decimal,
) -> Result<InsuranceRateRow, AppError> {
    let row = sqlx::query_as::<_, InsuranceRateRow>(
        r#"
        INSERT INTO insurance_rates (min_days, max_days, price)
        VALUES ($1, $2, $3)
        RETURNING id, min_days, max_days, price
        "#,
    )
    .bind(min_days)
    .bind(max_days)
    .bind(price)
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// Returns false when no rate had that id
pub async fn delete_insurance_rate(conn: &mut PgConnection, id: i32) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM insurance_rates WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn upsert_setting(conn: &mut PgConnection, key: &str, value: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(conn)
    .await?;

    Ok(())
}

// ==================== blocks & safes ====================

pub async fn list_blocks(pool: &PgPool) -> Result<Vec<Block>, AppError> {
    let blocks = sqlx::query_as::<_, Block>("SELECT id, name, location FROM blocks ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(blocks)
}

pub async fn insert_block(
    conn: &mut PgConnection,
    name: &str,
    location: Option<&str>,
) -> Result<Block, AppError> {
    let block = sqlx::query_as::<_, Block>(
        "INSERT INTO blocks (name, location) VALUES ($1, $2) RETURNING id, name, location",
    )
    .bind(name)
    .bind(location)
    .fetch_one(conn)
    .await
    .map_err(|e| conflict_on_unique(e, format!("Block '{}' already exists", name)))?;

    Ok(block)
}

pub async fn list_safes(pool: &PgPool) -> Result<Vec<Safe>, AppError> {
    let safes = sqlx::query_as::<_, Safe>(
        "SELECT id, number, category_id, block_id, status FROM safes ORDER BY number",
    )
    .fetch_all(pool)
    .await?;

    Ok(safes)
}

pub async fn insert_safe(
    conn: &mut PgConnection,
    number: &str,
    category_id: &str,
    block_id: Option<i32>,
    status: SafeStatus,
) -> Result<Safe, AppError> {
    let safe = sqlx::query_as::<_, Safe>(
        r#"
        INSERT INTO safes (number, category_id, block_id, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, number, category_id, block_id, status
        "#,
    )
    .bind(number)
    .bind(category_id)
    .bind(block_id)
    .bind(status.as_str())
    .fetch_one(conn)
    .await
    .map_err(|e| {
        let missing_ref = e
            .as_database_error()
            .is_some_and(|db| db.is_foreign_key_violation());
        if missing_ref {
            AppError::Validation("Unknown category or block".to_string())
        } else {
            conflict_on_unique(e, format!("Safe '{}' already exists", number))
        }
    })?;

    Ok(safe)
}

pub async fn update_safe_status(
    conn: &mut PgConnection,
    id: i32,
    status: SafeStatus,
) -> Result<Option<Safe>, AppError> {
    let safe = sqlx::query_as::<_, Safe>(
        r#"
        UPDATE safes SET status = $2
        WHERE id = $1
        RETURNING id, number, category_id, block_id, status
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(conn)
    .await?;

    Ok(safe)
}

// ==================== change logs ====================

pub async fn insert_change_log(
    conn: &mut PgConnection,
    admin_id: Uuid,
    entity: &str,
    entity_id: &str,
    action: &str,
    details: serde_json::Value,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO change_logs (admin_id, entity, entity_id, action, details, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        "#,
    )
    .bind(admin_id)
    .bind(entity)
    .bind(entity_id)
    .bind(action)
    .bind(details)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn list_change_logs(pool: &PgPool, limit: i64) -> Result<Vec<ChangeLog>, AppError> {
    let logs = sqlx::query_as::<_, ChangeLog>(
        r#"
        SELECT id, admin_id, entity, entity_id, action, details, created_at
        FROM change_logs
        ORDER BY created_at DESC, id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

fn conflict_on_unique(e: sqlx::Error, message: String) -> AppError {
    let duplicate = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if duplicate {
        AppError::Conflict(message)
    } else {
        AppError::Database(e)
    }
}
