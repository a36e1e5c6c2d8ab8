//! Back-office models and request DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::pricing::models::TierRates;

/// Administrator from administrators. The hash never leaves the server.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Administrator {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Session joined with its administrator
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub token: Uuid,
    pub admin_id: Uuid,
    pub username: String,
}

/// Physical cabinet grouping safes
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Block {
    pub id: i32,
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Safe {
    pub id: i32,
    pub number: String,
    pub category_id: String,
    pub block_id: Option<i32>,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeStatus {
    Available,
    Rented,
    Maintenance,
}

impl SafeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeStatus::Available => "available",
            SafeStatus::Rented => "rented",
            SafeStatus::Maintenance => "maintenance",
        }
    }
}

/// Audit entry from change_logs
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeLog {
    pub id: i64,
    pub admin_id: Option<Uuid>,
    pub entity: String,
    pub entity_id: String,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdministratorRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub id: String,
    pub name: String,
    pub rates: TierRates,
}

#[derive(Debug, Deserialize)]
pub struct CreateInsuranceRateRequest {
    pub min_days: i32,
    pub max_days: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSafeRequest {
    pub number: String,
    pub category_id: String,
    #[serde(default)]
    pub block_id: Option<i32>,
    #[serde(default = "default_status")]
    pub status: SafeStatus,
}

fn default_status() -> SafeStatus {
    SafeStatus::Available
}

#[derive(Debug, Deserialize)]
pub struct UpdateSafeStatusRequest {
    pub status: SafeStatus,
}

/// Query parameters for the change log listing
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub const MAX_LOG_LIMIT: i64 = 500;

impl LogQuery {
    pub fn clamped_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LOG_LIMIT)
    }
}
