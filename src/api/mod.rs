pub mod company_income;
pub mod expense;
pub mod export;
pub mod personal_expense;
pub mod profile;
pub mod report;
pub mod storage;
pub mod studio_expense;
pub mod timesheet;
pub mod vendor;
pub mod vendor_bill;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::IntoParams;

use crate::{
    error::AppError,
    storage::validate_key,
    utils::date_range::{DateRange, month_range, month_range_of},
};

/// `?month=YYYY-MM&employee_id=..` shared by list and report endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MonthQuery {
    /// Month as YYYY-MM; defaults to the current month
    #[param(example = "2024-02")]
    pub month: Option<String>,
    /// Restrict to one employee (admins only; staff always see their own)
    pub employee_id: Option<u64>,
}

impl MonthQuery {
    pub fn range(&self) -> Result<DateRange, AppError> {
        resolve_month(self.month.as_deref())
    }
}

pub fn resolve_month(month: Option<&str>) -> Result<DateRange, AppError> {
    match month.map(str::trim).filter(|m| !m.is_empty()) {
        Some(token) => month_range(token),
        None => Ok(month_range_of(Utc::now().date_naive())),
    }
}

pub fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

pub fn require_positive(value: f64, field: &str) -> Result<(), AppError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::validation(format!("{field} must be greater than zero")))
    }
}

pub fn require_storage_key(key: Option<&str>) -> Result<(), AppError> {
    key.map_or(Ok(()), |k| validate_key(k).map(|_| ()))
}

/// Serializes a partial update, dropping fields that were not sent and
/// trimming text the way the create forms do.
pub fn to_patch<T: Serialize>(update: &T) -> Result<Value, AppError> {
    let value = serde_json::to_value(update)
        .map_err(|e| AppError::validation(format!("Invalid update: {e}")))?;

    match value {
        Value::Object(map) => Ok(Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| match v {
                    Value::String(s) => (k, Value::String(s.trim().to_string())),
                    other => (k, other),
                })
                .collect(),
        )),
        _ => Err(AppError::validation("Payload must be a JSON object")),
    }
}
