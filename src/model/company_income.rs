use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Whether a payment settles the whole job or only part of it.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, sqlx::Type, Display,
    EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentType {
    Full,
    Deposit,
    Balance,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, sqlx::Type, Display,
    EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CompanyIncomeRecord {
    pub id: u64,
    /// Brand the income is booked under.
    #[schema(example = "Studio North")]
    pub company_name: String,
    #[schema(example = "Harbor Cafe", nullable = true)]
    pub client: Option<String>,
    #[schema(example = 1200.0)]
    pub amount: f64,
    pub payment_type: PaymentType,
    #[schema(example = "bank_transfer")]
    pub payment_method: String,
    #[schema(example = "2024-02-20", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub job_status: JobStatus,
    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub job_completion_date: Option<NaiveDate>,
    pub payment_slip_path: Option<String>,
    pub created_by: u64,
}
