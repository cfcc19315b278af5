use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, sqlx::Type, Display,
    EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct VendorBill {
    pub id: u64,
    pub vendor_id: u64,
    #[schema(example = 350.0)]
    pub amount: f64,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub invoice_path: Option<String>,
    pub created_by: u64,
    pub paid_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub paid_at: Option<NaiveDateTime>,
}
