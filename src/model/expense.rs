use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An out-of-pocket expense an employee claims back.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ExpenseEntry {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2024-02-12", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Taxi to client, return")]
    pub description: String,
    #[schema(example = 42.5)]
    pub amount: f64,
    /// Storage key of the uploaded receipt, not the content.
    #[schema(example = "7/0f8a3c1e-receipt.jpg", nullable = true)]
    pub receipt_path: Option<String>,
}
