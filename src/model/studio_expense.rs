use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct StudioExpense {
    pub id: u64,
    #[schema(example = "Camera Warehouse")]
    pub merchant: String,
    #[schema(example = "Replacement lens cap", nullable = true)]
    pub details: Option<String>,
    #[schema(example = 18.0)]
    pub amount: f64,
    #[schema(example = "card")]
    pub method: String,
    #[schema(example = "2024-02-03", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub created_by: u64,
}

/// Business spend paid out of someone's own pocket.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PersonalExpense {
    pub id: u64,
    pub merchant: String,
    pub details: Option<String>,
    pub amount: f64,
    pub method: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub created_by: u64,
    #[schema(example = "Sam", nullable = true)]
    pub paid_by: Option<String>,
}
