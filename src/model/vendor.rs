use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Vendor {
    #[schema(example = 4)]
    pub id: u64,
    #[schema(example = "Print House Ltd")]
    pub name: String,
    #[schema(example = "billing@printhouse.test", nullable = true)]
    pub contact_email: Option<String>,
}
