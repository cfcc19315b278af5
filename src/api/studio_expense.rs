use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{MonthQuery, require_positive, require_text, to_patch};
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::studio_expense::StudioExpense,
    models::MessageResponse,
    repo::{MySqlRecords, RecordSource, Table},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudioExpense {
    #[schema(example = "Camera Warehouse")]
    pub merchant: String,
    pub details: Option<String>,
    #[schema(example = 18.0)]
    pub amount: f64,
    #[schema(example = "card")]
    pub method: String,
    #[schema(example = "2024-02-03", value_type = String, format = "date")]
    pub date: NaiveDate,
}

impl CreateStudioExpense {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.merchant, "merchant")?;
        require_text(&self.method, "method")?;
        require_positive(self.amount, "amount")
    }
}

/// Partial update shared by studio and personal expenses.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateSpend {
    pub merchant: Option<String>,
    pub details: Option<String>,
    pub amount: Option<f64>,
    pub method: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    /// Personal expenses only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
}

impl UpdateSpend {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(merchant) = &self.merchant {
            require_text(merchant, "merchant")?;
        }
        if let Some(method) = &self.method {
            require_text(method, "method")?;
        }
        if let Some(amount) = self.amount {
            require_positive(amount, "amount")?;
        }
        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/api/studio-expenses",
    params(MonthQuery),
    responses(
        (status = 200, description = "Studio spend for the month, newest first", body = [StudioExpense]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Studio Expenses"
)]
pub async fn list_studio_expenses(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let rows = records.studio_expenses(&query.range()?).await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/studio-expenses",
    request_body = CreateStudioExpense,
    responses(
        (status = 201, description = "Studio expense recorded", body = StudioExpense),
        (status = 400, description = "Missing field or non-positive amount"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Studio Expenses"
)]
pub async fn create_studio_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    payload: web::Json<CreateStudioExpense>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    payload.validate()?;

    let id = records
        .insert(
            Table::StudioExpenses,
            vec![
                ("merchant", payload.merchant.trim().into()),
                ("details", payload.details.clone().into()),
                ("amount", payload.amount.into()),
                ("method", payload.method.trim().into()),
                ("date", payload.date.into()),
                ("created_by", auth.user_id.into()),
            ],
        )
        .await?;
    let row: StudioExpense = records.get(Table::StudioExpenses, id).await?;

    info!(id, amount = row.amount, "Studio expense recorded");
    Ok(HttpResponse::Created().json(row))
}

#[utoipa::path(
    put,
    path = "/api/studio-expenses/{id}",
    params(("id", Path, description = "Studio expense ID")),
    request_body = UpdateSpend,
    responses(
        (status = 200, description = "Studio expense updated", body = StudioExpense),
        (status = 404, description = "Studio expense not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Studio Expenses"
)]
pub async fn update_studio_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
    body: web::Json<UpdateSpend>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();
    body.validate()?;
    if body.paid_by.is_some() {
        return Err(AppError::validation("paid_by only applies to personal expenses").into());
    }

    if !records.update(Table::StudioExpenses, id, &to_patch(&*body)?).await? {
        return Err(AppError::NotFound(Table::StudioExpenses.label()).into());
    }
    let row: StudioExpense = records.get(Table::StudioExpenses, id).await?;

    info!(id, "Studio expense updated");
    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    delete,
    path = "/api/studio-expenses/{id}",
    params(("id", Path, description = "Studio expense ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Studio expense not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Studio Expenses"
)]
pub async fn delete_studio_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    if !records.delete(Table::StudioExpenses, id).await? {
        return Err(AppError::NotFound(Table::StudioExpenses.label()).into());
    }

    info!(id, "Studio expense deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}
