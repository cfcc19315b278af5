use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::{MonthQuery, require_positive, require_text, studio_expense::UpdateSpend, to_patch};
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::studio_expense::PersonalExpense,
    models::MessageResponse,
    repo::{MySqlRecords, RecordSource, Table},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePersonalExpense {
    #[schema(example = "Hardware Depot")]
    pub merchant: String,
    pub details: Option<String>,
    #[schema(example = 64.2)]
    pub amount: f64,
    #[schema(example = "cash")]
    pub method: String,
    #[schema(example = "2024-02-09", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Who paid out of pocket
    #[schema(example = "Sam")]
    pub paid_by: Option<String>,
}

impl CreatePersonalExpense {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.merchant, "merchant")?;
        require_text(&self.method, "method")?;
        require_positive(self.amount, "amount")
    }
}

#[utoipa::path(
    get,
    path = "/api/personal-expenses",
    params(MonthQuery),
    responses(
        (status = 200, description = "Personal spend for the month, newest first", body = [PersonalExpense]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Personal Expenses"
)]
pub async fn list_personal_expenses(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let rows = records.personal_expenses(&query.range()?).await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/personal-expenses",
    request_body = CreatePersonalExpense,
    responses(
        (status = 201, description = "Personal expense recorded", body = PersonalExpense),
        (status = 400, description = "Missing field or non-positive amount"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Personal Expenses"
)]
pub async fn create_personal_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    payload: web::Json<CreatePersonalExpense>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    payload.validate()?;

    let paid_by = payload
        .paid_by
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let id = records
        .insert(
            Table::PersonalExpenses,
            vec![
                ("merchant", payload.merchant.trim().into()),
                ("details", payload.details.clone().into()),
                ("amount", payload.amount.into()),
                ("method", payload.method.trim().into()),
                ("date", payload.date.into()),
                ("created_by", auth.user_id.into()),
                ("paid_by", paid_by.into()),
            ],
        )
        .await?;
    let row: PersonalExpense = records.get(Table::PersonalExpenses, id).await?;

    info!(id, amount = row.amount, "Personal expense recorded");
    Ok(HttpResponse::Created().json(row))
}

#[utoipa::path(
    put,
    path = "/api/personal-expenses/{id}",
    params(("id", Path, description = "Personal expense ID")),
    request_body = UpdateSpend,
    responses(
        (status = 200, description = "Personal expense updated", body = PersonalExpense),
        (status = 404, description = "Personal expense not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Personal Expenses"
)]
pub async fn update_personal_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
    body: web::Json<UpdateSpend>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();
    body.validate()?;

    if !records.update(Table::PersonalExpenses, id, &to_patch(&*body)?).await? {
        return Err(AppError::NotFound(Table::PersonalExpenses.label()).into());
    }
    let row: PersonalExpense = records.get(Table::PersonalExpenses, id).await?;

    info!(id, "Personal expense updated");
    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    delete,
    path = "/api/personal-expenses/{id}",
    params(("id", Path, description = "Personal expense ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Personal expense not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Personal Expenses"
)]
pub async fn delete_personal_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    if !records.delete(Table::PersonalExpenses, id).await? {
        return Err(AppError::NotFound(Table::PersonalExpenses.label()).into());
    }

    info!(id, "Personal expense deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}
