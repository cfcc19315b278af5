use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{MonthQuery, require_positive, require_storage_key, require_text, to_patch};
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::expense::ExpenseEntry,
    models::MessageResponse,
    repo::{MySqlRecords, RecordSource, Table},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExpense {
    /// Admins may file on behalf of an employee; ignored for staff
    pub user_id: Option<u64>,
    #[schema(example = "2024-02-12", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Taxi to client, return")]
    pub description: String,
    #[schema(example = 42.5)]
    pub amount: f64,
    /// Key returned by the receipts upload
    pub receipt_path: Option<String>,
}

impl CreateExpense {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.description, "description")?;
        require_positive(self.amount, "amount")?;
        require_storage_key(self.receipt_path.as_deref())
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateExpense {
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub receipt_path: Option<String>,
}

impl UpdateExpense {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(description) = &self.description {
            require_text(description, "description")?;
        }
        if let Some(amount) = self.amount {
            require_positive(amount, "amount")?;
        }
        require_storage_key(self.receipt_path.as_deref())
    }
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    params(MonthQuery),
    responses(
        (status = 200, description = "Expenses for the month, newest first", body = [ExpenseEntry]),
        (status = 400, description = "Invalid month")
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn list_expenses(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let range = query.range()?;
    let entries = records
        .expenses(&range, auth.employee_scope(query.employee_id))
        .await?;

    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = CreateExpense,
    responses(
        (status = 201, description = "Expense created", body = ExpenseEntry),
        (status = 400, description = "Missing description or non-positive amount")
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn create_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    payload: web::Json<CreateExpense>,
) -> actix_web::Result<impl Responder> {
    payload.validate()?;
    let user_id = auth.employee_scope(payload.user_id).unwrap_or(auth.user_id);

    let id = records
        .insert(
            Table::Expenses,
            vec![
                ("user_id", user_id.into()),
                ("date", payload.date.into()),
                ("description", payload.description.trim().into()),
                ("amount", payload.amount.into()),
                ("receipt_path", payload.receipt_path.clone().into()),
            ],
        )
        .await?;
    let entry: ExpenseEntry = records.get(Table::Expenses, id).await?;

    info!(id, user_id, amount = entry.amount, "Expense created");
    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{id}",
    params(("id", Path, description = "Expense ID")),
    responses(
        (status = 200, body = ExpenseEntry),
        (status = 403, description = "Not your record"),
        (status = 404, description = "Expense not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn get_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let entry: ExpenseEntry = records.get(Table::Expenses, path.into_inner()).await?;
    auth.require_owner(entry.user_id)?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    params(("id", Path, description = "Expense ID")),
    request_body = UpdateExpense,
    responses(
        (status = 200, description = "Expense updated", body = ExpenseEntry),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Expense not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn update_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
    body: web::Json<UpdateExpense>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    body.validate()?;

    let current: ExpenseEntry = records.get(Table::Expenses, id).await?;
    auth.require_owner(current.user_id)?;

    records.update(Table::Expenses, id, &to_patch(&*body)?).await?;
    let entry: ExpenseEntry = records.get(Table::Expenses, id).await?;

    info!(id, "Expense updated");
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    params(("id", Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Expense not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn delete_expense(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let entry: ExpenseEntry = records.get(Table::Expenses, id).await?;
    auth.require_owner(entry.user_id)?;

    records.delete(Table::Expenses, id).await?;

    info!(id, "Expense deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expense_form_requires_description_and_positive_amount() {
        let ok: CreateExpense = serde_json::from_value(json!({
            "date": "2024-02-01",
            "description": "Train, return",
            "amount": 12.4
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let zero: CreateExpense = serde_json::from_value(json!({
            "date": "2024-02-01",
            "description": "Train",
            "amount": 0
        }))
        .unwrap();
        assert!(zero.validate().is_err());

        let bad_receipt: CreateExpense = serde_json::from_value(json!({
            "date": "2024-02-01",
            "description": "Train",
            "amount": 3,
            "receipt_path": "../../etc/passwd"
        }))
        .unwrap();
        assert!(bad_receipt.validate().is_err());
    }

    #[test]
    fn partial_update_validates_only_sent_fields() {
        let update = UpdateExpense {
            date: None,
            description: None,
            amount: Some(-5.0),
            receipt_path: None,
        };
        assert!(update.validate().is_err());

        let update = UpdateExpense {
            date: None,
            description: Some("Lunch with client".into()),
            amount: None,
            receipt_path: None,
        };
        assert!(update.validate().is_ok());
    }
}
