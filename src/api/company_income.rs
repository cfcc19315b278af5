use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use super::{require_positive, require_storage_key, require_text, resolve_month, to_patch};
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::company_income::{CompanyIncomeRecord, JobStatus, PaymentType},
    models::MessageResponse,
    repo::{MySqlRecords, RecordSource, Table},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct IncomeQuery {
    /// Month as YYYY-MM; defaults to the current month
    #[param(example = "2024-02")]
    pub month: Option<String>,
    /// Only income booked under this brand
    #[param(example = "Studio North")]
    pub brand: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIncome {
    #[schema(example = "Studio North")]
    pub company_name: String,
    pub client: Option<String>,
    #[schema(example = 1200.0)]
    pub amount: f64,
    pub payment_type: PaymentType,
    #[schema(example = "bank_transfer")]
    pub payment_method: String,
    #[schema(example = "2024-02-20", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Defaults to `pending`
    pub job_status: Option<JobStatus>,
    #[schema(value_type = Option<String>, format = "date")]
    pub job_completion_date: Option<NaiveDate>,
    pub payment_slip_path: Option<String>,
}

impl CreateIncome {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.company_name, "company_name")?;
        require_text(&self.payment_method, "payment_method")?;
        require_positive(self.amount, "amount")?;
        require_storage_key(self.payment_slip_path.as_deref())
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateIncome {
    pub company_name: Option<String>,
    pub client: Option<String>,
    pub amount: Option<f64>,
    pub payment_type: Option<PaymentType>,
    pub payment_method: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub job_status: Option<JobStatus>,
    #[schema(value_type = Option<String>, format = "date")]
    pub job_completion_date: Option<NaiveDate>,
    pub payment_slip_path: Option<String>,
}

impl UpdateIncome {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.company_name {
            require_text(name, "company_name")?;
        }
        if let Some(method) = &self.payment_method {
            require_text(method, "payment_method")?;
        }
        if let Some(amount) = self.amount {
            require_positive(amount, "amount")?;
        }
        require_storage_key(self.payment_slip_path.as_deref())
    }
}

#[utoipa::path(
    get,
    path = "/api/income",
    params(IncomeQuery),
    responses(
        (status = 200, description = "Income for the month, newest first", body = [CompanyIncomeRecord]),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Company Income"
)]
pub async fn list_income(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<IncomeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let range = resolve_month(query.month.as_deref())?;
    let brand = query.brand.as_deref().map(str::trim).filter(|b| !b.is_empty());

    let rows = records.company_income(&range, brand).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/income",
    request_body = CreateIncome,
    responses(
        (status = 201, description = "Income recorded", body = CompanyIncomeRecord),
        (status = 400, description = "Missing field or non-positive amount"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Company Income"
)]
pub async fn create_income(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    payload: web::Json<CreateIncome>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    payload.validate()?;

    let id = records
        .insert(
            Table::CompanyIncome,
            vec![
                ("company_name", payload.company_name.trim().into()),
                ("client", payload.client.clone().into()),
                ("amount", payload.amount.into()),
                ("payment_type", payload.payment_type.to_string().into()),
                ("payment_method", payload.payment_method.trim().into()),
                ("date", payload.date.into()),
                (
                    "job_status",
                    payload.job_status.unwrap_or(JobStatus::Pending).to_string().into(),
                ),
                ("job_completion_date", payload.job_completion_date.into()),
                ("payment_slip_path", payload.payment_slip_path.clone().into()),
                ("created_by", auth.user_id.into()),
            ],
        )
        .await?;
    let record: CompanyIncomeRecord = records.get(Table::CompanyIncome, id).await?;

    info!(id, brand = %record.company_name, amount = record.amount, "Income recorded");
    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    get,
    path = "/api/income/{id}",
    params(("id", Path, description = "Income record ID")),
    responses(
        (status = 200, body = CompanyIncomeRecord),
        (status = 404, description = "Income record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Company Income"
)]
pub async fn get_income(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let record: CompanyIncomeRecord = records.get(Table::CompanyIncome, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    put,
    path = "/api/income/{id}",
    params(("id", Path, description = "Income record ID")),
    request_body = UpdateIncome,
    responses(
        (status = 200, description = "Income record updated", body = CompanyIncomeRecord),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Income record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Company Income"
)]
pub async fn update_income(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
    body: web::Json<UpdateIncome>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();
    body.validate()?;

    if !records.update(Table::CompanyIncome, id, &to_patch(&*body)?).await? {
        return Err(AppError::NotFound(Table::CompanyIncome.label()).into());
    }
    let record: CompanyIncomeRecord = records.get(Table::CompanyIncome, id).await?;

    info!(id, "Income record updated");
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    delete,
    path = "/api/income/{id}",
    params(("id", Path, description = "Income record ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Income record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Company Income"
)]
pub async fn delete_income(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    if !records.delete(Table::CompanyIncome, id).await? {
        return Err(AppError::NotFound(Table::CompanyIncome.label()).into());
    }

    info!(id, "Income record deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}
