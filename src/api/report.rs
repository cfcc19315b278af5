use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use super::{MonthQuery, resolve_month};
use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::AppError,
    report::{
        statement::{EmployeeDashboard, MonthlyStatement, employee_dashboard, monthly_statement},
        trend::{TrendPoint, monthly_trend},
    },
    repo::MySqlRecords,
};

const MAX_TREND_MONTHS: u32 = 36;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendQuery {
    /// Last month of the series, YYYY-MM; defaults to the current month
    #[param(example = "2024-12")]
    pub month: Option<String>,
    /// Series length; defaults to the configured window
    #[param(example = 12)]
    pub months: Option<u32>,
}

impl TrendQuery {
    fn window(&self, default: u32) -> Result<u32, AppError> {
        match self.months.unwrap_or(default) {
            n @ 1..=MAX_TREND_MONTHS => Ok(n),
            n => Err(AppError::validation(format!(
                "months must be between 1 and {MAX_TREND_MONTHS}, got {n}"
            ))),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/reports/dashboard",
    params(MonthQuery),
    responses(
        (status = 200, description = "Hours, salary and expenses for the month", body = EmployeeDashboard),
        (status = 400, description = "Invalid month")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn dashboard(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let range = query.range()?;
    let employee_id = auth.employee_scope(query.employee_id);

    let dashboard = employee_dashboard(records.get_ref(), &range, employee_id).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/reports/statement",
    params(MonthQuery),
    responses(
        (status = 200, description = "Profit and loss for the month", body = MonthlyStatement),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "A source could not be read")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn statement(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let range = query.range()?;

    let statement = monthly_statement(records.get_ref(), &range).await?;
    info!(
        month = %statement.month,
        net_profit = statement.profit_loss.net_profit,
        "Monthly statement built"
    );
    Ok(HttpResponse::Ok().json(statement))
}

#[utoipa::path(
    get,
    path = "/api/reports/trend",
    params(TrendQuery),
    responses(
        (status = 200, description = "Monthly profit and loss, oldest first", body = [TrendPoint]),
        (status = 400, description = "Invalid month or window"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn trend(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    config: web::Data<Config>,
    query: web::Query<TrendQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let anchor = resolve_month(query.month.as_deref())?;
    let months = query.window(config.trend_months)?;

    let points = monthly_trend(records.get_ref(), &anchor, months).await;
    Ok(HttpResponse::Ok().json(points))
}
