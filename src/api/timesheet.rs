use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{MonthQuery, require_text, to_patch};
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::timesheet::{PayBasis, TimesheetEntry, WorkType},
    models::MessageResponse,
    repo::{MySqlRecords, RecordSource, Table},
    utils::db_utils::Columns,
};

/// A client-computed total is only accepted when it agrees to the cent.
const SALARY_TOLERANCE: f64 = 0.005;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTimesheet {
    /// Admins may log on behalf of an employee; ignored for staff
    #[schema(example = 3, nullable = true)]
    pub user_id: Option<u64>,
    #[schema(example = "2024-02-12", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub work_type: WorkType,
    #[schema(example = "Retouching, wedding set")]
    pub job_description: String,
    #[schema(example = 6.5)]
    pub hours: Option<f64>,
    #[schema(example = 20.0)]
    pub hourly_rate: Option<f64>,
    pub job_count: Option<u32>,
    pub job_rate: Option<f64>,
    #[schema(example = "09:00:00", value_type = Option<String>, format = "time")]
    pub start_time: Option<NaiveTime>,
    #[schema(example = "15:30:00", value_type = Option<String>, format = "time")]
    pub end_time: Option<NaiveTime>,
    /// Optional; rejected when it disagrees with the recomputed salary
    pub total_salary: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateTimesheet {
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub work_type: Option<WorkType>,
    pub job_description: Option<String>,
    pub hours: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub job_count: Option<u32>,
    pub job_rate: Option<f64>,
    #[schema(value_type = Option<String>, format = "time")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time")]
    pub end_time: Option<NaiveTime>,
    pub total_salary: Option<f64>,
}

fn check_times(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Result<(), AppError> {
    match (start, end) {
        (Some(s), Some(e)) if e <= s => Err(AppError::validation("end_time must be after start_time")),
        _ => Ok(()),
    }
}

/// Recomputes the salary and compares it with what the client sent, if anything.
fn checked_salary(basis: &PayBasis, submitted: Option<f64>) -> Result<f64, AppError> {
    let salary = basis.validated_salary()?;
    match submitted {
        Some(s) if (s - salary).abs() > SALARY_TOLERANCE => Err(AppError::validation(format!(
            "total_salary {s:.2} does not match the computed {salary:.2}"
        ))),
        _ => Ok(salary),
    }
}

impl CreateTimesheet {
    fn pay_basis(&self) -> PayBasis {
        PayBasis {
            work_type: self.work_type,
            hours: self.hours,
            hourly_rate: self.hourly_rate,
            job_count: self.job_count,
            job_rate: self.job_rate,
        }
    }

    /// Validates the whole form and returns the salary to store.
    pub fn validate(&self) -> Result<f64, AppError> {
        require_text(&self.job_description, "job_description")?;
        check_times(self.start_time, self.end_time)?;
        checked_salary(&self.pay_basis(), self.total_salary)
    }

    fn into_columns(self, user_id: u64, total_salary: f64) -> Columns {
        vec![
            ("user_id", user_id.into()),
            ("date", self.date.into()),
            ("work_type", self.work_type.to_string().into()),
            ("job_description", self.job_description.trim().into()),
            ("hours", self.hours.into()),
            ("hourly_rate", self.hourly_rate.into()),
            ("job_count", self.job_count.into()),
            ("job_rate", self.job_rate.into()),
            ("start_time", self.start_time.into()),
            ("end_time", self.end_time.into()),
            ("total_salary", total_salary.into()),
        ]
    }
}

impl UpdateTimesheet {
    /// Merges the update over the stored entry and returns the salary the
    /// merged entry pays.
    pub fn merged_salary(&self, current: &TimesheetEntry) -> Result<f64, AppError> {
        if let Some(description) = &self.job_description {
            require_text(description, "job_description")?;
        }
        check_times(
            self.start_time.or(current.start_time),
            self.end_time.or(current.end_time),
        )?;

        let basis = PayBasis {
            work_type: self.work_type.unwrap_or(current.work_type),
            hours: self.hours.or(current.hours),
            hourly_rate: self.hourly_rate.or(current.hourly_rate),
            job_count: self.job_count.or(current.job_count),
            job_rate: self.job_rate.or(current.job_rate),
        };
        checked_salary(&basis, self.total_salary)
    }
}

#[utoipa::path(
    get,
    path = "/api/timesheets",
    params(MonthQuery),
    responses(
        (status = 200, description = "Entries for the month, newest first", body = [TimesheetEntry]),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheets"
)]
pub async fn list_timesheets(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let range = query.range()?;
    let entries = records
        .timesheets(&range, auth.employee_scope(query.employee_id))
        .await?;

    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    post,
    path = "/api/timesheets",
    request_body = CreateTimesheet,
    responses(
        (status = 201, description = "Entry created", body = TimesheetEntry),
        (status = 400, description = "Missing field or salary mismatch"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheets"
)]
pub async fn create_timesheet(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    payload: web::Json<CreateTimesheet>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let total_salary = payload.validate()?;
    let user_id = auth.employee_scope(payload.user_id).unwrap_or(auth.user_id);

    let id = records
        .insert(Table::Timesheets, payload.into_columns(user_id, total_salary))
        .await?;
    let entry: TimesheetEntry = records.get(Table::Timesheets, id).await?;

    info!(id, user_id, total_salary, "Timesheet entry created");
    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/timesheets/{id}",
    params(("id", Path, description = "Timesheet entry ID")),
    responses(
        (status = 200, body = TimesheetEntry),
        (status = 403, description = "Not your record"),
        (status = 404, description = "Timesheet entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheets"
)]
pub async fn get_timesheet(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let entry: TimesheetEntry = records.get(Table::Timesheets, path.into_inner()).await?;
    auth.require_owner(entry.user_id)?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    put,
    path = "/api/timesheets/{id}",
    params(("id", Path, description = "Timesheet entry ID")),
    request_body = UpdateTimesheet,
    responses(
        (status = 200, description = "Entry updated", body = TimesheetEntry),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Timesheet entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheets"
)]
pub async fn update_timesheet(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
    body: web::Json<UpdateTimesheet>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let current: TimesheetEntry = records.get(Table::Timesheets, id).await?;
    auth.require_owner(current.user_id)?;

    let total_salary = body.merged_salary(&current)?;

    let mut patch = to_patch(&*body)?;
    if let Some(fields) = patch.as_object_mut() {
        fields.insert("total_salary".to_string(), total_salary.into());
    }

    if !records.update(Table::Timesheets, id, &patch).await? {
        return Err(AppError::NotFound(Table::Timesheets.label()).into());
    }
    let entry: TimesheetEntry = records.get(Table::Timesheets, id).await?;

    info!(id, total_salary, "Timesheet entry updated");
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/timesheets/{id}",
    params(("id", Path, description = "Timesheet entry ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Timesheet entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheets"
)]
pub async fn delete_timesheet(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let entry: TimesheetEntry = records.get(Table::Timesheets, id).await?;
    auth.require_owner(entry.user_id)?;

    records.delete(Table::Timesheets, id).await?;

    info!(id, "Timesheet entry deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::hourly;
    use serde_json::json;

    fn form(value: serde_json::Value) -> CreateTimesheet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn server_computes_salary_when_client_omits_it() {
        let payload = form(json!({
            "date": "2024-02-12",
            "work_type": "hourly",
            "job_description": "Retouching",
            "hours": 6.5,
            "hourly_rate": 20.0
        }));
        assert_eq!(payload.validate().unwrap(), 130.0);
    }

    #[test]
    fn stale_client_total_is_rejected() {
        let payload = form(json!({
            "date": "2024-02-12",
            "work_type": "job",
            "job_description": "Product shots",
            "job_count": 4,
            "job_rate": 25.0,
            "total_salary": 75.0
        }));
        assert!(matches!(payload.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn blank_description_and_reversed_times_are_rejected() {
        let blank = form(json!({
            "date": "2024-02-12",
            "work_type": "hourly",
            "job_description": "   ",
            "hours": 1.0,
            "hourly_rate": 1.0
        }));
        assert!(blank.validate().is_err());

        let reversed = form(json!({
            "date": "2024-02-12",
            "work_type": "hourly",
            "job_description": "Edit",
            "hours": 1.0,
            "hourly_rate": 1.0,
            "start_time": "15:00:00",
            "end_time": "09:00:00"
        }));
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn update_recomputes_from_merged_values() {
        let current = hourly("2024-02", 12, 3, 4.0, 20.0);

        let more_hours = UpdateTimesheet {
            hours: Some(5.0),
            ..Default::default()
        };
        assert_eq!(more_hours.merged_salary(&current).unwrap(), 100.0);

        let switch_to_job = UpdateTimesheet {
            work_type: Some(WorkType::Job),
            job_count: Some(2),
            job_rate: Some(60.0),
            ..Default::default()
        };
        assert_eq!(switch_to_job.merged_salary(&current).unwrap(), 120.0);

        let job_without_rate = UpdateTimesheet {
            work_type: Some(WorkType::Job),
            job_count: Some(2),
            ..Default::default()
        };
        assert!(job_without_rate.merged_salary(&current).is_err());
    }

    #[test]
    fn update_patch_only_has_sent_fields() {
        let update = UpdateTimesheet {
            hours: Some(2.0),
            ..Default::default()
        };
        let patch = to_patch(&update).unwrap();
        assert_eq!(patch, json!({"hours": 2.0}));
    }

    #[test]
    fn update_stores_trimmed_job_description() {
        let current = hourly("2024-02", 12, 3, 4.0, 20.0);
        let update = UpdateTimesheet {
            job_description: Some("  Colour grade, reel 2  ".into()),
            ..Default::default()
        };
        assert!(update.merged_salary(&current).is_ok());

        let patch = to_patch(&update).unwrap();
        assert_eq!(patch, json!({"job_description": "Colour grade, reel 2"}));

        let blank = UpdateTimesheet {
            job_description: Some("   ".into()),
            ..Default::default()
        };
        assert!(blank.merged_salary(&current).is_err());
    }
}
