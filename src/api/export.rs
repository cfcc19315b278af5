use actix_web::{HttpResponse, Responder, http::header, web};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use super::resolve_month;
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    export::{ExportEntity, ExportFormat, Section, export_filename},
    report::statement::PeriodRecords,
    repo::{MySqlRecords, RecordSource},
    utils::date_range::DateRange,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Month as YYYY-MM; defaults to the current month
    #[param(example = "2024-02")]
    pub month: Option<String>,
    /// `csv` (default) or `xlsx`
    pub format: Option<ExportFormat>,
    /// Timesheets and expenses only; staff always export their own rows
    pub employee_id: Option<u64>,
}

/// Loads the sections an export of `entity` consists of.
async fn load_sections<S: RecordSource>(
    source: &S,
    entity: ExportEntity,
    range: &DateRange,
    employee_id: Option<u64>,
) -> Result<Vec<Section>, AppError> {
    let sections = match entity {
        ExportEntity::Timesheets => vec![Section::of(&source.timesheets(range, employee_id).await?)],
        ExportEntity::Expenses => vec![Section::of(&source.expenses(range, employee_id).await?)],
        ExportEntity::Income => vec![Section::of(&source.company_income(range, None).await?)],
        ExportEntity::StudioExpenses => vec![Section::of(&source.studio_expenses(range).await?)],
        ExportEntity::PersonalExpenses => {
            vec![Section::of(&source.personal_expenses(range).await?)]
        }
        ExportEntity::VendorBills => vec![Section::of(&source.vendor_bills(range, None).await?)],
        ExportEntity::All => {
            let records = PeriodRecords::fetch(source, range).await?;
            vec![
                Section::of(&records.timesheets),
                Section::of(&records.expenses),
                Section::of(&records.income),
                Section::of(&records.studio),
                Section::of(&records.personal),
                Section::of(&records.bills),
            ]
        }
    };
    Ok(sections)
}

#[utoipa::path(
    get,
    path = "/api/export/{entity}",
    params(
        ("entity" = ExportEntity, Path, description = "What to export"),
        ExportQuery
    ),
    responses(
        (status = 200, description = "File download", content_type = "text/csv"),
        (status = 400, description = "Invalid month or format"),
        (status = 403, description = "Staff may only export their own timesheets and expenses")
    ),
    security(("bearer_auth" = [])),
    tag = "Export"
)]
pub async fn export(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<ExportEntity>,
    query: web::Query<ExportQuery>,
) -> actix_web::Result<impl Responder> {
    let entity = path.into_inner();
    if !auth.is_admin() && !entity.staff_visible() {
        return Err(AppError::Forbidden("Admin only").into());
    }

    let range = resolve_month(query.month.as_deref())?;
    let format = query.format.unwrap_or_default();
    let employee_id = auth.employee_scope(query.employee_id);

    let sections = load_sections(records.get_ref(), entity, &range, employee_id).await?;
    let body = format.render(&sections)?;
    let filename = export_filename(entity, &range, format);

    info!(
        entity = %entity,
        month = %range.month_token(),
        format = %format,
        size = body.len(),
        "Export generated"
    );

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(body))
}
