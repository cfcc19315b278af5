use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use super::{require_positive, require_storage_key, resolve_month, to_patch};
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::{
        vendor::Vendor,
        vendor_bill::{BillStatus, VendorBill},
    },
    models::MessageResponse,
    repo::{MySqlRecords, RecordSource, Table},
    utils::db_utils::SqlValue,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct BillQuery {
    /// Month of the due date, YYYY-MM; defaults to the current month
    #[param(example = "2024-03")]
    pub month: Option<String>,
    pub status: Option<BillStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVendorBill {
    pub vendor_id: u64,
    #[schema(example = 350.0)]
    pub amount: f64,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub due_date: NaiveDate,
    /// Key returned by the invoices upload
    pub invoice_path: Option<String>,
}

impl CreateVendorBill {
    pub fn validate(&self) -> Result<(), AppError> {
        require_positive(self.amount, "amount")?;
        require_storage_key(self.invoice_path.as_deref())
    }
}

/// Status and payment columns change only through the pay endpoint.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateVendorBill {
    pub vendor_id: Option<u64>,
    pub amount: Option<f64>,
    #[schema(value_type = Option<String>, format = "date")]
    pub due_date: Option<NaiveDate>,
    pub invoice_path: Option<String>,
}

impl UpdateVendorBill {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(amount) = self.amount {
            require_positive(amount, "amount")?;
        }
        require_storage_key(self.invoice_path.as_deref())
    }
}

async fn ensure_vendor(records: &MySqlRecords, vendor_id: u64) -> Result<(), AppError> {
    match records.find::<Vendor>(Table::Vendors, vendor_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::validation(format!("Unknown vendor {vendor_id}"))),
    }
}

#[utoipa::path(
    get,
    path = "/api/vendor-bills",
    params(BillQuery),
    responses(
        (status = 200, description = "Bills due in the month, earliest first", body = [VendorBill]),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor Bills"
)]
pub async fn list_vendor_bills(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    query: web::Query<BillQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let range = resolve_month(query.month.as_deref())?;
    let bills = records.vendor_bills(&range, query.status).await?;

    Ok(HttpResponse::Ok().json(bills))
}

#[utoipa::path(
    post,
    path = "/api/vendor-bills",
    request_body = CreateVendorBill,
    responses(
        (status = 201, description = "Bill recorded as pending", body = VendorBill),
        (status = 400, description = "Unknown vendor or non-positive amount"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor Bills"
)]
pub async fn create_vendor_bill(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    payload: web::Json<CreateVendorBill>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    payload.validate()?;
    ensure_vendor(&records, payload.vendor_id).await?;

    let id = records
        .insert(
            Table::VendorBills,
            vec![
                ("vendor_id", payload.vendor_id.into()),
                ("amount", payload.amount.into()),
                ("due_date", payload.due_date.into()),
                ("status", BillStatus::Pending.to_string().into()),
                ("invoice_path", payload.invoice_path.clone().into()),
                ("created_by", auth.user_id.into()),
            ],
        )
        .await?;
    let bill: VendorBill = records.get(Table::VendorBills, id).await?;

    info!(id, vendor_id = bill.vendor_id, amount = bill.amount, "Vendor bill recorded");
    Ok(HttpResponse::Created().json(bill))
}

#[utoipa::path(
    put,
    path = "/api/vendor-bills/{id}",
    params(("id", Path, description = "Vendor bill ID")),
    request_body = UpdateVendorBill,
    responses(
        (status = 200, description = "Bill updated", body = VendorBill),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Vendor bill not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor Bills"
)]
pub async fn update_vendor_bill(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
    body: web::Json<UpdateVendorBill>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();
    body.validate()?;
    if let Some(vendor_id) = body.vendor_id {
        ensure_vendor(&records, vendor_id).await?;
    }

    if !records.update(Table::VendorBills, id, &to_patch(&*body)?).await? {
        return Err(AppError::NotFound(Table::VendorBills.label()).into());
    }
    let bill: VendorBill = records.get(Table::VendorBills, id).await?;

    info!(id, "Vendor bill updated");
    Ok(HttpResponse::Ok().json(bill))
}

/// Fields written when a bill is settled.
fn payment_patch(payer: u64, at: NaiveDateTime) -> Value {
    json!({
        "status": BillStatus::Paid,
        "paid_by": payer,
        "paid_at": at.format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}

#[utoipa::path(
    put,
    path = "/api/vendor-bills/{id}/pay",
    params(("id", Path, description = "Vendor bill ID")),
    responses(
        (status = 200, description = "Bill marked as paid", body = VendorBill),
        (status = 400, description = "Bill already paid"),
        (status = 404, description = "Vendor bill not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor Bills"
)]
pub async fn pay_vendor_bill(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    let bill: VendorBill = records.get(Table::VendorBills, id).await?;
    if bill.status == BillStatus::Paid {
        warn!(id, "Vendor bill already paid");
        return Err(AppError::validation("Bill is already paid").into());
    }

    // Two concurrent payments both pass the check above; only the first
    // still finds the bill pending.
    let patch = payment_patch(auth.user_id, Utc::now().naive_utc());
    let pending = SqlValue::from(BillStatus::Pending.as_ref());
    if !records.update_where(Table::VendorBills, id, &patch, "status", pending).await? {
        warn!(id, "Vendor bill paid concurrently");
        return Err(AppError::validation("Bill is already paid").into());
    }
    let bill: VendorBill = records.get(Table::VendorBills, id).await?;

    info!(id, paid_by = auth.user_id, "Vendor bill paid");
    Ok(HttpResponse::Ok().json(bill))
}

#[utoipa::path(
    delete,
    path = "/api/vendor-bills/{id}",
    params(("id", Path, description = "Vendor bill ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Vendor bill not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor Bills"
)]
pub async fn delete_vendor_bill(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    if !records.delete(Table::VendorBills, id).await? {
        return Err(AppError::NotFound(Table::VendorBills.label()).into());
    }

    info!(id, "Vendor bill deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::db_utils::build_update_sql;

    #[test]
    fn bill_update_cannot_touch_status() {
        let parsed: UpdateVendorBill =
            serde_json::from_value(json!({"status": "paid", "amount": 10.0})).unwrap();
        let patch = to_patch(&parsed).unwrap();
        assert_eq!(patch, json!({"amount": 10.0}));
    }

    #[test]
    fn bill_form_checks_amount_and_invoice_key() {
        let form = CreateVendorBill {
            vendor_id: 1,
            amount: 0.0,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            invoice_path: None,
        };
        assert!(form.validate().is_err());

        let form = CreateVendorBill {
            amount: 99.0,
            invoice_path: Some("1/abc-invoice.pdf".into()),
            ..form
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn status_filter_parses_lowercase() {
        let query: BillQuery = serde_json::from_value(json!({"status": "pending"})).unwrap();
        assert_eq!(query.status, Some(BillStatus::Pending));
    }

    #[test]
    fn payment_only_applies_to_a_pending_bill() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let stmt = build_update_sql(
            Table::VendorBills.as_ref(),
            &payment_patch(9, at),
            Table::VendorBills.updatable_columns(),
            4,
        )
        .unwrap()
        .guarded("status", BillStatus::Pending.as_ref().into());

        assert!(stmt.sql.starts_with("UPDATE vendor_bills SET "));
        assert!(stmt.sql.ends_with(" WHERE id = ? AND status = ?"));
        assert!(stmt.values.contains(&SqlValue::String("paid".into())));
        assert!(stmt.values.contains(&SqlValue::U64(9)));
        assert!(stmt.values.contains(&SqlValue::DateTime(at)));
        assert_eq!(
            &stmt.values[stmt.values.len() - 2..],
            &[SqlValue::U64(4), SqlValue::String("pending".into())]
        );
    }
}
