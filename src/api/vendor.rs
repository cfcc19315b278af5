use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::require_text;
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::vendor::Vendor,
    repo::{MySqlRecords, Table},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVendor {
    #[schema(example = "Print House Ltd")]
    pub name: String,
    #[schema(example = "billing@printhouse.test")]
    pub contact_email: Option<String>,
}

impl CreateVendor {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.name, "name")?;
        match self.contact_email.as_deref() {
            Some(email) if !email.contains('@') => {
                Err(AppError::validation("contact_email is not an email address"))
            }
            _ => Ok(()),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/vendors",
    responses(
        (status = 200, description = "All vendors", body = [Vendor]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn list_vendors(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let vendors: Vec<Vendor> = records.list(Table::Vendors).await?;

    Ok(HttpResponse::Ok().json(vendors))
}

#[utoipa::path(
    post,
    path = "/api/vendors",
    request_body = CreateVendor,
    responses(
        (status = 201, description = "Vendor created", body = Vendor),
        (status = 400, description = "Missing name"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn create_vendor(
    auth: AuthUser,
    records: web::Data<MySqlRecords>,
    payload: web::Json<CreateVendor>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    payload.validate()?;

    let id = records
        .insert(
            Table::Vendors,
            vec![
                ("name", payload.name.trim().into()),
                ("contact_email", payload.contact_email.clone().into()),
            ],
        )
        .await?;
    let vendor: Vendor = records.get(Table::Vendors, id).await?;

    info!(id, name = %vendor.name, "Vendor created");
    Ok(HttpResponse::Created().json(vendor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_needs_name_and_plausible_email() {
        let ok = CreateVendor {
            name: "Print House".into(),
            contact_email: Some("a@b.test".into()),
        };
        assert!(ok.validate().is_ok());

        let bad_email = CreateVendor {
            name: "Print House".into(),
            contact_email: Some("billing".into()),
        };
        assert!(bad_email.validate().is_err());

        let no_name = CreateVendor {
            name: "".into(),
            contact_email: None,
        };
        assert!(no_name.validate().is_err());
    }
}
