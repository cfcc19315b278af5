use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    storage::{BlobStore, Bucket, LocalBlobStore, sanitize_file_name, validate_key},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Original file name; only used to build the key
    #[param(example = "receipt-march.jpg")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub bucket: Bucket,
    /// Store this on the record (`receipt_path`, `invoice_path`, `payment_slip_path`)
    #[schema(example = "7/0b0c2b8e-receipt-march.jpg")]
    pub key: String,
    pub url: String,
}

/// Staff may only attach receipts; invoices and payment slips are admin files.
fn check_upload(auth: &AuthUser, bucket: Bucket) -> Result<(), AppError> {
    if auth.is_admin() || bucket == Bucket::Receipts {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin only"))
    }
}

/// Keys start with the uploader's id, so staff can read back only their own.
fn check_download(auth: &AuthUser, bucket: Bucket, key: &str) -> Result<(), AppError> {
    if auth.is_admin() {
        return Ok(());
    }
    let own_prefix = format!("{}/", auth.user_id);
    if bucket == Bucket::Receipts && key.starts_with(&own_prefix) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not your file"))
    }
}

pub fn upload_key(user_id: u64, name: Option<&str>) -> String {
    let file_name = sanitize_file_name(name.unwrap_or_default());
    format!("{user_id}/{}-{file_name}", Uuid::new_v4())
}

#[utoipa::path(
    post,
    path = "/api/storage/{bucket}",
    params(
        ("bucket" = Bucket, Path, description = "receipts, invoices or payment-slips"),
        UploadQuery
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Empty upload"),
        (status = 403, description = "Bucket not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn upload(
    auth: AuthUser,
    store: web::Data<LocalBlobStore>,
    path: web::Path<Bucket>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let bucket = path.into_inner();
    check_upload(&auth, bucket)?;
    if body.is_empty() {
        return Err(AppError::validation("Upload is empty").into());
    }

    let key = upload_key(auth.user_id, query.name.as_deref());
    let key = store.upload(bucket, &key, &body).await?;

    info!(bucket = %bucket, key = %key, size = body.len(), "File uploaded");
    Ok(HttpResponse::Created().json(UploadResponse {
        url: store.public_url(bucket, &key),
        bucket,
        key,
    }))
}

#[utoipa::path(
    get,
    path = "/api/storage/{bucket}/{key}",
    params(
        ("bucket" = Bucket, Path, description = "receipts, invoices or payment-slips"),
        ("key" = String, Path, description = "Key returned by the upload")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 403, description = "Not your file"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn download(
    auth: AuthUser,
    store: web::Data<LocalBlobStore>,
    path: web::Path<(Bucket, String)>,
) -> actix_web::Result<impl Responder> {
    let (bucket, key) = path.into_inner();
    validate_key(&key)?;
    check_download(&auth, bucket, &key)?;

    let bytes = store.download(bucket, &key).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(bytes))
}
