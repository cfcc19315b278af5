use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Bucket {
    Receipts,
    Invoices,
    PaymentSlips,
}

/// Opaque blob storage for receipts, invoices and payment slips.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    async fn upload(&self, bucket: Bucket, key: &str, bytes: &[u8]) -> Result<String, AppError>;

    async fn download(&self, bucket: Bucket, key: &str) -> Result<Vec<u8>, AppError>;

    fn public_url(&self, bucket: Bucket, key: &str) -> String;
}

/// Rejects keys that could escape the bucket directory.
pub fn validate_key(key: &str) -> Result<&Path, AppError> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && !key.contains('\\')
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

    if safe {
        Ok(path)
    } else {
        Err(AppError::validation(format!("Invalid storage key {key:?}")))
    }
}

/// Keeps letters, digits, dots, dashes and underscores of an uploaded file name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Files on local disk under `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, bucket: Bucket, key: &str) -> Result<PathBuf, AppError> {
        Ok(self.root.join(bucket.as_ref()).join(validate_key(key)?))
    }
}

impl BlobStore for LocalBlobStore {
    async fn upload(&self, bucket: Bucket, key: &str, bytes: &[u8]) -> Result<String, AppError> {
        let path = self.path_for(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            error!(error = %e, bucket = %bucket, key, "Failed to store blob");
            AppError::Storage(e)
        })?;
        debug!(bucket = %bucket, key, size = bytes.len(), "Stored blob");

        Ok(key.to_string())
    }

    async fn download(&self, bucket: Bucket, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_for(bucket, key)?;

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound("File"),
            _ => AppError::Storage(e),
        })
    }

    fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/{}/{}", self.public_base, bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> LocalBlobStore {
        let root = std::env::temp_dir().join(format!("opsdesk-{name}-{}", uuid::Uuid::new_v4()));
        LocalBlobStore::new(root, "http://files.test/")
    }

    #[test]
    fn keys_cannot_escape_the_bucket() {
        for key in ["", "../secret", "/etc/passwd", "a/../../b", "a\\b", "./a"] {
            assert!(validate_key(key).is_err(), "{key} should be rejected");
        }
        assert!(validate_key("7/receipt.jpg").is_ok());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("Receipt March.jpg"), "Receipt_March.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[test]
    fn bucket_names_are_kebab_case() {
        assert_eq!(Bucket::PaymentSlips.to_string(), "payment-slips");
        assert_eq!("invoices".parse::<Bucket>().unwrap(), Bucket::Invoices);
        assert_eq!(serde_json::to_value(Bucket::PaymentSlips).unwrap(), "payment-slips");
    }

    #[actix_web::test]
    async fn upload_then_download_returns_same_bytes() {
        let store = temp_store("roundtrip");
        let key = store.upload(Bucket::Receipts, "7/abc-receipt.jpg", b"jpeg").await.unwrap();

        assert_eq!(key, "7/abc-receipt.jpg");
        assert_eq!(store.download(Bucket::Receipts, &key).await.unwrap(), b"jpeg");
        assert_eq!(
            store.public_url(Bucket::Receipts, &key),
            "http://files.test/receipts/7/abc-receipt.jpg"
        );
    }

    #[actix_web::test]
    async fn missing_blob_is_not_found() {
        let store = temp_store("missing");
        let err = store.download(Bucket::Invoices, "nope.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
