pub mod memory;
pub mod s3;
pub mod traits;

use crate::{
    config::StorageConfig,
    error::{GatewayError, Result},
    models::upload::{UploadReceipt, UploadedFile},
};
use chrono::Utc;
use std::sync::Arc;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
pub use traits::ObjectStore;

/// Builds `{prefix}/{unix-millis}/{file name}`.
pub fn object_key(prefix: &str, timestamp_millis: i64, file_name: &str) -> String {
    let file_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    format!("{}/{}/{}", prefix.trim_end_matches('/'), timestamp_millis, file_name)
}

pub struct UploadManager {
    backend: Arc<dyn ObjectStore>,
    key_prefix: String,
}

impl UploadManager {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let key_prefix = config.key_prefix.clone();
        let backend: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(config).await?);

        Ok(Self {
            backend,
            key_prefix,
        })
    }

    pub fn with_backend(backend: Arc<dyn ObjectStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            key_prefix: key_prefix.into(),
        }
    }

    pub async fn upload(&self, file: UploadedFile) -> Result<UploadReceipt> {
        if file.file_name.trim().is_empty() {
            return Err(GatewayError::ValidationError(
                "Uploaded file has no name".into(),
            ));
        }

        let key = object_key(&self.key_prefix, Utc::now().timestamp_millis(), &file.file_name);
        let size = file.content.len();

        let url = self
            .backend
            .put(&key, file.content, &file.content_type)
            .await
            .map_err(|e| {
                log::error!("Upload of {} failed: {}", key, e);
                e
            })?;

        log::info!("Stored {} ({} bytes, {})", key, size, file.content_type);

        Ok(UploadReceipt {
            message: "Upload successful".to_string(),
            url,
        })
    }
}
