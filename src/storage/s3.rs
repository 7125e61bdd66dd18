use async_trait::async_trait;
use aws_sdk_s3::{
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};

use crate::{
    config::StorageConfig,
    error::{GatewayError, Result},
    storage::traits::ObjectStore,
};

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3ObjectStore {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let region = config
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "apparel-gateway",
            ));
        }

        let sdk_config = loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        log::info!("S3 object store ready for bucket {}", config.bucket);

        Ok(Self {
            client: Client::from_conf(s3_config.build()),
            bucket: config.bucket,
            region,
            endpoint: config
                .endpoint
                .map(|endpoint| endpoint.trim_end_matches('/').to_string()),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .cache_control("no-cache")
            .send()
            .await
            .map_err(|e| GatewayError::upstream(DisplayErrorContext(&e).to_string()))?;

        Ok(self.location(key))
    }

    fn location(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint, self.bucket, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}
